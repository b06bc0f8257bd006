//! Power zones and intensity classification
//!
//! Seven-zone power model with closed-open percent-of-FTP ranges, plus the
//! IF-based intensity zone for classifying whole rides. Zone breakpoints are
//! fixed: Z1 0-55%, Z2 55-75%, Z3 75-90%, Z4 90-105%, Z5 105-120%,
//! Z6 120-150%, Z7 150%+ of FTP.

use crate::error::MetricsError;
use serde::{Deserialize, Serialize};

/// (name, lower bound, upper bound) as fractions of FTP; upper bound is
/// exclusive, None for the open-ended top zone
const ZONE_TABLE: [(&str, f64, Option<f64>); 7] = [
    ("Active Recovery", 0.0, Some(0.55)),
    ("Endurance", 0.55, Some(0.75)),
    ("Tempo", 0.75, Some(0.90)),
    ("Threshold", 0.90, Some(1.05)),
    ("VO2max", 1.05, Some(1.20)),
    ("Anaerobic", 1.20, Some(1.50)),
    ("Neuromuscular", 1.50, None),
];

/// One power zone with watt boundaries derived from the current FTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerZone {
    /// Zone number, 1-7
    pub zone: u8,

    /// Conventional zone name
    pub name: String,

    /// Inclusive lower bound in watts
    pub min_watts: u32,

    /// Exclusive upper bound in watts; None for the open-ended top zone
    pub max_watts: Option<u32>,

    /// Inclusive lower bound as a percentage of FTP
    pub min_pct: u8,

    /// Exclusive upper bound as a percentage of FTP
    pub max_pct: Option<u8>,
}

/// Intensity zone of a whole ride, from its Intensity Factor.
///
/// Closed-open ranges: `<0.75` Recovery/Endurance, `<0.90` Tempo, `<1.05`
/// Threshold, `<1.20` VO2max, else Anaerobic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntensityZone {
    RecoveryEndurance,
    Tempo,
    Threshold,
    Vo2Max,
    Anaerobic,
}

impl IntensityZone {
    pub fn from_intensity_factor(intensity_factor: f64) -> Self {
        if intensity_factor < 0.75 {
            IntensityZone::RecoveryEndurance
        } else if intensity_factor < 0.90 {
            IntensityZone::Tempo
        } else if intensity_factor < 1.05 {
            IntensityZone::Threshold
        } else if intensity_factor < 1.20 {
            IntensityZone::Vo2Max
        } else {
            IntensityZone::Anaerobic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IntensityZone::RecoveryEndurance => "Recovery/Endurance",
            IntensityZone::Tempo => "Tempo",
            IntensityZone::Threshold => "Threshold",
            IntensityZone::Vo2Max => "VO2max",
            IntensityZone::Anaerobic => "Anaerobic",
        }
    }
}

/// Zone calculation utilities
pub struct ZoneCalculator;

impl ZoneCalculator {
    /// Derive the seven power zones from the current FTP. Watt boundaries
    /// are rounded to the nearest watt; recompute whenever FTP changes.
    pub fn power_zones(ftp: f64) -> Result<Vec<PowerZone>, MetricsError> {
        if !ftp.is_finite() || ftp <= 0.0 {
            return Err(MetricsError::Configuration(format!(
                "FTP must be a positive number of watts, got {}",
                ftp
            )));
        }

        Ok(ZONE_TABLE
            .iter()
            .enumerate()
            .map(|(i, (name, min_pct, max_pct))| PowerZone {
                zone: (i + 1) as u8,
                name: (*name).to_string(),
                min_watts: (ftp * min_pct).round() as u32,
                max_watts: max_pct.map(|p| (ftp * p).round() as u32),
                min_pct: (min_pct * 100.0).round() as u8,
                max_pct: max_pct.map(|p| (p * 100.0).round() as u8),
            })
            .collect())
    }

    /// Which zone a given wattage falls into (1-7); boundaries belong to the
    /// upper zone, matching the closed-open ranges
    pub fn zone_for_power(watts: f64, zones: &[PowerZone]) -> u8 {
        for zone in zones {
            match zone.max_watts {
                Some(max) if watts < max as f64 => return zone.zone,
                None => return zone.zone,
                _ => continue,
            }
        }
        zones.last().map(|z| z.zone).unwrap_or(0)
    }
}
