use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derived per-ride metrics, stored at full precision.
///
/// Display rounding (one decimal for TSS/NP, two or three for the ratios) is
/// a presentation concern; see [`crate::metrics::round1`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideMetrics {
    /// Normalized Power in watts (30-second rolling average method)
    pub normalized_power: f64,

    /// Intensity Factor - ratio of normalized power to FTP
    pub intensity_factor: f64,

    /// Training Stress Score - quantifies training load
    pub tss: f64,

    /// Variability Index (NP / average power); exactly 1.0 when no power
    /// stream was available and NP fell back to average power
    pub variability_index: f64,

    /// Efficiency Factor (NP / average heart rate); absent without HR data
    pub efficiency_factor: Option<f64>,
}

impl RideMetrics {
    /// All-zero metrics for zero-duration or empty-sample rides
    pub fn zero() -> Self {
        RideMetrics {
            normalized_power: 0.0,
            intensity_factor: 0.0,
            tss: 0.0,
            variability_index: 0.0,
            efficiency_factor: None,
        }
    }
}

/// A single ride, as exchanged with the persistence layer and the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    /// Unique identifier for the ride
    pub id: Uuid,

    /// Ride title or name
    pub title: String,

    /// Calendar date of the ride
    pub date: NaiveDate,

    /// Duration in seconds
    pub duration_seconds: u32,

    /// Average power in watts
    pub avg_power: f64,

    /// Per-second power samples, when a power meter provided a full stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_samples: Option<Vec<f64>>,

    /// Summary Normalized Power, e.g. from a sync service that exposes NP
    /// without the underlying stream
    #[serde(default)]
    pub normalized_power: Option<f64>,

    /// Average heart rate in bpm
    #[serde(default)]
    pub avg_heart_rate: Option<f64>,

    /// Maximum power in watts
    #[serde(default)]
    pub max_power: Option<f64>,

    /// Maximum heart rate in bpm
    #[serde(default)]
    pub max_heart_rate: Option<f64>,

    /// FTP snapshot used the last time metrics were calculated for this ride
    #[serde(default)]
    pub ftp_at_time: Option<f64>,

    /// Derived metrics; recomputed whenever the owning athlete's FTP changes
    #[serde(default)]
    pub metrics: Option<RideMetrics>,
}

impl Ride {
    /// Create a ride from summary values only (manual entry)
    pub fn manual(title: &str, date: NaiveDate, duration_seconds: u32, avg_power: f64) -> Self {
        Ride {
            id: Uuid::new_v4(),
            title: title.to_string(),
            date,
            duration_seconds,
            avg_power,
            power_samples: None,
            normalized_power: None,
            avg_heart_rate: None,
            max_power: None,
            max_heart_rate: None,
            ftp_at_time: None,
            metrics: None,
        }
    }

    /// Stored TSS for this ride, zero when metrics have not been calculated
    pub fn tss(&self) -> f64 {
        self.metrics.as_ref().map(|m| m.tss).unwrap_or(0.0)
    }

    /// Best available NP summary: calculated metrics first, then any
    /// sync-supplied summary value
    pub fn summary_np(&self) -> Option<f64> {
        self.metrics
            .as_ref()
            .map(|m| m.normalized_power)
            .or(self.normalized_power)
    }
}

/// Per-athlete settings; FTP is a single mutable snapshot, passed explicitly
/// into every metric call rather than read from ambient state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteSettings {
    /// Functional Threshold Power in watts
    pub ftp: f64,

    /// Weight in kilograms
    #[serde(default)]
    pub weight_kg: Option<f64>,

    /// Resting heart rate in bpm
    #[serde(default)]
    pub resting_hr: Option<u16>,

    /// Maximum heart rate in bpm
    #[serde(default)]
    pub max_hr: Option<u16>,
}

impl AthleteSettings {
    /// Power-to-weight ratio at FTP, when weight is known
    pub fn watts_per_kg(&self) -> Option<f64> {
        self.weight_kg.filter(|w| *w > 0.0).map(|w| self.ftp / w)
    }
}

/// One day of the fitness-fatigue-form model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessPoint {
    /// Calendar day these values are as of (end of day)
    pub date: NaiveDate,

    /// Chronic Training Load (42-day exponentially weighted average)
    pub ctl: f64,

    /// Acute Training Load (7-day exponentially weighted average)
    pub atl: f64,

    /// Training Stress Balance (CTL - ATL, same day)
    pub tsb: f64,
}

/// Full fitness picture for an athlete: current state, peak, history, and
/// the 30-day rest forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessSummary {
    pub current_ctl: f64,
    pub current_atl: f64,
    pub current_tsb: f64,

    /// Highest CTL reached over the history
    pub peak_ctl: f64,

    /// Daily series from the first ride through the requested end date
    pub history: Vec<FitnessPoint>,

    /// Read-only projection assuming zero TSS going forward
    pub forecast: Vec<FitnessPoint>,
}

impl FitnessSummary {
    /// Empty summary for an athlete with no ride history; a valid,
    /// displayable state rather than an error
    pub fn empty() -> Self {
        FitnessSummary {
            current_ctl: 0.0,
            current_atl: 0.0,
            current_tsb: 0.0,
            peak_ctl: 0.0,
            history: Vec::new(),
            forecast: Vec::new(),
        }
    }
}
