//! Fitness trend calculator (CTL/ATL/TSB)
//!
//! Applies the fitness-fatigue-form recurrence over a dense daily series of
//! TSS sums:
//!
//! ```text
//! CTL[d] = CTL[d-1] + (TSS[d] - CTL[d-1]) / 42
//! ATL[d] = ATL[d-1] + (TSS[d] - ATL[d-1]) / 7
//! TSB[d] = CTL[d] - ATL[d]
//! ```
//!
//! The recurrence is inherently sequential over calendar days for one
//! athlete; different athletes' histories are independent. Days with no
//! rides contribute zero TSS. Absent warm-up history, the seed is zero.

use crate::error::MetricsError;
use crate::models::{FitnessPoint, FitnessSummary, Ride};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Days of rest projected forward by [`PmcCalculator::forecast`]
pub const FORECAST_DAYS: u32 = 30;

/// PMC time constants, after the standard Coggan model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PmcConfig {
    /// CTL time constant in days (default: 42)
    pub ctl_time_constant: u16,

    /// ATL time constant in days (default: 7)
    pub atl_time_constant: u16,
}

impl Default for PmcConfig {
    fn default() -> Self {
        PmcConfig {
            ctl_time_constant: 42,
            atl_time_constant: 7,
        }
    }
}

/// Warm-up state carried into the recurrence; zero for a fresh history
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FitnessSeed {
    pub ctl: f64,
    pub atl: f64,
}

impl From<&FitnessPoint> for FitnessSeed {
    fn from(point: &FitnessPoint) -> Self {
        FitnessSeed {
            ctl: point.ctl,
            atl: point.atl,
        }
    }
}

/// Core fitness trend calculation engine
pub struct PmcCalculator {
    config: PmcConfig,
}

impl PmcCalculator {
    pub fn new() -> Self {
        PmcCalculator {
            config: PmcConfig::default(),
        }
    }

    pub fn with_config(config: PmcConfig) -> Self {
        PmcCalculator { config }
    }

    /// Sum ride TSS by calendar day. Days absent from the map are rest days;
    /// the recurrence treats them as zero when walking the range.
    pub fn aggregate_daily_tss(&self, rides: &[Ride]) -> BTreeMap<NaiveDate, f64> {
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for ride in rides {
            *daily.entry(ride.date).or_insert(0.0) += ride.tss();
        }
        daily
    }

    /// Run the recurrence over an explicit date range with an explicit seed.
    /// Every day in the range gets a point; missing days count as zero TSS.
    pub fn fitness_series_range(
        &self,
        daily_tss: &BTreeMap<NaiveDate, f64>,
        start: NaiveDate,
        end: NaiveDate,
        seed: FitnessSeed,
    ) -> Result<Vec<FitnessPoint>, MetricsError> {
        if start > end {
            return Err(MetricsError::InvalidInput {
                field: "date_range".to_string(),
                reason: format!("start {} is after end {}", start, end),
            });
        }

        let ctl_tc = self.config.ctl_time_constant as f64;
        let atl_tc = self.config.atl_time_constant as f64;

        let mut ctl = seed.ctl;
        let mut atl = seed.atl;
        let mut series = Vec::new();

        let mut date = start;
        loop {
            let tss = daily_tss.get(&date).copied().unwrap_or(0.0);
            ctl += (tss - ctl) / ctl_tc;
            atl += (tss - atl) / atl_tc;
            series.push(FitnessPoint {
                date,
                ctl,
                atl,
                tsb: ctl - atl,
            });
            if date == end {
                break;
            }
            date = date.succ_opt().ok_or_else(|| MetricsError::InvalidInput {
                field: "date_range".to_string(),
                reason: "date overflow".to_string(),
            })?;
        }

        Ok(series)
    }

    /// Daily series from the first loaded day through `through` (or the last
    /// loaded day, whichever is later), seeded from zero. Empty input yields
    /// an empty series: a brand-new athlete is a valid, displayable state.
    pub fn fitness_series(
        &self,
        daily_tss: &BTreeMap<NaiveDate, f64>,
        through: Option<NaiveDate>,
    ) -> Vec<FitnessPoint> {
        let (first, last) = match (daily_tss.keys().next(), daily_tss.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Vec::new(),
        };
        let end = through.map_or(last, |t| t.max(last));

        // Range is well-formed by construction, so this cannot fail
        self.fitness_series_range(daily_tss, first, end, FitnessSeed::default())
            .unwrap_or_default()
    }

    /// Project `days` of complete rest forward from a final state. Pure:
    /// operates on a copy of the state and never touches stored history.
    pub fn forecast(&self, from: FitnessSeed, after: NaiveDate, days: u32) -> Vec<FitnessPoint> {
        let ctl_tc = self.config.ctl_time_constant as f64;
        let atl_tc = self.config.atl_time_constant as f64;

        let mut ctl = from.ctl;
        let mut atl = from.atl;
        let mut series = Vec::with_capacity(days as usize);

        let mut date = after;
        for _ in 0..days {
            date = match date.succ_opt() {
                Some(d) => d,
                None => break,
            };
            ctl += (0.0 - ctl) / ctl_tc;
            atl += (0.0 - atl) / atl_tc;
            series.push(FitnessPoint {
                date,
                ctl,
                atl,
                tsb: ctl - atl,
            });
        }

        series
    }

    /// Full fitness picture for an athlete's ride history: current values,
    /// peak CTL, daily history, and the 30-day rest forecast
    pub fn fitness_summary(&self, rides: &[Ride], through: Option<NaiveDate>) -> FitnessSummary {
        let daily = self.aggregate_daily_tss(rides);
        let history = self.fitness_series(&daily, through);

        let last = match history.last() {
            Some(last) => last.clone(),
            None => return FitnessSummary::empty(),
        };

        let peak_ctl = history.iter().map(|p| p.ctl).fold(0.0, f64::max);
        let forecast = self.forecast(FitnessSeed::from(&last), last.date, FORECAST_DAYS);

        FitnessSummary {
            current_ctl: last.ctl,
            current_atl: last.atl,
            current_tsb: last.tsb,
            peak_ctl,
            history,
            forecast,
        }
    }
}

impl Default for PmcCalculator {
    fn default() -> Self {
        Self::new()
    }
}
