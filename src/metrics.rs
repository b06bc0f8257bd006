//! Per-ride training metric calculator
//!
//! Computes Normalized Power, Intensity Factor, Training Stress Score,
//! Variability Index, and Efficiency Factor from a ride's power data and the
//! athlete's FTP. Pure and stateless: the caller supplies FTP explicitly and
//! is responsible for persisting the results.

use crate::error::MetricsError;
use crate::models::{Ride, RideMetrics};

/// Rolling average window for Normalized Power, in one-second samples
pub const ROLLING_WINDOW_SECONDS: usize = 30;

/// Ride data as supplied by the calling layer; never read from storage here
#[derive(Debug, Clone, Default)]
pub struct RideInput<'a> {
    /// Duration in seconds
    pub duration_seconds: u32,

    /// Average power in watts
    pub avg_power: f64,

    /// Per-second power samples, when a full stream is available
    pub power_samples: Option<&'a [f64]>,

    /// Pre-computed summary NP, when a stream is unavailable but a sync
    /// service supplied the value
    pub normalized_power: Option<f64>,

    /// Average heart rate in bpm
    pub avg_heart_rate: Option<f64>,
}

impl<'a> From<&'a Ride> for RideInput<'a> {
    fn from(ride: &'a Ride) -> Self {
        RideInput {
            duration_seconds: ride.duration_seconds,
            avg_power: ride.avg_power,
            power_samples: ride.power_samples.as_deref(),
            normalized_power: ride.normalized_power,
            avg_heart_rate: ride.avg_heart_rate,
        }
    }
}

/// Where the NP value came from; decides how VI is derived
enum NpSource {
    Stream,
    SummaryNp,
    AvgPowerFallback,
}

/// Core per-ride metric calculation engine
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Calculate all per-ride metrics.
    ///
    /// Zero-duration or zero-power rides yield explicit all-zero metrics.
    /// FTP must be positive; malformed power or heart-rate values are
    /// rejected rather than producing nonsensical numbers.
    pub fn calculate(input: &RideInput, ftp: f64) -> Result<RideMetrics, MetricsError> {
        Self::validate(input, ftp)?;

        if input.duration_seconds == 0 {
            return Ok(RideMetrics::zero());
        }

        let (np, source) = Self::resolve_np(input);
        if np <= 0.0 {
            return Ok(RideMetrics::zero());
        }

        let intensity_factor = np / ftp;
        let tss = (input.duration_seconds as f64 * np * intensity_factor) / (ftp * 3600.0) * 100.0;

        // VI is exactly 1.0 on the average-power fallback; that exactness
        // signals "no stream data" to downstream display logic
        let variability_index = match source {
            NpSource::AvgPowerFallback => 1.0,
            NpSource::Stream | NpSource::SummaryNp => {
                if input.avg_power > 0.0 {
                    np / input.avg_power
                } else {
                    0.0
                }
            }
        };

        let efficiency_factor = input
            .avg_heart_rate
            .filter(|hr| *hr > 0.0)
            .map(|hr| np / hr);

        Ok(RideMetrics {
            normalized_power: np,
            intensity_factor,
            tss,
            variability_index,
            efficiency_factor,
        })
    }

    /// Calculate metrics for a ride and write them back, stamping the FTP
    /// snapshot used
    pub fn update_ride(ride: &mut Ride, ftp: f64) -> Result<(), MetricsError> {
        let metrics = Self::calculate(&RideInput::from(&*ride), ftp)?;
        ride.normalized_power = Some(metrics.normalized_power);
        ride.ftp_at_time = Some(ftp);
        ride.metrics = Some(metrics);
        Ok(())
    }

    /// Normalized Power over a full power stream.
    ///
    /// 30-second simple rolling average over every full window (the first
    /// 29 seconds seed the first window and produce no partial averages);
    /// each rolling value is raised to the 4th power, averaged, and the 4th
    /// root taken. Partial windows at the stream start would average below
    /// the surrounding load and turn the variability penalty into a
    /// discount. Returns `None` for streams shorter than the window, where
    /// NP falls back to average power.
    pub fn rolling_normalized_power(samples: &[f64]) -> Option<f64> {
        if samples.len() < ROLLING_WINDOW_SECONDS {
            return None;
        }

        let mut window_sum: f64 = samples[..ROLLING_WINDOW_SECONDS].iter().sum();
        let mut sum_fourth = (window_sum / ROLLING_WINDOW_SECONDS as f64).powi(4);
        for i in ROLLING_WINDOW_SECONDS..samples.len() {
            window_sum += samples[i] - samples[i - ROLLING_WINDOW_SECONDS];
            let rolling_avg = window_sum / ROLLING_WINDOW_SECONDS as f64;
            sum_fourth += rolling_avg.powi(4);
        }

        let windows = (samples.len() - ROLLING_WINDOW_SECONDS + 1) as f64;
        let mean_fourth = sum_fourth / windows;
        Some(mean_fourth.sqrt().sqrt())
    }

    fn resolve_np(input: &RideInput) -> (f64, NpSource) {
        if let Some(np) = input
            .power_samples
            .and_then(Self::rolling_normalized_power)
        {
            return (np, NpSource::Stream);
        }
        if let Some(np) = input.normalized_power.filter(|np| *np > 0.0) {
            return (np, NpSource::SummaryNp);
        }
        (input.avg_power, NpSource::AvgPowerFallback)
    }

    /// Check a ride's numeric inputs and the FTP without computing anything.
    /// Bulk operations run this over every ride before touching any of them.
    pub fn validate(input: &RideInput, ftp: f64) -> Result<(), MetricsError> {
        if !ftp.is_finite() || ftp <= 0.0 {
            return Err(MetricsError::Configuration(format!(
                "FTP must be a positive number of watts, got {}",
                ftp
            )));
        }

        if !input.avg_power.is_finite() || input.avg_power < 0.0 {
            return Err(MetricsError::InvalidInput {
                field: "avg_power".to_string(),
                reason: format!("must be a non-negative number, got {}", input.avg_power),
            });
        }

        if let Some(np) = input.normalized_power {
            if !np.is_finite() || np < 0.0 {
                return Err(MetricsError::InvalidInput {
                    field: "normalized_power".to_string(),
                    reason: format!("must be a non-negative number, got {}", np),
                });
            }
        }

        if let Some(hr) = input.avg_heart_rate {
            if !hr.is_finite() || hr < 0.0 {
                return Err(MetricsError::InvalidInput {
                    field: "avg_heart_rate".to_string(),
                    reason: format!("must be a non-negative number, got {}", hr),
                });
            }
        }

        if let Some(samples) = input.power_samples {
            if let Some(bad) = samples.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(MetricsError::InvalidInput {
                    field: "power_samples".to_string(),
                    reason: format!("samples must be non-negative numbers, found {}", bad),
                });
            }
        }

        Ok(())
    }
}

/// Estimated recovery cost of a ride, from its TSS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TssRecovery {
    Low,      // < 150
    Medium,   // 150-300
    High,     // 300-450
    VeryHigh, // 450+
}

impl TssRecovery {
    pub fn from_tss(tss: f64) -> Self {
        if tss < 150.0 {
            TssRecovery::Low
        } else if tss < 300.0 {
            TssRecovery::Medium
        } else if tss < 450.0 {
            TssRecovery::High
        } else {
            TssRecovery::VeryHigh
        }
    }

    /// Rider-facing recovery guidance
    pub fn description(&self) -> &'static str {
        match self {
            TssRecovery::Low => "Low - recovery within 24h",
            TssRecovery::Medium => "Medium - some fatigue next day",
            TssRecovery::High => "High - fatigue for ~2 days",
            TssRecovery::VeryHigh => "Very high - fatigue for several days",
        }
    }
}

/// Round to one decimal place for display; stored values keep full precision
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to an arbitrary number of decimal places
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Format a duration in seconds as H:MM:SS (or M:SS under an hour)
pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
