//! FTP estimation from ride history
//!
//! Preferred method: 95% of the best 20-minute mean-maximal power found in
//! any ride's power stream. When no stream holds a full 20 minutes, fall
//! back to 95% of the best summary NP among rides of 40 minutes or longer.
//! When neither qualifies, the estimate fails rather than returning a
//! misleading number.

use crate::error::MetricsError;
use crate::models::Ride;
use serde::{Deserialize, Serialize};

/// Window for the sustained-effort search, in one-second samples
const TWENTY_MINUTES: usize = 1200;

/// Minimum duration for the NP-based fallback, in seconds
const LONG_RIDE_SECONDS: u32 = 2400;

/// Fraction of the best sustained effort taken as the FTP estimate
const FTP_FRACTION: f64 = 0.95;

/// How an FTP estimate was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FtpEstimateMethod {
    /// 95% of best 20-minute mean-maximal power from a full stream
    TwentyMinutePower,
    /// 95% of best summary NP among rides of 40 minutes or longer
    LongRideNp,
}

impl FtpEstimateMethod {
    pub fn description(&self) -> &'static str {
        match self {
            FtpEstimateMethod::TwentyMinutePower => "95% of best 20-minute power",
            FtpEstimateMethod::LongRideNp => "95% of best 40min+ normalized power",
        }
    }
}

/// An FTP estimate and the method that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtpEstimate {
    pub watts: f64,
    pub method: FtpEstimateMethod,
}

/// FTP estimation engine
pub struct FtpEstimator;

impl FtpEstimator {
    /// Estimate FTP from the best sustained effort across a ride history
    pub fn estimate(rides: &[Ride]) -> Result<FtpEstimate, MetricsError> {
        let best_20min = rides
            .iter()
            .filter_map(|r| r.power_samples.as_deref())
            .filter_map(|samples| Self::best_window_average(samples, TWENTY_MINUTES))
            .fold(None::<f64>, |best, avg| {
                Some(best.map_or(avg, |b| b.max(avg)))
            });

        if let Some(power) = best_20min {
            return Ok(FtpEstimate {
                watts: power * FTP_FRACTION,
                method: FtpEstimateMethod::TwentyMinutePower,
            });
        }

        let best_np = rides
            .iter()
            .filter(|r| r.duration_seconds >= LONG_RIDE_SECONDS)
            .filter_map(|r| r.summary_np())
            .filter(|np| *np > 0.0)
            .fold(None::<f64>, |best, np| {
                Some(best.map_or(np, |b| b.max(np)))
            });

        if let Some(np) = best_np {
            return Ok(FtpEstimate {
                watts: np * FTP_FRACTION,
                method: FtpEstimateMethod::LongRideNp,
            });
        }

        Err(MetricsError::InsufficientData {
            calculation: "FTP estimate".to_string(),
            reason: "no ride with 20 minutes of continuous power data or a 40min+ NP".to_string(),
        })
    }

    /// Best average over any contiguous window of `window` samples;
    /// None when the stream is shorter than the window
    fn best_window_average(samples: &[f64], window: usize) -> Option<f64> {
        if window == 0 || samples.len() < window {
            return None;
        }

        let mut sum: f64 = samples[..window].iter().sum();
        let mut best = sum;
        for i in window..samples.len() {
            sum += samples[i] - samples[i - window];
            best = best.max(sum);
        }
        Some(best / window as f64)
    }
}
