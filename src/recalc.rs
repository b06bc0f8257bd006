//! Bulk recalculation after an FTP change
//!
//! Two explicit phases. Phase 1 recomputes every ride's metrics against a
//! single FTP snapshot; per-ride work is order-independent and runs in
//! parallel. Phase 2 rebuilds the fitness series sequentially, only after
//! every per-ride TSS is updated, so the recurrence never observes a
//! partially-updated daily series.

use crate::error::MetricsError;
use crate::metrics::{MetricsCalculator, RideInput};
use crate::models::{FitnessSummary, Ride};
use crate::pmc::PmcCalculator;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of a bulk recalculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalcOutcome {
    /// Number of rides whose metrics were recomputed
    pub rides_updated: usize,

    /// The FTP snapshot every ride was recomputed against
    pub ftp_used: f64,

    /// Fitness picture rebuilt from the updated rides
    pub fitness: FitnessSummary,
}

/// Recompute all ride metrics against `ftp`, then rebuild the fitness
/// series. Idempotent: recalculating with the same FTP yields identical
/// stored values.
pub fn recalculate_all(
    rides: &mut [Ride],
    ftp: f64,
    pmc: &PmcCalculator,
    through: Option<NaiveDate>,
) -> Result<RecalcOutcome, MetricsError> {
    if !ftp.is_finite() || ftp <= 0.0 {
        return Err(MetricsError::Configuration(format!(
            "FTP must be a positive number of watts, got {}",
            ftp
        )));
    }

    debug!(rides = rides.len(), ftp, "starting bulk recalculation");

    // Reject malformed input before touching any ride; a failure mid-pass
    // would leave the slice stamped with a mix of old and new metrics
    rides
        .iter()
        .try_for_each(|ride| MetricsCalculator::validate(&RideInput::from(ride), ftp))?;

    // Phase 1: per-ride metrics, parallel across rides
    rides
        .par_iter_mut()
        .try_for_each(|ride| MetricsCalculator::update_ride(ride, ftp))?;

    // Phase 2: fitness trend, sequential over calendar days
    let fitness = pmc.fitness_summary(rides, through);

    info!(
        rides_updated = rides.len(),
        ftp, ctl = fitness.current_ctl, "bulk recalculation complete"
    );

    Ok(RecalcOutcome {
        rides_updated: rides.len(),
        ftp_used: ftp,
        fitness,
    })
}
