// Library interface for the VeloWatt metrics engine
// This allows integration tests and the CLI to access the core functionality

pub mod error;
pub mod ftp;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod pmc;
pub mod recalc;
pub mod zones;

// Re-export commonly used types for convenience
pub use error::{MetricsError, Result, VelowattError};
pub use ftp::{FtpEstimate, FtpEstimateMethod, FtpEstimator};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use metrics::{MetricsCalculator, RideInput, TssRecovery};
pub use models::*;
pub use pmc::{FitnessSeed, PmcCalculator, PmcConfig};
pub use recalc::{recalculate_all, RecalcOutcome};
pub use zones::{IntensityZone, PowerZone, ZoneCalculator};
