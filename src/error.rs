//! Unified error hierarchy for VeloWatt
//!
//! The metrics engine fails fast with named, synchronous errors; nothing in
//! this crate is retried. Zero-valued results for empty or zero-duration
//! rides are explicit values, not errors.

use thiserror::Error;

/// Errors produced by the metrics engine itself
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Malformed numeric input that slipped past upstream validation
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A calculation was requested without enough qualifying data
    #[error("Insufficient data for {calculation}: {reason}")]
    InsufficientData { calculation: String, reason: String },

    /// The caller invoked a metric computation without a usable FTP
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Top-level error type for all VeloWatt operations
#[derive(Debug, Error)]
pub enum VelowattError {
    /// Metric calculation errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for VeloWatt operations
pub type Result<T> = std::result::Result<T, VelowattError>;

impl VelowattError {
    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            VelowattError::Metrics(MetricsError::Configuration(_)) => {
                "FTP is not set or invalid. Update your settings with a positive FTP first."
                    .to_string()
            }
            VelowattError::Metrics(MetricsError::InsufficientData { calculation, .. }) => {
                format!(
                    "Not enough ride data to calculate {}. Import more rides with power data.",
                    calculation
                )
            }
            VelowattError::Json(_) => {
                "Could not parse ride file. Expected JSON produced by this tool.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
