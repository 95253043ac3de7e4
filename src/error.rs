//! Error types for fsqca

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// fsqca errors
///
/// Every variant is fatal for the current run: a truth table built from
/// partially calibrated data is meaningless, so there is no partial-result mode.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed configuration, including unordered or non-finite threshold triplets
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A condition or outcome has no threshold triplet configured
    #[error("Missing calibration: no threshold triplet configured for '{0}'")]
    MissingCalibration(String),

    /// A calibrated condition membership is exactly 0.5
    #[error(
        "Ambiguous membership: condition '{condition}' is exactly 0.5 for case(s): {}",
        .cases.join(", ")
    )]
    AmbiguousMembership {
        condition: String,
        cases: Vec<String>,
    },

    /// Too many conditions to enumerate every truth table corner
    #[error("Condition explosion: {count} conditions exceed the enumeration limit of {limit}")]
    ConditionExplosion { count: usize, limit: usize },

    /// Row-count mismatch, missing column, missing case identifier, or bad cell
    #[error("Data shape error: {0}")]
    DataShape(String),

    #[error("Minimization error: {0}")]
    Minimization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
