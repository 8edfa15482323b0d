//! Error types for the TSP annealer.
//!
//! Every variant is a startup or export failure. The optimizer core itself
//! never fails.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating the run configuration, loading points or
/// exporting results
#[derive(Debug, Error)]
pub enum Error {
    /// Both or neither of the point file and the random point count were given
    #[error("{0}")]
    InvalidInputSource(String),

    #[error("data file {} does not exist", .0.display())]
    MissingInputFile(PathBuf),

    #[error("data point count cannot be less than 3 (got {0})")]
    InsufficientPoints(usize),

    #[error("iteration count cannot be less than 1 (got {0})")]
    InvalidIterationCount(i64),

    #[error("reheat count cannot be less than 1 (got {0})")]
    InvalidReheatPeriod(i64),

    /// A coordinate in the input was NaN or infinite
    #[error("non-finite coordinate on data row {row}")]
    NonFiniteCoordinate { row: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for fallible operations outside the optimizer core
pub type Result<T> = std::result::Result<T, Error>;
