//! Run configuration and validation of raw command-line values.
//!
//! Validation happens here, before any tour exists. The optimizer assumes a
//! [`RunConfig`] it receives is already valid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Smallest point set that forms a meaningful tour
pub const MIN_POINTS: usize = 3;

/// Default number of iterations between reheats
pub const DEFAULT_REHEAT_PERIOD: usize = 100;

/// Parameters of one annealing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of iterations; `None` runs forever
    pub iterations: Option<NonZeroUsize>,
    /// Iterations between temperature resets
    pub reheat_period: NonZeroUsize,
    /// Random seed; `None` seeds from system entropy
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            iterations: None,
            reheat_period: NonZeroUsize::new(DEFAULT_REHEAT_PERIOD).unwrap_or(NonZeroUsize::MIN),
            seed: None,
        }
    }
}

impl RunConfig {
    /// Build a configuration from unchecked values
    pub fn new(iterations: Option<i64>, reheat_period: i64, seed: Option<u64>) -> Result<Self> {
        let mut config = RunConfig { seed, ..RunConfig::default() };

        if let Some(count) = iterations {
            if count < 1 {
                return Err(Error::InvalidIterationCount(count));
            }
            config = config.with_iterations(count as usize)?;
        }
        if reheat_period < 1 {
            return Err(Error::InvalidReheatPeriod(reheat_period));
        }

        config.with_reheat_period(reheat_period as usize)
    }

    /// Bound the run; zero iterations is rejected
    pub fn with_iterations(mut self, iterations: usize) -> Result<Self> {
        let iterations = NonZeroUsize::new(iterations).ok_or(Error::InvalidIterationCount(0))?;
        self.iterations = Some(iterations);
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the reheat period; a period of zero is rejected
    pub fn with_reheat_period(mut self, reheat_period: usize) -> Result<Self> {
        self.reheat_period = NonZeroUsize::new(reheat_period).ok_or(Error::InvalidReheatPeriod(0))?;
        Ok(self)
    }

    pub fn is_bounded(&self) -> bool {
        self.iterations.is_some()
    }

    pub fn iteration_limit(&self) -> Option<usize> {
        self.iterations.map(NonZeroUsize::get)
    }
}

/// Check a requested random point count
pub fn validate_point_count(count: i64) -> Result<usize> {
    if count < MIN_POINTS as i64 {
        return Err(Error::InsufficientPoints(count.max(0) as usize));
    }
    Ok(count as usize)
}

/// Where the points of a run come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// CSV file with `x` and `y` columns
    File(PathBuf),
    /// This many random points
    Random(usize),
}

impl InputSource {
    /// Pick exactly one of a file path or a random point count
    pub fn resolve(file: Option<PathBuf>, count: Option<i64>) -> Result<Self> {
        match (file, count) {
            (Some(_), Some(_)) => Err(Error::InvalidInputSource(
                "use either -f or -n, not both".to_string(),
            )),
            (None, None) => Err(Error::InvalidInputSource(
                "either -f or -n must be specified".to_string(),
            )),
            (Some(path), None) => {
                if !path.exists() {
                    return Err(Error::MissingInputFile(path));
                }
                Ok(InputSource::File(path))
            }
            (None, Some(count)) => Ok(InputSource::Random(validate_point_count(count)?)),
        }
    }
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputSource::File(path) => write!(f, "file {}", path.display()),
            InputSource::Random(count) => write!(f, "{} random points", count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();
        assert_eq!(config.reheat_period.get(), 100);
        assert!(config.iterations.is_none());
        assert!(!config.is_bounded());
    }

    #[test]
    fn test_zero_or_negative_iterations_rejected() {
        assert!(matches!(RunConfig::new(Some(0), 100, None), Err(Error::InvalidIterationCount(0))));
        assert!(matches!(RunConfig::new(Some(-5), 100, None), Err(Error::InvalidIterationCount(-5))));
    }

    #[test]
    fn test_reheat_period_rejected() {
        assert!(matches!(RunConfig::new(None, 0, None), Err(Error::InvalidReheatPeriod(0))));
    }

    #[test]
    fn test_valid_config() {
        let config = RunConfig::new(Some(500), 25, Some(9)).unwrap();
        assert_eq!(config.iteration_limit(), Some(500));
        assert_eq!(config.reheat_period.get(), 25);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_builders_reject_zero() {
        assert!(matches!(RunConfig::default().with_iterations(0), Err(Error::InvalidIterationCount(0))));
        assert!(matches!(RunConfig::default().with_reheat_period(0), Err(Error::InvalidReheatPeriod(0))));

        let config = RunConfig::default().with_iterations(7).unwrap().with_reheat_period(3).unwrap();
        assert_eq!(config.iteration_limit(), Some(7));
        assert_eq!(config.reheat_period.get(), 3);
    }

    #[test]
    fn test_zero_reheat_period_rejected_when_deserializing() {
        let json = r#"{"iterations":null,"reheat_period":0,"seed":null}"#;
        assert!(serde_json::from_str::<RunConfig>(json).is_err());
    }

    #[test]
    fn test_input_source_requires_exactly_one() {
        assert!(matches!(
            InputSource::resolve(Some(PathBuf::from("points.csv")), Some(10)),
            Err(Error::InvalidInputSource(_))
        ));
        assert!(matches!(InputSource::resolve(None, None), Err(Error::InvalidInputSource(_))));
    }

    #[test]
    fn test_missing_file_rejected() {
        let path = PathBuf::from("definitely/not/here/points.csv");
        assert!(matches!(InputSource::resolve(Some(path), None), Err(Error::MissingInputFile(_))));
    }

    #[test]
    fn test_point_count_checked() {
        assert!(matches!(InputSource::resolve(None, Some(2)), Err(Error::InsufficientPoints(2))));
        assert!(matches!(InputSource::resolve(None, Some(-1)), Err(Error::InsufficientPoints(0))));
        assert_eq!(InputSource::resolve(None, Some(3)).unwrap(), InputSource::Random(3));
    }
}
