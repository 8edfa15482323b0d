//! Cooperative stopping of annealing runs.
//!
//! Unbounded runs only end when the consumer stops pulling. The CLI checks a
//! [`StopCondition`] after every iteration: it trips on a wall-clock limit or
//! on Ctrl-C, after which the report and export still run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a run was stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TimeLimit,
    Interrupted,
}

/// Time limit and interruption flag checked between iterations
#[derive(Debug, Clone)]
pub struct StopCondition {
    started: Instant,
    time_limit: Option<Duration>,
    interrupted: Arc<AtomicBool>,
}

impl StopCondition {
    pub fn new(time_limit: Option<Duration>) -> Self {
        StopCondition {
            started: Instant::now(),
            time_limit,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Raise the interruption flag on Ctrl-C (or SIGTERM) instead of exiting.
    ///
    /// The handler can be installed once per process; a failure is logged and
    /// leaves the default signal behaviour in place.
    pub fn with_ctrlc_handler(self) -> Self {
        let flag = self.interrupted.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            log::warn!("cannot set interruption handler: {}", e);
        }
        self
    }

    /// Shared flag; storing `true` stops the run at the next check
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn check(&self) -> Option<StopReason> {
        if self.interrupted.load(Ordering::Relaxed) {
            return Some(StopReason::Interrupted);
        }
        match self.time_limit {
            Some(limit) if self.elapsed() >= limit => Some(StopReason::TimeLimit),
            _ => None,
        }
    }
}

/// Seconds from the command line as a time limit; invalid values are ignored
pub fn parse_time_limit(seconds: Option<f64>) -> Option<Duration> {
    match seconds {
        Some(secs) if secs.is_finite() && secs > 0.0 => Some(Duration::from_secs_f64(secs)),
        Some(secs) => {
            log::warn!("Ignoring invalid time limit {}", secs);
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::geometry::Coordinate;
    use crate::heuristics::annealing::Annealer;

    #[test]
    fn test_no_limit_never_stops_by_itself() {
        let stop = StopCondition::new(None);
        assert_eq!(stop.check(), None);
    }

    #[test]
    fn test_elapsed_time_limit_stops() {
        let stop = StopCondition::new(Some(Duration::ZERO));
        assert_eq!(stop.check(), Some(StopReason::TimeLimit));

        let stop = StopCondition::new(Some(Duration::from_secs(3_600)));
        assert_eq!(stop.check(), None);
    }

    #[test]
    fn test_interrupt_flag_stops_unbounded_run() {
        let points: Vec<Coordinate> = (0..10).map(|i| Coordinate::new(i as f64, (i * i % 7) as f64)).collect();
        let config = RunConfig::new(None, 100, Some(4)).unwrap();
        let stop = StopCondition::new(None);
        let flag = stop.interrupt_flag();

        let mut produced = 0;
        let mut reason = None;
        for step in Annealer::new(&points, config) {
            produced += 1;
            if step.iteration == 249 {
                flag.store(true, Ordering::Relaxed);
            }
            if let Some(r) = stop.check() {
                reason = Some(r);
                break;
            }
        }

        assert_eq!(produced, 250);
        assert_eq!(reason, Some(StopReason::Interrupted));
    }

    #[test]
    fn test_interruption_wins_over_time_limit() {
        let stop = StopCondition::new(Some(Duration::ZERO));
        stop.interrupt_flag().store(true, Ordering::Relaxed);
        assert_eq!(stop.check(), Some(StopReason::Interrupted));
    }

    #[test]
    fn test_parse_time_limit() {
        assert_eq!(parse_time_limit(Some(1.5)), Some(Duration::from_millis(1_500)));
        assert_eq!(parse_time_limit(Some(0.0)), None);
        assert_eq!(parse_time_limit(Some(-2.0)), None);
        assert_eq!(parse_time_limit(Some(f64::NAN)), None);
        assert_eq!(parse_time_limit(None), None);
    }
}
