//! Cyclic reheating temperature schedule.
//!
//! Within each block of `period` iterations the temperature decays
//! harmonically from 1 down to `1 / period`, then jumps back to 1.

use crate::config::DEFAULT_REHEAT_PERIOD;
use std::num::NonZeroUsize;

/// Temperature for iteration `iteration` under a reheat period of `reheat_period`.
///
/// The result lies in `[1 / reheat_period, 1]`.
#[inline]
pub fn temperature(iteration: usize, reheat_period: NonZeroUsize) -> f64 {
    1.0 / ((iteration % reheat_period.get()) + 1) as f64
}

/// Sawtooth schedule with a fixed reheat period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReheatSchedule {
    period: NonZeroUsize,
}

impl ReheatSchedule {
    pub fn new(period: NonZeroUsize) -> Self {
        ReheatSchedule { period }
    }

    pub fn period(&self) -> usize {
        self.period.get()
    }

    pub fn temperature(&self, iteration: usize) -> f64 {
        temperature(iteration, self.period)
    }

    /// True on the first iteration of every block after the first one
    pub fn is_reheat(&self, iteration: usize) -> bool {
        iteration > 0 && iteration % self.period.get() == 0
    }

    /// Temperature of the last iteration of each block
    pub fn min_temperature(&self) -> f64 {
        1.0 / self.period.get() as f64
    }
}

impl Default for ReheatSchedule {
    fn default() -> Self {
        ReheatSchedule::new(NonZeroUsize::new(DEFAULT_REHEAT_PERIOD).unwrap_or(NonZeroUsize::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn period(p: usize) -> NonZeroUsize {
        NonZeroUsize::new(p).unwrap()
    }

    #[test]
    fn test_sawtooth_shape() {
        let schedule = ReheatSchedule::new(period(4));
        let temps: Vec<f64> = (0..8).map(|i| schedule.temperature(i)).collect();

        assert_eq!(temps, vec![1.0, 0.5, 1.0 / 3.0, 0.25, 1.0, 0.5, 1.0 / 3.0, 0.25]);
        assert!(!schedule.is_reheat(0));
        assert!(schedule.is_reheat(4));
        assert!(!schedule.is_reheat(5));
    }

    #[test]
    fn test_period_of_one_never_cools() {
        for i in 0..10 {
            assert_eq!(temperature(i, period(1)), 1.0);
        }
    }

    #[test]
    fn test_min_temperature_ends_each_block() {
        let schedule = ReheatSchedule::new(period(5));

        assert_eq!(schedule.min_temperature(), 0.2);
        assert_eq!(schedule.temperature(4), schedule.min_temperature());
        assert_eq!(schedule.temperature(9), schedule.min_temperature());
        assert_eq!(ReheatSchedule::default().period(), 100);
        assert_eq!(ReheatSchedule::default().min_temperature(), 0.01);
    }

    proptest! {
        #[test]
        fn temperature_is_bounded_and_periodic(i in 0usize..1_000_000, p in 1usize..10_000) {
            let schedule = ReheatSchedule::new(period(p));
            let t = schedule.temperature(i);

            prop_assert!(t <= 1.0);
            prop_assert!(t >= schedule.min_temperature());
            prop_assert_eq!(t, schedule.temperature(i + p));
        }
    }
}
