//! Simulated annealing with periodic reheating.
//!
//! [`step`] is one Metropolis transition. [`Annealer`] owns the current tour
//! and the random source of a run and yields one [`AnnealingStep`] per pull.

use crate::config::RunConfig;
use crate::geometry::Coordinate;
use crate::heuristics::neighbor::propose;
use crate::heuristics::schedule::ReheatSchedule;
use crate::solution::Tour;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Metropolis criterion.
///
/// Improvements are always accepted. Otherwise a uniform draw in `[0, 1)` is
/// compared against `exp(-delta / temperature)`; a non-positive temperature
/// rejects without drawing.
pub fn metropolis_accepts<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    if delta < 0.0 {
        return true;
    }
    if temperature <= 0.0 {
        return false;
    }

    let probability = (-delta / temperature).exp();
    rng.gen::<f64>() <= probability
}

/// Outcome of a single annealing step
#[derive(Debug, Clone)]
pub struct Transition {
    /// Candidate if accepted, otherwise the unchanged input tour
    pub next: Tour,
    /// Length of the input tour, not of `next`
    pub current_distance: f64,
    pub accepted: bool,
}

/// One Metropolis transition from `current` at `temperature`
pub fn step<R: Rng + ?Sized>(current: &Tour, temperature: f64, rng: &mut R) -> Transition {
    let current_distance = current.length();
    let candidate = propose(current, rng);
    let delta = candidate.length() - current_distance;

    if metropolis_accepts(delta, temperature, rng) {
        Transition { next: candidate, current_distance, accepted: true }
    } else {
        Transition { next: current.clone(), current_distance, accepted: false }
    }
}

/// Lifecycle of an [`Annealer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Initial tour built, nothing produced yet
    Idle,
    Running,
    /// Iteration budget exhausted
    Done,
}

/// Item produced by the annealer for every iteration
#[derive(Debug, Clone)]
pub struct AnnealingStep {
    pub iteration: usize,
    pub temperature: f64,
    /// Current tour after the transition
    pub tour: Tour,
    /// Length of the tour before the transition
    pub distance: f64,
    pub accepted: bool,
}

/// Pull-based annealing driver
pub struct Annealer {
    config: RunConfig,
    schedule: ReheatSchedule,
    current: Tour,
    rng: ChaCha8Rng,
    iteration: usize,
    accepted_moves: usize,
    state: RunState,
}

impl Annealer {
    /// Seed the random source from the configuration (or entropy) and
    /// shuffle `points` into the initial tour
    pub fn new(points: &[Coordinate], config: RunConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(points, config, rng)
    }

    /// Like [`Annealer::new`] but continuing an existing random stream
    pub fn with_rng(points: &[Coordinate], config: RunConfig, mut rng: ChaCha8Rng) -> Self {
        let initial = Tour::random_initial(points, &mut rng);
        Self::from_tour(initial, config, rng)
    }

    /// Start from a given tour instead of a random shuffle
    pub fn from_tour(initial: Tour, config: RunConfig, rng: ChaCha8Rng) -> Self {
        log::info!(
            "Annealing {} points (iterations: {}, reheat period: {})",
            initial.len(),
            config.iteration_limit().map_or_else(|| "unbounded".to_string(), |n| n.to_string()),
            config.reheat_period
        );

        Annealer {
            schedule: ReheatSchedule::new(config.reheat_period),
            config,
            current: initial,
            rng,
            iteration: 0,
            accepted_moves: 0,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn current_tour(&self) -> &Tour {
        &self.current
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn schedule(&self) -> ReheatSchedule {
        self.schedule
    }

    pub fn iterations_done(&self) -> usize {
        self.iteration
    }

    pub fn accepted_moves(&self) -> usize {
        self.accepted_moves
    }
}

impl Iterator for Annealer {
    type Item = AnnealingStep;

    fn next(&mut self) -> Option<AnnealingStep> {
        if self.state == RunState::Done {
            return None;
        }
        if self.config.iteration_limit().is_some_and(|limit| self.iteration >= limit) {
            self.state = RunState::Done;
            return None;
        }
        self.state = RunState::Running;

        let iteration = self.iteration;
        let temperature = self.schedule.temperature(iteration);
        if self.schedule.is_reheat(iteration) {
            log::debug!("Reheating at iteration {} (distance {:.4})", iteration, self.current.length());
        }

        let transition = step(&self.current, temperature, &mut self.rng);
        log::trace!(
            "iteration {}: T={:.4} distance={:.4} accepted={}",
            iteration,
            temperature,
            transition.current_distance,
            transition.accepted
        );

        self.current = transition.next;
        self.iteration += 1;
        if transition.accepted {
            self.accepted_moves += 1;
        }
        if self.config.iteration_limit().is_some_and(|limit| self.iteration >= limit) {
            self.state = RunState::Done;
            log::info!("Annealing finished after {} iterations", self.iteration);
        }

        Some(AnnealingStep {
            iteration,
            temperature,
            tour: self.current.clone(),
            distance: transition.current_distance,
            accepted: transition.accepted,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.config.iteration_limit() {
            Some(limit) => {
                let remaining = limit.saturating_sub(self.iteration);
                (remaining, Some(remaining))
            }
            None => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 1.0),
        ]
    }

    /// Crossing square tour whose only non-trivial move (swapping the first
    /// two points) yields the optimal square.
    fn crossing_square() -> Tour {
        Tour::from_points(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
        ])
    }

    fn worst_square_length() -> f64 {
        2.0 + 2.0 * 2f64.sqrt()
    }

    #[test]
    fn test_improvement_always_accepted() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..1_000 {
            assert!(metropolis_accepts(-1e-9, 1e-12, &mut rng));
            assert!(metropolis_accepts(-3.0, 0.0, &mut rng));
        }
    }

    #[test]
    fn test_zero_delta_always_accepted() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..1_000 {
            assert!(metropolis_accepts(0.0, 0.01, &mut rng));
        }
    }

    #[test]
    fn test_non_positive_temperature_rejects_worsening() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert!(!metropolis_accepts(0.5, 0.0, &mut rng));
        assert!(!metropolis_accepts(0.5, -1.0, &mut rng));
        assert!(!metropolis_accepts(0.0, 0.0, &mut rng));
    }

    #[test]
    fn test_step_reports_input_distance() {
        let current = crossing_square();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let transition = step(&current, 1.0, &mut rng);
            assert!((transition.current_distance - current.length()).abs() < 1e-12);
            assert!(transition.next.is_permutation_of(current.points()));
        }
    }

    #[test]
    fn test_step_takes_improving_candidate() {
        let current = crossing_square();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut improved = 0;

        for _ in 0..200 {
            let transition = step(&current, 1e-12, &mut rng);
            if transition.next != current {
                assert!(transition.accepted);
                assert!((transition.next.length() - 4.0).abs() < 1e-12);
                improved += 1;
            }
        }

        assert!(improved > 0);
    }

    #[test]
    fn test_finite_run_state_machine() {
        let config = RunConfig::new(Some(5), 100, Some(42)).unwrap();
        let mut annealer = Annealer::new(&square_points(), config);
        assert_eq!(annealer.state(), RunState::Idle);

        assert!(annealer.next().is_some());
        assert_eq!(annealer.state(), RunState::Running);

        assert_eq!(annealer.by_ref().count(), 4);
        assert_eq!(annealer.state(), RunState::Done);
        assert!(annealer.next().is_none());
        assert_eq!(annealer.iterations_done(), 5);
    }

    #[test]
    fn test_single_iteration_run_is_done_after_one_item() {
        let config = RunConfig::new(Some(1), 100, Some(8)).unwrap();
        let mut annealer = Annealer::new(&square_points(), config);

        let first = annealer.next().unwrap();
        assert_eq!(first.iteration, 0);
        assert_eq!(first.temperature, 1.0);
        assert_eq!(annealer.state(), RunState::Done);
        assert!(annealer.next().is_none());
    }

    #[test]
    fn test_unbounded_run_keeps_producing() {
        let config = RunConfig::new(None, 10, Some(5)).unwrap();
        let annealer = Annealer::new(&square_points(), config);
        let steps: Vec<AnnealingStep> = annealer.take(2_500).collect();

        assert_eq!(steps.len(), 2_500);
        assert_eq!(steps[2_499].iteration, 2_499);
        assert_eq!(steps[2_490].temperature, 1.0);
        assert!((steps[2_499].temperature - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_distance_lags_tour_by_one_iteration() {
        let config = RunConfig::new(Some(300), 100, Some(6)).unwrap();
        let steps: Vec<AnnealingStep> = Annealer::new(&square_points(), config).collect();

        for pair in steps.windows(2) {
            assert!((pair[1].distance - pair[0].tour.length()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let points: Vec<Coordinate> = (0..25)
            .map(|i| Coordinate::new((i * 37 % 101) as f64, (i * 59 % 97) as f64))
            .collect();
        let config = RunConfig::new(Some(500), 100, Some(1234)).unwrap();

        let a: Vec<(Tour, f64)> = Annealer::new(&points, config.clone()).map(|s| (s.tour, s.distance)).collect();
        let b: Vec<(Tour, f64)> = Annealer::new(&points, config).map(|s| (s.tour, s.distance)).collect();

        assert_eq!(a, b);
    }

    #[test]
    fn test_every_item_is_permutation_of_input() {
        let points: Vec<Coordinate> = (0..12).map(|i| Coordinate::new(i as f64, (i % 4) as f64)).collect();
        let config = RunConfig::new(Some(400), 100, Some(77)).unwrap();

        for item in Annealer::new(&points, config) {
            assert!(item.tour.is_permutation_of(&points));
        }
    }

    #[test]
    fn test_unit_square_converges_to_optimum() {
        let config = RunConfig::new(Some(1_000), 100, None).unwrap();
        let rng = ChaCha8Rng::seed_from_u64(2024);
        let mut annealer = Annealer::from_tour(crossing_square(), config, rng);
        let initial_length = annealer.current_tour().length();

        let steps: Vec<AnnealingStep> = annealer.by_ref().collect();

        for item in &steps {
            assert!(item.distance >= 4.0 - 1e-9);
            assert!(item.distance <= initial_length + 1e-9);
            assert!(item.distance <= worst_square_length() + 1e-9);
        }
        for item in &steps[steps.len() - 10..] {
            assert!((item.distance - 4.0).abs() < 1e-9);
        }
        assert!((annealer.current_tour().length() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_seeded_unit_square_converges_to_optimum() {
        let config = RunConfig::new(Some(1_000), 100, Some(0)).unwrap();
        let mut annealer = Annealer::new(&square_points(), config);

        let steps: Vec<AnnealingStep> = annealer.by_ref().collect();

        assert_eq!(steps.len(), 1_000);
        for item in &steps[steps.len() - 10..] {
            assert!((item.distance - 4.0).abs() < 1e-9);
        }
        assert!((annealer.current_tour().length() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_with_diagonal_tail_never_improves() {
        // Positions 2 and 3 hold opposite corners; the only real move swaps
        // positions 0 and 1, which keeps both diagonals.
        let stuck = Tour::from_points(vec![
            Coordinate::new(1.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
        ]);
        assert!((stuck.length() - worst_square_length()).abs() < 1e-12);

        let config = RunConfig::new(Some(1_000), 100, None).unwrap();
        let rng = ChaCha8Rng::seed_from_u64(11);
        for item in Annealer::from_tour(stuck, config, rng) {
            assert!((item.distance - worst_square_length()).abs() < 1e-9);
            assert!((item.tour.length() - worst_square_length()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_random_square_stays_within_bounds() {
        let config = RunConfig::new(Some(500), 100, Some(99)).unwrap();
        for item in Annealer::new(&square_points(), config) {
            assert!(item.distance >= 4.0 - 1e-9);
            assert!(item.distance <= worst_square_length() + 1e-9);
        }
    }

    #[test]
    fn test_collinear_points_reach_optimum() {
        let points = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(2.0, 0.0),
        ];
        let config = RunConfig::new(Some(200), 100, Some(3)).unwrap();
        let mut annealer = Annealer::new(&points, config);

        for item in annealer.by_ref() {
            assert!((item.distance - 4.0).abs() < 1e-12);
        }
        assert!((annealer.current_tour().length() - 4.0).abs() < 1e-12);
    }
}
