//! Tour representation and evaluation.
//!
//! A [`Tour`] is an ordered, cyclic arrangement of every input point. Tours
//! are values: the neighbor move and the initial shuffle both build new tours
//! and never mutate an existing one.

use crate::geometry::{distance, Coordinate};
use ordered_float::OrderedFloat;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// A candidate closed route through all points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    points: Vec<Coordinate>,
}

impl Tour {
    /// Wrap an already ordered sequence of points
    pub fn from_points(points: Vec<Coordinate>) -> Self {
        Tour { points }
    }

    /// Uniformly random permutation of `points`, drawn from `rng`
    pub fn random_initial<R: Rng + ?Sized>(points: &[Coordinate], rng: &mut R) -> Self {
        let mut shuffled = points.to_vec();
        shuffled.shuffle(rng);
        Tour { points: shuffled }
    }

    /// Total cyclic length, closing the loop from the last point back to the first
    pub fn length(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }

        let mut length = 0.0;
        for i in 0..n - 1 {
            length += distance(self.points[i], self.points[i + 1]);
        }

        length += distance(self.points[n - 1], self.points[0]);

        length
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The tour as a polyline, with the first point repeated at the end
    pub fn closed_polyline(&self) -> Vec<Coordinate> {
        let mut line = self.points.clone();
        if let Some(&first) = self.points.first() {
            line.push(first);
        }
        line
    }

    /// Check that this tour holds exactly the multiset `points`
    pub fn is_permutation_of(&self, points: &[Coordinate]) -> bool {
        if self.points.len() != points.len() {
            return false;
        }

        let key = |c: &Coordinate| (OrderedFloat(c.x), OrderedFloat(c.y));
        let mut ours: Vec<_> = self.points.iter().map(key).collect();
        let mut theirs: Vec<_> = points.iter().map(key).collect();
        ours.sort_unstable();
        theirs.sort_unstable();

        ours == theirs
    }

    /// Reverse the half-open range `[start, end)` of a copy of this tour
    pub(crate) fn with_reversed(&self, start: usize, end: usize) -> Tour {
        let mut points = self.points.clone();
        points[start..end].reverse();
        Tour { points }
    }
}

impl std::fmt::Display for Tour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Tour ({} points)", self.points.len())?;
        writeln!(f, "  Length: {:.2}", self.length())?;
        let order: Vec<String> = self.points.iter().map(|p| p.to_string()).collect();
        writeln!(f, "  Order: {}", order.join(" -> "))
    }
}
