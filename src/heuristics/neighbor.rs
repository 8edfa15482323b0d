//! Segment-reversal neighborhood.
//!
//! Both reversal boundaries are drawn from `[0, n - 1)`, so the last index of
//! the tour is never a boundary and the last point never moves. Seeded runs
//! are reproduced against this exact draw range; do not widen it to `[0, n)`.
//!
//! Small tours feel this most. With three points every move is a no-op, and
//! with four points the only real move swaps positions 0 and 1. A four-point
//! square whose shuffle puts two opposite corners at positions 2 and 3 stays
//! at `2 + 2√2` forever (roughly a third of seeds).

use crate::solution::Tour;
use rand::prelude::*;

/// Reversal of the half-open position range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentReversal {
    start: usize,
    end: usize,
}

impl SegmentReversal {
    /// Reversal between two positions, in either order
    pub fn new(a: usize, b: usize) -> Self {
        SegmentReversal { start: a.min(b), end: a.max(b) }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Draw two boundaries independently from `[0, n - 1)` and order them.
    ///
    /// With fewer than two points there is nothing to draw and the no-op
    /// reversal `[0, 0)` is returned without consuming randomness.
    pub fn draw<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        if n < 2 {
            return SegmentReversal { start: 0, end: 0 };
        }

        let index1 = rng.gen_range(0..n - 1);
        let index2 = rng.gen_range(0..n - 1);

        SegmentReversal::new(index1, index2)
    }

    pub fn is_noop(&self) -> bool {
        self.end <= self.start + 1
    }

    /// Apply to a copy of `tour`; bounds past the end are clamped
    pub fn apply(&self, tour: &Tour) -> Tour {
        let end = self.end.min(tour.len());
        tour.with_reversed(self.start.min(end), end)
    }
}

/// Candidate successor of `current`: a random segment reversed
pub fn propose<R: Rng + ?Sized>(current: &Tour, rng: &mut R) -> Tour {
    SegmentReversal::draw(current.len(), rng).apply(current)
}
