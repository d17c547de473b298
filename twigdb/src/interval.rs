//! Closed numeric intervals and their overlap classification.

use std::hash::Hash;

use crate::errors::{TwigError, TwigResult};

/// Classification of one range (or box) against another.
///
/// Range search relies on the exact three-way split: `Disjoint` prunes a
/// whole subtree, `Overlapping` forces descent with per-child testing, and
/// `Contained` marks the tested range as fully inside the query range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Overlap {
    /// The ranges do not touch.
    Disjoint,
    /// The ranges intersect, but the tested range is not fully inside.
    Overlapping,
    /// The tested range lies fully inside the other (inclusive bounds).
    Contained,
}

/// A closed numeric range `[low, high]`.
///
/// Invariant: `low <= high`, checked at construction. An interval is a
/// value: equality compares bounds, and `union` produces a new interval
/// rather than aliasing either operand. The only mutator is [`expand`],
/// used while accumulating node bounding boxes during a bulk build.
///
/// [`expand`]: Interval::expand
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    low: f64,
    high: f64,
}

impl Eq for Interval {}

impl Hash for Interval {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.low.to_bits().hash(state);
        self.high.to_bits().hash(state);
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

impl Interval {
    /// Creates a new interval.
    ///
    /// Fails with [`TwigError::InvalidRange`] if `low > high`.
    pub fn new(low: f64, high: f64) -> TwigResult<Interval> {
        if low > high {
            return Err(TwigError::InvalidRange { low, high });
        }
        Ok(Interval { low, high })
    }

    /// Creates the degenerate interval `[value, value]`.
    pub fn point(value: f64) -> Interval {
        Interval {
            low: value,
            high: value,
        }
    }

    /// Returns the lower bound.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Returns the upper bound.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Returns the arithmetic mean of the bounds.
    ///
    /// Used only as an ordering tie-break key during bulk builds, never for
    /// correctness decisions.
    pub fn center(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    /// Classifies this interval against `other`.
    ///
    /// `Disjoint` if the ranges do not touch, `Contained` if this interval
    /// lies fully inside `other` (bounds inclusive on both sides), and
    /// `Overlapping` otherwise. Touching endpoints count as intersection.
    pub fn classify(&self, other: &Interval) -> Overlap {
        if self.high < other.low || self.low > other.high {
            return Overlap::Disjoint;
        }
        if self.low >= other.low && self.high <= other.high {
            return Overlap::Contained;
        }
        Overlap::Overlapping
    }

    /// Returns the smallest interval covering both operands.
    ///
    /// Neither operand is mutated.
    pub fn union(&self, other: &Interval) -> Interval {
        Interval {
            low: self.low.min(other.low),
            high: self.high.max(other.high),
        }
    }

    /// Widens this interval in place to cover `other`.
    pub fn expand(&mut self, other: &Interval) {
        self.low = self.low.min(other.low);
        self.high = self.high.max(other.high);
    }
}
