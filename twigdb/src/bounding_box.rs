//! N-dimensional axis-aligned bounding boxes.

use std::hash::Hash;

use itertools::Itertools;
use smallvec::SmallVec;

use crate::interval::{Interval, Overlap};

/// An axis-aligned bounding box: one [`Interval`] per dimension.
///
/// The dimension count is fixed at construction and invariant for the box's
/// lifetime. Classification and union are applied dimension-wise: a box
/// contains another only if every dimension is contained, and two boxes are
/// disjoint as soon as any dimension pair is disjoint.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    axes: SmallVec<[Interval; 4]>,
}

impl Eq for BoundingBox {}

impl Hash for BoundingBox {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        for axis in &self.axes {
            axis.hash(state);
        }
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundingBox({})", self.axes.iter().join(" x "))
    }
}

impl BoundingBox {
    /// Creates a bounding box from per-dimension intervals.
    pub fn new(axes: impl IntoIterator<Item = Interval>) -> BoundingBox {
        let axes: SmallVec<[Interval; 4]> = axes.into_iter().collect();
        debug_assert!(!axes.is_empty(), "bounding box needs at least one dimension");
        BoundingBox { axes }
    }

    /// Creates the degenerate point box for a coordinate vector.
    pub fn point(coords: &[f64]) -> BoundingBox {
        BoundingBox::new(coords.iter().map(|&c| Interval::point(c)))
    }

    /// Returns the dimension count.
    pub fn dims(&self) -> usize {
        self.axes.len()
    }

    /// Returns the interval for dimension `dim`.
    ///
    /// Panics if `dim` is out of range.
    pub fn axis(&self, dim: usize) -> &Interval {
        &self.axes[dim]
    }

    /// Returns the center of dimension `dim`; ordering tie-break key only.
    pub fn center(&self, dim: usize) -> f64 {
        self.axes[dim].center()
    }

    /// Classifies this box against `other`, dimension-wise.
    ///
    /// `Disjoint` as soon as any dimension pair is disjoint; `Contained`
    /// only if every dimension of this box is contained in the matching
    /// dimension of `other`; `Overlapping` otherwise.
    pub fn classify(&self, other: &BoundingBox) -> Overlap {
        debug_assert_eq!(self.dims(), other.dims(), "boxes must agree on dimensions");
        let mut contained = true;
        for (a, b) in self.axes.iter().zip(&other.axes) {
            match a.classify(b) {
                Overlap::Disjoint => return Overlap::Disjoint,
                Overlap::Overlapping => contained = false,
                Overlap::Contained => {}
            }
        }
        if contained {
            Overlap::Contained
        } else {
            Overlap::Overlapping
        }
    }

    /// True if `other` lies fully inside this box (inclusive bounds).
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.classify(self) == Overlap::Contained
    }

    /// True if the boxes intersect in every dimension.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.classify(other) != Overlap::Disjoint
    }

    /// Returns the smallest box covering both operands.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        debug_assert_eq!(self.dims(), other.dims(), "boxes must agree on dimensions");
        BoundingBox::new(
            self.axes
                .iter()
                .zip(&other.axes)
                .map(|(a, b)| a.union(b)),
        )
    }

    /// Widens this box in place to cover `other`.
    ///
    /// This is the bounding-box accumulation step of a bulk build; built
    /// trees never call it.
    pub fn expand(&mut self, other: &BoundingBox) {
        debug_assert_eq!(self.dims(), other.dims(), "boxes must agree on dimensions");
        for (a, b) in self.axes.iter_mut().zip(&other.axes) {
            a.expand(b);
        }
    }
}
