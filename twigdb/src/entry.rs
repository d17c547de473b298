//! The atomic unit stored in a spatial index.

use smallvec::SmallVec;

use crate::bounding_box::BoundingBox;
use crate::dewey::DeweyId;
use crate::errors::{TwigError, TwigResult};

/// One indexed datum: a coordinate vector, optionally carrying a position.
///
/// Relational tuples are plain coordinate vectors. XML element occurrences
/// are reduced to a single value coordinate, with the occurrence's
/// [`DeweyId`] carried alongside because the position code participates in
/// structural comparisons but is not itself a real number.
///
/// Entries are immutable: created by the parsing collaborator and owned
/// thereafter by the tree that indexes them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    coords: SmallVec<[f64; 4]>,
    position: Option<DeweyId>,
}

impl Entry {
    /// Creates an XML entry: a 1-D value coordinate plus its position code.
    pub fn xml(position: DeweyId, value: f64) -> Entry {
        Entry {
            coords: SmallVec::from_slice(&[value]),
            position: Some(position),
        }
    }

    /// Creates a relational entry from a numeric tuple.
    pub fn tuple(coords: impl IntoIterator<Item = f64>) -> Entry {
        Entry {
            coords: coords.into_iter().collect(),
            position: None,
        }
    }

    /// Builds XML entries from parallel id and value sequences.
    ///
    /// The upstream parser already guarantees the sources have equal length;
    /// this re-checks defensively and fails with [`TwigError::SizeMismatch`]
    /// if they differ.
    pub fn from_pairs(ids: Vec<DeweyId>, values: Vec<f64>) -> TwigResult<Vec<Entry>> {
        if ids.len() != values.len() {
            return Err(TwigError::SizeMismatch {
                ids: ids.len(),
                values: values.len(),
            });
        }
        Ok(ids
            .into_iter()
            .zip(values)
            .map(|(id, value)| Entry::xml(id, value))
            .collect())
    }

    /// Returns the coordinate vector.
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Returns the coordinate in dimension `dim`.
    ///
    /// Panics if `dim` is out of range.
    pub fn coord(&self, dim: usize) -> f64 {
        self.coords[dim]
    }

    /// Returns the dimension count.
    pub fn dims(&self) -> usize {
        self.coords.len()
    }

    /// Returns the position code, if this is an XML entry.
    pub fn position(&self) -> Option<&DeweyId> {
        self.position.as_ref()
    }

    /// Returns the degenerate point box this entry occupies.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::point(&self.coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_entry() {
        let e = Entry::xml(DeweyId::parse("1.2").unwrap(), 5.0);
        assert_eq!(e.dims(), 1);
        assert_eq!(e.coord(0), 5.0);
        assert_eq!(e.position().unwrap().to_string(), "1.2");
    }

    #[test]
    fn test_tuple_entry() {
        let e = Entry::tuple([1.0, 2.0, 3.0]);
        assert_eq!(e.dims(), 3);
        assert_eq!(e.coords(), &[1.0, 2.0, 3.0]);
        assert!(e.position().is_none());
    }

    #[test]
    fn test_from_pairs() {
        let ids = vec![
            DeweyId::parse("1").unwrap(),
            DeweyId::parse("1.1").unwrap(),
        ];
        let entries = Entry::from_pairs(ids, vec![5.0, 3.0]).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].coord(0), 3.0);
        assert_eq!(entries[1].position().unwrap().to_string(), "1.1");
    }

    #[test]
    fn test_from_pairs_size_mismatch() {
        let ids = vec![DeweyId::parse("1").unwrap()];
        let err = Entry::from_pairs(ids, vec![5.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            TwigError::SizeMismatch { ids: 1, values: 2 }
        ));
    }

    #[test]
    fn test_bounding_box_is_point() {
        let e = Entry::tuple([1.0, 4.0]);
        let b = e.bounding_box();
        assert_eq!(b.dims(), 2);
        assert_eq!(b.axis(0).low(), 1.0);
        assert_eq!(b.axis(0).high(), 1.0);
        assert_eq!(b.axis(1).low(), 4.0);
    }
}
