//! Dewey-style hierarchical position codes and structural predicates.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use smallvec::SmallVec;

use crate::errors::{TwigError, TwigResult};

/// A structural constraint between two element occurrences in a twig query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relationship {
    /// The first occurrence must be the immediate parent of the second.
    ParentChild,
    /// The first occurrence must be a strict ancestor of the second.
    AncestorDescendant,
}

impl Relationship {
    /// Maps a descriptor relationship code to its variant.
    ///
    /// Query-shape descriptors encode parent-child as `1` and
    /// ancestor-descendant as `2`; anything else is rejected by the caller.
    pub fn from_code(code: u64) -> Option<Relationship> {
        match code {
            1 => Some(Relationship::ParentChild),
            2 => Some(Relationship::AncestorDescendant),
            _ => None,
        }
    }
}

/// A hierarchical position code: the integer path from a document root.
///
/// Parsed from a dot-delimited string such as `"1.2.3"`. The division
/// sequence is never empty, and a `DeweyId` is immutable once constructed —
/// changing a position means constructing a new value, so sorted containers
/// can rely on stable keys.
///
/// The total order is lexicographic over the shared prefix; if the shared
/// prefix is equal, the shorter id sorts first. Equality requires identical
/// length and divisions, so `"1.2"` and `"1.2.0"` are ordered but never
/// equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeweyId {
    divisions: SmallVec<[u64; 8]>,
}

impl DeweyId {
    /// Parses a dot-delimited position code.
    ///
    /// Fails with [`TwigError::MalformedId`] if the text is empty or any
    /// division token is not a non-negative integer (`"1..2"` and `"a.b"`
    /// both fail).
    pub fn parse(text: &str) -> TwigResult<DeweyId> {
        if text.is_empty() {
            return Err(TwigError::MalformedId(text.to_string()));
        }
        let divisions = text
            .split('.')
            .map(|token| {
                token
                    .parse::<u64>()
                    .map_err(|_| TwigError::MalformedId(text.to_string()))
            })
            .collect::<TwigResult<SmallVec<[u64; 8]>>>()?;
        Ok(DeweyId { divisions })
    }

    /// Returns the division sequence.
    pub fn divisions(&self) -> &[u64] {
        &self.divisions
    }

    /// Returns the number of divisions, i.e. the depth of the position.
    pub fn len(&self) -> usize {
        self.divisions.len()
    }

    /// Always false; the division sequence is never empty.
    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }

    /// True iff this id is a strict ancestor of `other`.
    ///
    /// Requires this id to be strictly shorter and every division to equal
    /// the corresponding prefix division of `other`. An id is never its own
    /// ancestor, and equal-length ids are never in an ancestor relation.
    pub fn is_ancestor_of(&self, other: &DeweyId) -> bool {
        self.len() < other.len() && other.divisions[..self.len()] == *self.divisions
    }

    /// True iff this id is the immediate parent of `other`.
    ///
    /// Stricter than [`is_ancestor_of`]: exactly one level above.
    ///
    /// [`is_ancestor_of`]: DeweyId::is_ancestor_of
    pub fn is_parent_of(&self, other: &DeweyId) -> bool {
        self.len() + 1 == other.len() && other.divisions[..self.len()] == *self.divisions
    }

    /// Checks the structural predicate a twig edge requires.
    ///
    /// This is the validation the downstream evaluator performs once range
    /// search has produced a geometric candidate pair.
    pub fn satisfies(&self, other: &DeweyId, relationship: Relationship) -> bool {
        match relationship {
            Relationship::ParentChild => self.is_parent_of(other),
            Relationship::AncestorDescendant => self.is_ancestor_of(other),
        }
    }
}

impl FromStr for DeweyId {
    type Err = TwigError;

    fn from_str(s: &str) -> TwigResult<DeweyId> {
        DeweyId::parse(s)
    }
}

impl fmt::Display for DeweyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.divisions.iter().join("."))
    }
}

impl Ord for DeweyId {
    fn cmp(&self, other: &DeweyId) -> Ordering {
        let shared = self.len().min(other.len());
        for i in 0..shared {
            match self.divisions[i].cmp(&other.divisions[i]) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        // equal on the shared prefix: the shorter id sorts first
        self.len().cmp(&other.len())
    }
}

impl PartialOrd for DeweyId {
    fn partial_cmp(&self, other: &DeweyId) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(text: &str) -> DeweyId {
        DeweyId::parse(text).unwrap()
    }

    #[test]
    fn test_parse() {
        let d = id("1.2.3");
        assert_eq!(d.divisions(), &[1, 2, 3]);
        assert_eq!(d.len(), 3);
        assert_eq!(id("0").divisions(), &[0]);
    }

    #[test]
    fn test_parse_malformed() {
        for text in ["", "1..2", "a.b", "1.2.", ".1", "-1", "1.x"] {
            let err = DeweyId::parse(text).unwrap_err();
            assert!(
                matches!(err, TwigError::MalformedId(_)),
                "{text:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        let d = id("1.20.3");
        assert_eq!(d.to_string(), "1.20.3");
        assert_eq!(d.to_string().parse::<DeweyId>().unwrap(), d);
    }

    #[test]
    fn test_ordering_lexicographic() {
        assert!(id("1.1") < id("1.2"));
        assert!(id("1.2") < id("2"));
        assert!(id("1.10") > id("1.9"));
    }

    #[test]
    fn test_ordering_prefix_sorts_first() {
        assert!(id("1.2") < id("1.2.0"));
        assert!(id("1") < id("1.0"));
    }

    #[test]
    fn test_ordering_is_total_and_transitive() {
        let ids = ["1", "1.0", "1.2", "1.2.3", "1.10", "2", "10"];
        for a in &ids {
            for b in &ids {
                let (a, b) = (id(a), id(b));
                // exactly one of <, ==, > holds
                let ord = a.cmp(&b);
                assert_eq!(a == b, ord == Ordering::Equal);
                assert_eq!(b.cmp(&a), ord.reverse());
                for c in &ids {
                    let c = id(c);
                    if a < b && b < c {
                        assert!(a < c, "{a} < {b} < {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_equality_requires_identical_length() {
        assert_ne!(id("1.2"), id("1.2.0"));
        assert_eq!(id("1.2"), id("1.2"));
    }

    #[test]
    fn test_is_ancestor_of() {
        assert!(id("1").is_ancestor_of(&id("1.2.3")));
        assert!(id("1.2").is_ancestor_of(&id("1.2.3")));
        assert!(!id("1.2").is_ancestor_of(&id("1.2")), "no self-ancestry");
        assert!(!id("1.3").is_ancestor_of(&id("1.2.3")));
        assert!(!id("1.2.3").is_ancestor_of(&id("1.2")));
    }

    #[test]
    fn test_is_parent_of() {
        assert!(id("1").is_parent_of(&id("1.2")));
        assert!(!id("1").is_parent_of(&id("1.2.3")), "parent is exactly one level");
        assert!(!id("1").is_parent_of(&id("2.1")));
        assert!(!id("1.2").is_parent_of(&id("1.2")));
    }

    #[test]
    fn test_satisfies() {
        let a = id("1");
        let b = id("1.2");
        let c = id("1.2.3");
        assert!(a.satisfies(&b, Relationship::ParentChild));
        assert!(a.satisfies(&c, Relationship::AncestorDescendant));
        assert!(!a.satisfies(&c, Relationship::ParentChild));
        assert!(!b.satisfies(&a, Relationship::AncestorDescendant));
    }

    #[test]
    fn test_relationship_from_code() {
        assert_eq!(Relationship::from_code(1), Some(Relationship::ParentChild));
        assert_eq!(
            Relationship::from_code(2),
            Some(Relationship::AncestorDescendant)
        );
        assert_eq!(Relationship::from_code(0), None);
        assert_eq!(Relationship::from_code(3), None);
    }
}
