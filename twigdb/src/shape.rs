//! Declared twig-query shapes: element names plus their pairwise
//! structural relationships.

use crate::dewey::Relationship;
use crate::errors::{TwigError, TwigResult};

/// The declared shape of a twig query.
///
/// Holds the element names in level order and a dense square matrix of
/// structural constraints between ordered name pairs; `None` means no
/// constraint was declared for that pair. Built once from a descriptor and
/// read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryShape {
    element_names: Vec<String>,
    // row-major n x n
    relationships: Vec<Option<Relationship>>,
}

impl QueryShape {
    /// Creates a shape with the given element names and no declared
    /// relationships.
    ///
    /// Fails with [`TwigError::MalformedDescriptor`] if the name list is
    /// empty or contains duplicates.
    pub fn new(element_names: Vec<String>) -> TwigResult<QueryShape> {
        if element_names.is_empty() {
            return Err(TwigError::MalformedDescriptor(
                "descriptor declares no element names".to_string(),
            ));
        }
        for (i, name) in element_names.iter().enumerate() {
            if element_names[..i].contains(name) {
                return Err(TwigError::MalformedDescriptor(format!(
                    "duplicate element name {name:?}"
                )));
            }
        }
        let n = element_names.len();
        Ok(QueryShape {
            element_names,
            relationships: vec![None; n * n],
        })
    }

    /// Parses a query-shape descriptor.
    ///
    /// The first record is a space-separated list of element names in level
    /// order; every following record is a `(name, name, code)` triple with
    /// code `1` = parent-child and `2` = ancestor-descendant. Fails with
    /// [`TwigError::UnknownElement`] if a triple references an undeclared
    /// name and [`TwigError::MalformedDescriptor`] for anything else the
    /// format does not allow.
    pub fn parse(descriptor: &str) -> TwigResult<QueryShape> {
        let mut records = descriptor.lines().map(str::trim).filter(|l| !l.is_empty());

        let names: Vec<String> = records
            .next()
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let mut shape = QueryShape::new(names)?;

        for record in records {
            let fields: Vec<&str> = record.split_whitespace().collect();
            let &[from, to, code] = fields.as_slice() else {
                return Err(TwigError::MalformedDescriptor(format!(
                    "expected a (name, name, code) triple, got {record:?}"
                )));
            };
            let from = shape
                .index_of(from)
                .ok_or_else(|| TwigError::UnknownElement(from.to_string()))?;
            let to = shape
                .index_of(to)
                .ok_or_else(|| TwigError::UnknownElement(to.to_string()))?;
            let relationship = code
                .parse::<u64>()
                .ok()
                .and_then(Relationship::from_code)
                .ok_or_else(|| {
                    TwigError::MalformedDescriptor(format!(
                        "unknown relationship code {code:?}"
                    ))
                })?;
            shape.set_relationship(from, to, relationship);
        }
        Ok(shape)
    }

    /// Element names in level order.
    pub fn element_names(&self) -> &[String] {
        &self.element_names
    }

    /// Number of declared elements.
    pub fn len(&self) -> usize {
        self.element_names.len()
    }

    /// Always false; a shape declares at least one element.
    pub fn is_empty(&self) -> bool {
        self.element_names.is_empty()
    }

    /// Level-order index of a declared element name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.element_names.iter().position(|n| n == name)
    }

    /// The declared constraint between the ordered pair `(from, to)`.
    ///
    /// Panics if either index is out of range; the matrix is defined only
    /// for declared elements.
    pub fn relationship(&self, from: usize, to: usize) -> Option<Relationship> {
        assert!(from < self.len() && to < self.len(), "element index out of range");
        self.relationships[from * self.len() + to]
    }

    fn set_relationship(&mut self, from: usize, to: usize, relationship: Relationship) {
        let n = self.len();
        self.relationships[from * n + to] = Some(relationship);
    }

    /// Resolves which constituent of an underscore-joined table name sits
    /// highest in the query shape.
    ///
    /// A table named `B_A` joins the elements `B` and `A`; the anchor is
    /// the position, within the split name, of the element with the
    /// smallest level-order index. The downstream evaluator uses it to
    /// attach the table to the twig. Fails with
    /// [`TwigError::UnknownElement`] if any part is undeclared.
    pub fn anchor_element(&self, table_name: &str) -> TwigResult<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (position, part) in table_name.split('_').enumerate() {
            let level = self
                .index_of(part)
                .ok_or_else(|| TwigError::UnknownElement(part.to_string()))?;
            if best.map_or(true, |(_, best_level)| level < best_level) {
                best = Some((position, level));
            }
        }
        match best {
            Some((position, _)) => Ok(position),
            None => Err(TwigError::MalformedDescriptor(
                "empty table name".to_string(),
            )),
        }
    }
}
