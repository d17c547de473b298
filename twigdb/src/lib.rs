//! # TwigDB - Spatial Twig-Query Indexing
//!
//! TwigDB indexes two heterogeneous data sources into per-source spatial
//! index trees: XML document element streams, where each occurrence is a
//! hierarchical Dewey-style position code plus a scalar value, and
//! relational table tuples, which are plain numeric vectors. A downstream
//! twig-query evaluator answers structural+value queries ("find `A` whose
//! child `B` has a value in `[x, y]`") by combining the trees' geometric
//! range search with the position codes' structural predicates.
//!
//! ## Key Pieces
//!
//! - [`DeweyId`] - hierarchical position codes with a total order and the
//!   parent/ancestor predicates
//! - [`Interval`] / [`BoundingBox`] - the closed-range and axis-aligned box
//!   algebra every other component leans on
//! - [`RTree`] - a balanced, bounded-fan-out tree bulk-built from a
//!   complete entry batch, queried read-only through [`RTree::range_query`]
//! - [`Loader`] - orchestration that builds one tree per XML element name
//!   and one per relational table, concurrently, from a declared
//!   [`QueryShape`]
//!
//! ## Quick Start
//!
//! ```rust
//! use twigdb::{BoundingBox, BulkStrategy, DeweyId, Entry, Interval, RTree};
//!
//! # fn main() -> twigdb::TwigResult<()> {
//! let entries = vec![
//!     Entry::xml(DeweyId::parse("1")?, 5.0),
//!     Entry::xml(DeweyId::parse("1.1")?, 3.0),
//!     Entry::xml(DeweyId::parse("1.2")?, 9.0),
//! ];
//! let tree = RTree::bulk_load(entries, BulkStrategy::default(), 2)?;
//!
//! let query = BoundingBox::new([Interval::new(4.0, 10.0)?]);
//! let values: Vec<f64> = tree.range_query(&query).map(|e| e.coord(0)).collect();
//! assert_eq!(values.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`interval`] / [`bounding_box`] - geometry algebra
//! - [`dewey`] - position codes and structural relationships
//! - [`entry`] - the atomic indexed unit
//! - [`hilbert`] - space-filling-curve keys for the Hilbert bulk strategy
//! - [`rtree`] - the bulk-loaded spatial index
//! - [`shape`] - declared query shapes and relationship matrices
//! - [`dataset`] - line-oriented dataset parsing
//! - [`loader`] - per-element / per-table build orchestration
//! - [`errors`] - error and result types

pub mod bounding_box;
pub mod dataset;
pub mod dewey;
pub mod entry;
pub mod errors;
pub mod hilbert;
pub mod interval;
pub mod loader;
pub mod rtree;
pub mod shape;

pub use bounding_box::BoundingBox;
pub use dewey::{DeweyId, Relationship};
pub use entry::Entry;
pub use errors::{TwigError, TwigResult};
pub use interval::{Interval, Overlap};
pub use loader::{build_indexes, Loader};
pub use rtree::{BulkStrategy, RTree, RangeQuery};
pub use shape::QueryShape;
