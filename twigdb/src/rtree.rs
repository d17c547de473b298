//! Bulk-loaded R-tree over entry bounding boxes.
//!
//! The tree is built once from a complete batch of entries and queried
//! read-only afterwards. Bulk loading packs a deterministically sorted
//! batch into leaves of at most `max_children` entries, then groups node
//! runs level by level until a single root remains, so the tree is balanced
//! by construction and no node ever under- or overflows.

use std::cmp::Ordering;

use itertools::Itertools;

use crate::bounding_box::BoundingBox;
use crate::entry::Entry;
use crate::errors::{TwigError, TwigResult};
use crate::hilbert::{hilbert_index_bounded, BULK_LOAD_ORDER};
use crate::interval::{Interval, Overlap};

/// How a bulk load orders its entry batch before packing.
///
/// A closed set of strategies, resolved once at build time; the contract
/// only requires that some deterministic total order over entries is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulkStrategy {
    /// Sort by the coordinate in the designated dimension (default, with
    /// dimension 0).
    SortDimension(usize),
    /// Sort by a Hilbert space-filling-curve key over the first two
    /// dimensions (the single dimension doubled for 1-D batches).
    Hilbert,
}

impl Default for BulkStrategy {
    fn default() -> BulkStrategy {
        BulkStrategy::SortDimension(0)
    }
}

#[derive(Debug)]
enum NodeKind {
    Leaf(Vec<Entry>),
    Inner(Vec<Node>),
}

/// One tree node: a bounding box exactly covering its children or entries.
///
/// Children are owned exclusively by their parent; there are no back
/// pointers. Nodes are created during bulk build and never mutated after
/// the build returns.
#[derive(Debug)]
struct Node {
    bounds: BoundingBox,
    kind: NodeKind,
}

impl Node {
    fn leaf(entries: Vec<Entry>) -> Node {
        let mut bounds = entries[0].bounding_box();
        for entry in &entries[1..] {
            bounds.expand(&entry.bounding_box());
        }
        Node {
            bounds,
            kind: NodeKind::Leaf(entries),
        }
    }

    fn inner(children: Vec<Node>) -> Node {
        let mut bounds = children[0].bounds.clone();
        for child in &children[1..] {
            bounds.expand(&child.bounds);
        }
        Node {
            bounds,
            kind: NodeKind::Inner(children),
        }
    }
}

/// A balanced, bounded-fan-out spatial index built in bulk.
///
/// States: `Empty` (no root, a legitimate steady state for sources with no
/// data) and `Built`. A built tree is immutable; rebuilding means
/// discarding it and bulk-loading a new one. Because nothing mutates a
/// built tree, any number of concurrent [`range_query`] calls may run
/// against it without synchronization.
///
/// [`range_query`]: RTree::range_query
#[derive(Debug)]
pub struct RTree {
    root: Option<Node>,
    dims: usize,
    max_children: usize,
    len: usize,
}

impl RTree {
    /// Creates an empty index; queries yield nothing.
    pub fn empty(dims: usize, max_children: usize) -> RTree {
        RTree {
            root: None,
            dims,
            max_children,
            len: 0,
        }
    }

    /// Builds a tree from a complete entry batch.
    ///
    /// Fails with [`TwigError::EmptyInput`] on an empty batch,
    /// [`TwigError::InvalidFanout`] if `max_children < 2`, and
    /// [`TwigError::DimensionMismatch`] if the entries disagree on
    /// dimension count or the designated sort dimension is out of range.
    ///
    /// Given identical input order, strategy, and fan-out, the resulting
    /// tree shape is fully deterministic.
    pub fn bulk_load(
        entries: Vec<Entry>,
        strategy: BulkStrategy,
        max_children: usize,
    ) -> TwigResult<RTree> {
        if entries.is_empty() {
            return Err(TwigError::EmptyInput);
        }
        if max_children < 2 {
            return Err(TwigError::InvalidFanout(max_children));
        }
        let dims = entries[0].dims();
        if dims == 0 {
            return Err(TwigError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        for entry in &entries {
            if entry.dims() != dims {
                return Err(TwigError::DimensionMismatch {
                    expected: dims,
                    actual: entry.dims(),
                });
            }
        }
        if let BulkStrategy::SortDimension(dim) = strategy {
            if dim >= dims {
                return Err(TwigError::DimensionMismatch {
                    expected: dims,
                    actual: dim,
                });
            }
        }

        let len = entries.len();
        let entries = sort_batch(entries, strategy, dims);

        // Pack sorted entries into leaves, then group node runs level by
        // level until a single root remains.
        let mut nodes = Vec::with_capacity(len.div_ceil(max_children));
        let leaf_runs = entries.into_iter().chunks(max_children);
        for run in &leaf_runs {
            nodes.push(Node::leaf(run.collect()));
        }
        while nodes.len() > 1 {
            let mut parents = Vec::with_capacity(nodes.len().div_ceil(max_children));
            let runs = nodes.into_iter().chunks(max_children);
            for run in &runs {
                parents.push(Node::inner(run.collect()));
            }
            nodes = parents;
        }

        Ok(RTree {
            root: nodes.pop(),
            dims,
            max_children,
            len,
        })
    }

    /// Returns a lazy iterator over all entries whose point box intersects
    /// `query`.
    ///
    /// Descent classifies each node box against the query box: `Disjoint`
    /// prunes the whole subtree, while both `Overlapping` and `Contained`
    /// descend — node-box containment does not certify that every leaf
    /// entry matches, so entries are always re-tested individually at the
    /// leaves. Calling again yields a fresh, restartable traversal.
    pub fn range_query<'t>(&'t self, query: &'t BoundingBox) -> RangeQuery<'t> {
        debug_assert!(
            self.root.is_none() || query.dims() == self.dims,
            "query box must match index dimensions"
        );
        RangeQuery {
            query,
            stack: self.root.as_ref().into_iter().collect(),
            pending: Default::default(),
        }
    }

    /// Number of entries stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dimension count of the indexed entries.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Maximum fan-out per node.
    pub fn max_children(&self) -> usize {
        self.max_children
    }

    /// Tree height: 0 for an empty tree, 1 for a single leaf root.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut node = self.root.as_ref();
        while let Some(n) = node {
            height += 1;
            node = match &n.kind {
                NodeKind::Leaf(_) => None,
                NodeKind::Inner(children) => children.first(),
            };
        }
        height
    }
}

/// Sorts an entry batch by the strategy key.
///
/// Ties are broken by position code and then by the full coordinate vector,
/// so the order is total and the packed tree shape deterministic.
fn sort_batch(mut entries: Vec<Entry>, strategy: BulkStrategy, dims: usize) -> Vec<Entry> {
    match strategy {
        BulkStrategy::SortDimension(dim) => {
            entries.sort_by(|a, b| {
                a.coord(dim)
                    .total_cmp(&b.coord(dim))
                    .then_with(|| tie_break(a, b))
            });
            entries
        }
        BulkStrategy::Hilbert => {
            let x_dim = 0;
            let y_dim = 1.min(dims - 1);
            let x_bounds = coord_bounds(&entries, x_dim);
            let y_bounds = coord_bounds(&entries, y_dim);
            let mut keyed: Vec<(u64, Entry)> = entries
                .into_iter()
                .map(|entry| {
                    let key = hilbert_index_bounded(
                        entry.coord(x_dim),
                        entry.coord(y_dim),
                        &x_bounds,
                        &y_bounds,
                        BULK_LOAD_ORDER,
                    );
                    (key, entry)
                })
                .collect();
            keyed.sort_by(|(ka, a), (kb, b)| ka.cmp(kb).then_with(|| tie_break(a, b)));
            keyed.into_iter().map(|(_, entry)| entry).collect()
        }
    }
}

/// Smallest interval covering every entry's coordinate in one dimension.
fn coord_bounds(entries: &[Entry], dim: usize) -> Interval {
    let mut bounds = Interval::point(entries[0].coord(dim));
    for entry in &entries[1..] {
        bounds.expand(&Interval::point(entry.coord(dim)));
    }
    bounds
}

fn tie_break(a: &Entry, b: &Entry) -> Ordering {
    match (a.position(), b.position()) {
        (Some(pa), Some(pb)) => pa.cmp(pb).then_with(|| compare_coords(a, b)),
        _ => compare_coords(a, b),
    }
}

fn compare_coords(a: &Entry, b: &Entry) -> Ordering {
    for (ca, cb) in a.coords().iter().zip(b.coords()) {
        match ca.total_cmp(cb) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
    }
    Ordering::Equal
}

/// Lazy depth-first range search over a built tree.
///
/// Yields references to every stored entry whose box intersects the query
/// box, never missing or duplicating a qualifying entry. The traversal
/// holds only a node stack and the current leaf cursor, so it is cheap to
/// drop early.
pub struct RangeQuery<'t> {
    query: &'t BoundingBox,
    stack: Vec<&'t Node>,
    pending: std::slice::Iter<'t, Entry>,
}

impl<'t> Iterator for RangeQuery<'t> {
    type Item = &'t Entry;

    fn next(&mut self) -> Option<&'t Entry> {
        loop {
            for entry in self.pending.by_ref() {
                if entry.bounding_box().classify(self.query) != Overlap::Disjoint {
                    return Some(entry);
                }
            }
            let node = self.stack.pop()?;
            if node.bounds.classify(self.query) == Overlap::Disjoint {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf(entries) => self.pending = entries.iter(),
                NodeKind::Inner(children) => self.stack.extend(children.iter()),
            }
        }
    }
}
