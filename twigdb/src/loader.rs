//! Index-build orchestration.
//!
//! For a declared query shape and a set of relational tables, builds one
//! [`RTree`] per XML element name and one per table, and exposes the
//! resulting roots plus the parsed shape to the downstream twig evaluator.
//!
//! Each bulk load is a pure function of its entry batch, strategy, and
//! fan-out, with no shared mutable state, so all element and table indexes
//! are built concurrently: one scoped thread per batch, results gathered
//! over a channel and re-keyed into deterministic order afterwards.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::dataset;
use crate::entry::Entry;
use crate::errors::{TwigError, TwigResult};
use crate::rtree::{BulkStrategy, RTree};
use crate::shape::QueryShape;

enum Source {
    Element,
    Table,
}

/// The built indexes of one logical dataset.
///
/// Everything the downstream evaluator needs: one tree root per element
/// name, one per table name, and the query shape. Trees are read-only once
/// here; the evaluator combines [`RTree::range_query`] with
/// [`DeweyId::satisfies`] and never needs anything else from this crate.
///
/// [`DeweyId::satisfies`]: crate::dewey::DeweyId::satisfies
#[derive(Debug)]
pub struct Loader {
    element_roots: IndexMap<String, RTree>,
    table_roots: IndexMap<String, RTree>,
    shape: QueryShape,
    max_children: usize,
    strategy: BulkStrategy,
    total_load_time: Duration,
}

impl Loader {
    /// Loads a dataset directory and builds every index.
    ///
    /// Reads the query-shape descriptor, then one id/value source pair per
    /// declared element and every `*_table.dat` file, and hands the parsed
    /// batches to [`build_indexes`]. The first failure aborts the whole
    /// load.
    pub fn load(
        dir: &Path,
        max_children: usize,
        strategy: BulkStrategy,
    ) -> TwigResult<Loader> {
        log::info!("loading dataset from {}", dir.display());
        let started = Instant::now();

        let shape = dataset::load_query_shape(dir)?;
        let mut element_entries = IndexMap::new();
        for name in shape.element_names() {
            element_entries.insert(name.clone(), dataset::load_xml_entries(dir, name)?);
        }
        let mut table_entries = IndexMap::new();
        for (name, path) in dataset::discover_tables(dir)? {
            table_entries.insert(name, dataset::load_table_entries(&path)?);
        }

        let mut loader =
            build_indexes(shape, element_entries, table_entries, max_children, strategy)?;
        loader.total_load_time = started.elapsed();
        log::info!("total loading time: {:?}", loader.total_load_time);
        Ok(loader)
    }

    /// Root tree of one element, if declared.
    pub fn element_root(&self, name: &str) -> Option<&RTree> {
        self.element_roots.get(name)
    }

    /// Every element root, keyed by name in level order.
    pub fn element_roots(&self) -> &IndexMap<String, RTree> {
        &self.element_roots
    }

    /// Root tree of one table, if present in the dataset.
    pub fn table_root(&self, name: &str) -> Option<&RTree> {
        self.table_roots.get(name)
    }

    /// Every table root, keyed by table name.
    pub fn table_roots(&self) -> &IndexMap<String, RTree> {
        &self.table_roots
    }

    /// The parsed query shape.
    pub fn shape(&self) -> &QueryShape {
        &self.shape
    }

    /// Fan-out the indexes were built with.
    pub fn max_children(&self) -> usize {
        self.max_children
    }

    /// Bulk-load strategy the indexes were built with.
    pub fn strategy(&self) -> BulkStrategy {
        self.strategy
    }

    /// Wall-clock duration of the whole load; observability only.
    pub fn total_load_time(&self) -> Duration {
        self.total_load_time
    }
}

/// Builds every element and table index from already-parsed entry batches.
///
/// Pure orchestration over [`RTree::bulk_load`]: no file access, no shared
/// state between builds. Every declared element must have an entry batch
/// ([`TwigError::UnknownElement`] otherwise). Builds run on one scoped
/// thread per batch; element roots come back keyed in level order and
/// table roots sorted by name regardless of completion order.
pub fn build_indexes(
    shape: QueryShape,
    mut element_entries: IndexMap<String, Vec<Entry>>,
    table_entries: IndexMap<String, Vec<Entry>>,
    max_children: usize,
    strategy: BulkStrategy,
) -> TwigResult<Loader> {
    let started = Instant::now();

    let mut jobs: Vec<(Source, String, Vec<Entry>)> = Vec::new();
    for name in shape.element_names() {
        let batch = element_entries
            .swap_remove(name)
            .ok_or_else(|| TwigError::UnknownElement(name.clone()))?;
        jobs.push((Source::Element, name.clone(), batch));
    }
    for (name, batch) in table_entries {
        jobs.push((Source::Table, name, batch));
    }

    let (tx, rx) = crossbeam_channel::unbounded();
    thread::scope(|scope| {
        for (source, name, batch) in jobs {
            let tx = tx.clone();
            scope.spawn(move || {
                let build_start = Instant::now();
                let result = RTree::bulk_load(batch, strategy, max_children);
                log::debug!("built index for {} in {:?}", name, build_start.elapsed());
                let _ = tx.send((source, name, result));
            });
        }
    });
    drop(tx);

    let mut element_roots = IndexMap::with_capacity(shape.len());
    let mut table_roots = IndexMap::new();
    for (source, name, result) in rx {
        let tree = result.inspect_err(|e| log::error!("building index for {name} failed: {e}"))?;
        match source {
            Source::Element => element_roots.insert(name, tree),
            Source::Table => table_roots.insert(name, tree),
        };
    }

    // completion order is nondeterministic; restore level order and name order
    element_roots.sort_by(|a, _, b, _| shape.index_of(a).cmp(&shape.index_of(b)));
    table_roots.sort_keys();

    Ok(Loader {
        element_roots,
        table_roots,
        shape,
        max_children,
        strategy,
        total_load_time: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dewey::{DeweyId, Relationship};

    fn xml_batch(pairs: &[(&str, f64)]) -> Vec<Entry> {
        pairs
            .iter()
            .map(|(id, v)| Entry::xml(DeweyId::parse(id).unwrap(), *v))
            .collect()
    }

    fn shape_ab() -> QueryShape {
        QueryShape::parse("A B\nA B 1\n").unwrap()
    }

    #[test]
    fn test_build_indexes() {
        let mut element_entries = IndexMap::new();
        element_entries.insert(
            "A".to_string(),
            xml_batch(&[("1", 5.0), ("1.1", 3.0), ("1.2", 9.0)]),
        );
        element_entries.insert("B".to_string(), xml_batch(&[("1.1.1", 7.0)]));
        let mut table_entries = IndexMap::new();
        table_entries.insert(
            "A_B".to_string(),
            vec![Entry::tuple([5.0, 7.0]), Entry::tuple([9.0, 7.0])],
        );

        let loader = build_indexes(
            shape_ab(),
            element_entries,
            table_entries,
            4,
            BulkStrategy::default(),
        )
        .unwrap();

        assert_eq!(loader.element_roots().len(), 2);
        assert_eq!(loader.element_root("A").unwrap().len(), 3);
        assert_eq!(loader.element_root("B").unwrap().len(), 1);
        assert_eq!(loader.table_root("A_B").unwrap().len(), 2);
        assert_eq!(loader.table_root("A_B").unwrap().dims(), 2);
        assert_eq!(
            loader.shape().relationship(0, 1),
            Some(Relationship::ParentChild)
        );
        // level order regardless of which build finished first
        let names: Vec<&str> = loader
            .element_roots()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_build_indexes_missing_element_batch() {
        let mut element_entries = IndexMap::new();
        element_entries.insert("A".to_string(), xml_batch(&[("1", 5.0)]));

        let err = build_indexes(
            shape_ab(),
            element_entries,
            IndexMap::new(),
            4,
            BulkStrategy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TwigError::UnknownElement(name) if name == "B"));
    }

    #[test]
    fn test_build_indexes_propagates_build_failure() {
        let mut element_entries = IndexMap::new();
        element_entries.insert("A".to_string(), xml_batch(&[("1", 5.0)]));
        element_entries.insert("B".to_string(), Vec::new());

        let err = build_indexes(
            shape_ab(),
            element_entries,
            IndexMap::new(),
            4,
            BulkStrategy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TwigError::EmptyInput));
    }

    #[test]
    fn test_builds_are_order_independent() {
        // many batches so thread completion order actually interleaves
        let names: Vec<String> = (0..16).map(|i| format!("E{i}")).collect();
        let shape = QueryShape::new(names.clone()).unwrap();
        let mut element_entries = IndexMap::new();
        for (i, name) in names.iter().enumerate() {
            let batch: Vec<Entry> = (0..(50 + i)).map(|j| Entry::tuple([j as f64])).collect();
            element_entries.insert(name.clone(), batch);
        }

        let loader = build_indexes(
            shape,
            element_entries,
            IndexMap::new(),
            4,
            BulkStrategy::default(),
        )
        .unwrap();
        let got: Vec<&str> = loader.element_roots().keys().map(String::as_str).collect();
        let expected: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(got, expected);
        assert_eq!(loader.element_root("E3").unwrap().len(), 53);
    }
}
