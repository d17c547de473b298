//! Line-oriented dataset parsing.
//!
//! A dataset directory holds, per XML element, a `<element>_id.dat` /
//! `<element>_v.dat` pair of parallel line-oriented sources; per relational
//! table, a `<table>_table.dat` file of whitespace-separated numeric
//! tuples; and one `XML_query.dat` query-shape descriptor.

use std::fs;
use std::path::{Path, PathBuf};

use crate::dewey::DeweyId;
use crate::entry::Entry;
use crate::errors::{TwigError, TwigResult};
use crate::shape::QueryShape;

/// File name of the query-shape descriptor inside a dataset directory.
pub const QUERY_FILE: &str = "XML_query.dat";

const ID_SUFFIX: &str = "_id.dat";
const VALUE_SUFFIX: &str = "_v.dat";
const TABLE_SUFFIX: &str = "_table.dat";

/// Reads a file as trimmed, non-empty lines.
pub fn read_lines(path: &Path) -> TwigResult<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Loads the XML entries of one element from its id/value source pair.
///
/// The two sources are parallel: line `i` of the id file is the position
/// code of the occurrence whose value is line `i` of the value file.
/// Fails with [`TwigError::SizeMismatch`] if the sources differ in length,
/// and with [`TwigError::MalformedId`] / [`TwigError::MalformedNumber`] on
/// unparsable tokens.
pub fn load_xml_entries(dir: &Path, element: &str) -> TwigResult<Vec<Entry>> {
    let id_lines = read_lines(&dir.join(format!("{element}{ID_SUFFIX}")))?;
    let value_lines = read_lines(&dir.join(format!("{element}{VALUE_SUFFIX}")))?;
    if id_lines.len() != value_lines.len() {
        return Err(TwigError::SizeMismatch {
            ids: id_lines.len(),
            values: value_lines.len(),
        });
    }

    let ids = id_lines
        .iter()
        .map(|line| DeweyId::parse(line))
        .collect::<TwigResult<Vec<_>>>()?;
    let values = value_lines
        .iter()
        .map(|line| parse_number(line))
        .collect::<TwigResult<Vec<_>>>()?;
    Entry::from_pairs(ids, values)
}

/// Loads the tuples of one relational table file.
///
/// Each line is one whitespace-separated numeric tuple.
pub fn load_table_entries(path: &Path) -> TwigResult<Vec<Entry>> {
    read_lines(path)?
        .iter()
        .map(|line| {
            let coords = line
                .split_whitespace()
                .map(parse_number)
                .collect::<TwigResult<Vec<f64>>>()?;
            Ok(Entry::tuple(coords))
        })
        .collect()
}

/// Finds every table file in a dataset directory.
///
/// Returns `(table_name, path)` pairs sorted by name, so discovery order
/// does not depend on directory iteration order.
pub fn discover_tables(dir: &Path) -> TwigResult<Vec<(String, PathBuf)>> {
    let mut tables = Vec::new();
    for dir_entry in fs::read_dir(dir)? {
        let path = dir_entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(table_name) = file_name.strip_suffix(TABLE_SUFFIX) {
            tables.push((table_name.to_string(), path));
        }
    }
    tables.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(tables)
}

/// Loads and parses the query-shape descriptor of a dataset directory.
pub fn load_query_shape(dir: &Path) -> TwigResult<QueryShape> {
    let descriptor = fs::read_to_string(dir.join(QUERY_FILE))?;
    QueryShape::parse(&descriptor)
}

fn parse_number(token: &str) -> TwigResult<f64> {
    token
        .parse::<f64>()
        .map_err(|_| TwigError::MalformedNumber(token.to_string()))
}
