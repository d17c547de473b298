//! Error and result types for twigdb operations.

use std::io;
use thiserror::Error;

/// Errors that can occur while building or querying twig indexes.
///
/// Every failure is non-recoverable locally: the component that detects the
/// violation fails immediately, with no coercion or default substitution.
/// Build and query are deterministic, so nothing in this crate retries —
/// retrying without changing the input would reproduce the same failure.
#[derive(Debug, Error)]
pub enum TwigError {
    /// Interval constructed with a lower bound above the upper bound.
    #[error("invalid interval: low {low} is greater than high {high}")]
    InvalidRange { low: f64, high: f64 },

    /// Hierarchical position code that does not parse as dot-separated
    /// non-negative integers.
    #[error("malformed hierarchical id: {0:?}")]
    MalformedId(String),

    /// Numeric token in a data source that does not parse as a float.
    #[error("malformed numeric value: {0:?}")]
    MalformedNumber(String),

    /// Query-shape descriptor that violates the expected record format.
    #[error("malformed query descriptor: {0}")]
    MalformedDescriptor(String),

    /// Bulk load was given zero entries.
    #[error("bulk load requires at least one entry")]
    EmptyInput,

    /// Fan-out below the minimum a tree node can hold.
    #[error("fan-out must be at least 2, got {0}")]
    InvalidFanout(usize),

    /// A name that is not among the declared element names.
    #[error("undeclared element: {0:?}")]
    UnknownElement(String),

    /// Paired id/value sources of different length.
    #[error("id and value sources differ in length: {ids} ids, {values} values")]
    SizeMismatch { ids: usize, values: usize },

    /// Entries or dimensions that disagree on dimensionality.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for twigdb operations.
pub type TwigResult<T> = Result<T, TwigError>;
