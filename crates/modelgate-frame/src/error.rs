//! Frame construction and persistence errors.

use std::path::PathBuf;

/// Errors raised while building, splitting, or persisting a [`Frame`].
///
/// [`Frame`]: crate::Frame
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A fetched document lacks a schema-required field entirely
    #[error("document {row} is missing required field `{field}`")]
    MissingField {
        /// Zero-based document index
        row: usize,
        /// Missing field name
        field: String,
    },

    /// A cell value cannot be coerced to the declared column kind
    #[error("column `{column}` row {row}: expected {expected}, got `{value}`")]
    TypeMismatch {
        /// Column name
        column: String,
        /// Zero-based row index
        row: usize,
        /// Declared kind
        expected: &'static str,
        /// Offending value rendered as text
        value: String,
    },

    /// Requested column does not exist in the frame
    #[error("frame has no column `{0}`")]
    UnknownColumn(String),

    /// Split ratio outside the open interval (0, 1)
    #[error("split ratio {0} outside (0, 1)")]
    BadSplitRatio(f64),

    /// Frame has no rows where at least one is required
    #[error("frame has no rows")]
    Empty,

    /// CSV encoding or decoding failed
    #[error("csv error at {path}: {source}")]
    Csv {
        /// File being read or written
        path: PathBuf,
        /// Underlying CSV error
        #[source]
        source: csv::Error,
    },

    /// Filesystem failure while persisting a partition
    #[error("io error at {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
