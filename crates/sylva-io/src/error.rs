//! I/O error types for sylva-io.

use std::path::PathBuf;

/// Errors from reading whitespace-separated instance records.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file cannot be opened (missing, permission
    /// denied, ...); `source` carries the reason.
    #[error("cannot open {path}: {source}")]
    Open {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading a line fails part-way through the file.
    #[error("cannot read line {line} of {path}")]
    ReadLine {
        /// Path to the record file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a line has fewer fields than a decision plus every attribute.
    #[error("line {line} of {path} has {got} fields, expected at least {expected}")]
    MissingField {
        /// Path to the record file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Required number of leading integer fields.
        expected: usize,
        /// Number of fields present.
        got: usize,
    },

    /// Returned when a required field is not an integer.
    #[error("line {line} of {path}: field {column} is not an integer: \"{raw}\"")]
    InvalidField {
        /// Path to the record file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Zero-based field index (0 is the decision).
        column: usize,
        /// The raw token that failed to parse.
        raw: String,
    },

    /// Returned when the file contains no records.
    #[error("empty dataset (no records) in {path}")]
    EmptyDataset {
        /// Path to the record file.
        path: PathBuf,
    },
}
