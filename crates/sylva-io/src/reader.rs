//! Whitespace-separated instance record reader with input validation.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use sylva_tree::{AttributeValue, Instance, Label};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Attribute count of the MONK's problems record format.
pub const DEFAULT_N_ATTRIBUTES: usize = 6;

/// Reads labeled instances from a text file.
///
/// Expected format, one instance per line:
/// - `<decision> <a0> <a1> ... <a{n-1}>`, integers separated by whitespace
/// - leading whitespace is ignored, blank lines are skipped
/// - fields after the first `1 + n_attributes` are ignored (e.g. record ids)
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::Open`] | File cannot be opened |
/// | [`IoError::ReadLine`] | A line could not be read |
/// | [`IoError::MissingField`] | Line has fewer than `1 + n_attributes` fields |
/// | [`IoError::InvalidField`] | A required field is not an integer |
/// | [`IoError::EmptyDataset`] | No records in the file |
pub struct RecordReader {
    path: PathBuf,
    n_attributes: usize,
}

impl RecordReader {
    /// Create a new reader for the given path, expecting six attributes per line.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            n_attributes: DEFAULT_N_ATTRIBUTES,
        }
    }

    /// Set the number of attributes per record.
    #[must_use]
    pub fn with_n_attributes(mut self, n_attributes: usize) -> Self {
        self.n_attributes = n_attributes;
        self
    }

    /// Return the number of attributes per record.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.n_attributes
    }

    /// Read and validate the file, returning its instances in file order.
    #[instrument(skip(self), fields(path = %self.path.display(), n_attributes = self.n_attributes))]
    pub fn read(&self) -> Result<Vec<Instance>, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::Open {
            path: self.path.clone(),
            source: e,
        })?;

        let mut instances = Vec::new();
        for (line_index, line) in BufReader::new(file).lines().enumerate() {
            let line_no = line_index + 1;
            let line = line.map_err(|e| IoError::ReadLine {
                path: self.path.clone(),
                line: line_no,
                source: e,
            })?;
            if line.trim().is_empty() {
                debug!(line = line_no, "skipping blank line");
                continue;
            }
            instances.push(self.parse_line(&line, line_no)?);
        }

        if instances.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_instances = instances.len(), "records loaded");

        Ok(instances)
    }

    fn parse_line(&self, line: &str, line_no: usize) -> Result<Instance, IoError> {
        let expected = self.n_attributes + 1;
        let fields: Vec<&str> = line.split_whitespace().take(expected).collect();
        if fields.len() < expected {
            return Err(IoError::MissingField {
                path: self.path.clone(),
                line: line_no,
                expected,
                got: fields.len(),
            });
        }

        let mut values = Vec::with_capacity(expected);
        for (column, raw) in fields.iter().enumerate() {
            let value: i64 = raw.parse().map_err(|_| IoError::InvalidField {
                path: self.path.clone(),
                line: line_no,
                column,
                raw: (*raw).to_string(),
            })?;
            values.push(value);
        }

        let decision: Label = values[0];
        let attributes: Vec<AttributeValue> = values.split_off(1);
        Ok(Instance::new(decision, attributes))
    }
}
