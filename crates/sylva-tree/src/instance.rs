//! Labeled categorical records.

use crate::error::TreeError;
use crate::node::AttributeIndex;

/// Class label of an instance.
pub type Label = i64;

/// Value of a single categorical attribute.
pub type AttributeValue = i64;

/// A labeled data point with a fixed-length vector of categorical attributes.
///
/// Instances are immutable once built. Trees never copy them; training works
/// on indices into the caller's slice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instance {
    decision: Label,
    attributes: Vec<AttributeValue>,
}

impl Instance {
    /// Create a new instance from its label and attribute values.
    #[must_use]
    pub fn new(decision: Label, attributes: Vec<AttributeValue>) -> Self {
        Self {
            decision,
            attributes,
        }
    }

    /// Return the class label.
    #[must_use]
    pub fn decision(&self) -> Label {
        self.decision
    }

    /// Return all attribute values in column order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeValue] {
        &self.attributes
    }

    /// Return the value of one attribute, or `None` if the index is out of range.
    #[must_use]
    pub fn attribute(&self, index: AttributeIndex) -> Option<AttributeValue> {
        self.attributes.get(index.index()).copied()
    }

    /// Return the number of attributes.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.attributes.len()
    }
}

/// Check that `instances` is non-empty and every instance shares the first
/// instance's attribute count. Returns that count.
pub(crate) fn validate_schema(instances: &[Instance]) -> Result<usize, TreeError> {
    let first = instances.first().ok_or(TreeError::EmptyDataset)?;
    let expected = first.n_attributes();
    for (instance_index, inst) in instances.iter().enumerate() {
        if inst.n_attributes() != expected {
            return Err(TreeError::AttributeCountMismatch {
                expected,
                got: inst.n_attributes(),
                instance_index,
            });
        }
    }
    Ok(expected)
}
