use std::collections::BTreeMap;
use std::fmt;

use crate::instance::{AttributeValue, Label};

/// Zero-based attribute column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeIndex(usize);

impl AttributeIndex {
    /// Create a new attribute index from a zero-based column position.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based attribute column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AttributeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shannon entropy (natural log) of a label distribution.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Entropy(f64);

impl Entropy {
    /// Create a new entropy value.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw entropy in nats.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A node in a decision tree arena.
///
/// Trees are stored as `Vec<Node>` where children are referenced by
/// [`NodeIndex`]. The root is always at index 0.
#[derive(Debug, Clone)]
pub enum Node {
    /// An interior node testing one categorical attribute.
    Interior {
        /// Attribute tested at this node.
        attribute: AttributeIndex,
        /// One child per attribute value observed in this node's training subset.
        children: BTreeMap<AttributeValue, NodeIndex>,
        /// Label entropy of the training subset at this node.
        entropy: Entropy,
        /// Number of training instances that reached this node.
        n_samples: usize,
    },
    /// A terminal leaf node.
    Leaf {
        /// Predicted label.
        decision: Label,
        /// Label entropy of the training subset at this leaf.
        entropy: Entropy,
        /// Number of training instances in this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Return the label entropy of the training subset at this node.
    #[must_use]
    pub fn entropy(&self) -> Entropy {
        match self {
            Node::Interior { entropy, .. } | Node::Leaf { entropy, .. } => *entropy,
        }
    }

    /// Return the number of training instances that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Interior { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Return the child reached by `value`, if this is an interior node that saw it.
    #[must_use]
    pub fn child(&self, value: AttributeValue) -> Option<NodeIndex> {
        match self {
            Node::Interior { children, .. } => children.get(&value).copied(),
            Node::Leaf { .. } => None,
        }
    }
}
