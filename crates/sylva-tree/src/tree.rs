use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use tracing::{debug, instrument, trace};

use crate::{
    TreeError,
    instance::{Instance, Label, validate_schema},
    node::{Node, NodeIndex},
    split::{AttributeSet, SplitCriterion, entropy, find_best_split, label_counts, majority},
};

/// Configuration for a single ID3/C4.5 decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter   | Default           |
/// |-------------|-------------------|
/// | `criterion` | `InformationGain` |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
}

impl DecisionTreeConfig {
    /// Create a new config with default values (ID3 information gain).
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::InformationGain,
        }
    }

    /// Set the attribute ranking criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Return the attribute ranking criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Train a decision tree on `instances`.
    ///
    /// # Errors
    ///
    /// | Variant                                  | When                                  |
    /// |------------------------------------------|---------------------------------------|
    /// | [`TreeError::EmptyDataset`]              | `instances` is empty                  |
    /// | [`TreeError::AttributeCountMismatch`]    | instances have inconsistent lengths   |
    #[instrument(skip(self, instances), fields(n_samples = instances.len()))]
    pub fn fit(&self, instances: &[Instance]) -> Result<DecisionTree, TreeError> {
        let n_attributes = validate_schema(instances)?;
        let indices: Vec<usize> = (0..instances.len()).collect();
        self.fit_indices(instances, &indices, n_attributes)
    }

    /// Train on the subset of `instances` selected by `indices`.
    ///
    /// Indices may repeat (bootstrap samples). The caller guarantees that
    /// every instance has `n_attributes` attributes.
    pub(crate) fn fit_indices(
        &self,
        instances: &[Instance],
        indices: &[usize],
        n_attributes: usize,
    ) -> Result<DecisionTree, TreeError> {
        if indices.is_empty() {
            return Err(TreeError::EmptyDataset);
        }

        let labels: Vec<Label> = label_counts(instances, indices).into_keys().collect();

        debug!(
            n_samples = indices.len(),
            n_attributes,
            n_decisions = labels.len(),
            criterion = ?self.criterion,
            "fitting decision tree"
        );

        let mut arena: Vec<Node> = Vec::new();
        let root = build_node(
            instances,
            indices,
            AttributeSet::all(n_attributes),
            self.criterion,
            &mut arena,
        );

        debug!(
            root_index = root.index(),
            n_nodes = arena.len(),
            "decision tree built"
        );

        Ok(DecisionTree {
            nodes: arena,
            labels,
            n_attributes,
            criterion: self.criterion,
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively build the subtree for `indices` and return its arena index.
///
/// `available` is owned by this call; children receive their own copies.
fn build_node(
    instances: &[Instance],
    indices: &[usize],
    available: AttributeSet,
    criterion: SplitCriterion,
    arena: &mut Vec<Node>,
) -> NodeIndex {
    let n_samples = indices.len();
    let counts = label_counts(instances, indices);
    let node_entropy = entropy(counts.values().copied(), n_samples);

    let make_leaf = |arena: &mut Vec<Node>, decision: Label| -> NodeIndex {
        let idx = arena.len();
        arena.push(Node::Leaf {
            decision,
            entropy: node_entropy,
            n_samples,
        });
        NodeIndex::new(idx)
    };

    // Pure subset, or nothing left to split on.
    let majority_label = majority(&counts).unwrap_or_default();
    if counts.len() == 1 {
        return make_leaf(arena, majority_label);
    }
    let Some(split) = find_best_split(instances, indices, &available, criterion, node_entropy)
    else {
        return make_leaf(arena, majority_label);
    };

    trace!(
        attribute = split.attribute.index(),
        gain = split.score.gain,
        split_info = split.score.split_info,
        n_children = split.partitions.len(),
        "splitting node"
    );

    // Reserve this node's slot so it precedes its children in the arena.
    let node_idx = arena.len();
    arena.push(Node::Leaf {
        decision: majority_label,
        entropy: node_entropy,
        n_samples,
    });

    let child_available = available.without(split.attribute);
    let children = split
        .partitions
        .iter()
        .map(|(&value, part)| {
            let child = build_node(instances, part, child_available.clone(), criterion, arena);
            (value, child)
        })
        .collect();

    arena[node_idx] = Node::Interior {
        attribute: split.attribute,
        children,
        entropy: node_entropy,
        n_samples,
    };

    NodeIndex::new(node_idx)
}

/// A fitted ID3/C4.5 decision tree over categorical attributes.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) labels: Vec<Label>,
    pub(crate) n_attributes: usize,
    pub(crate) criterion: SplitCriterion,
}

impl DecisionTree {
    /// Predict the label for `instance`; its own label is ignored.
    ///
    /// When an interior node has no child for the instance's attribute
    /// value, the result is drawn uniformly from the labels seen at the root
    /// during training, using `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionAttributeMismatch`] when the instance's
    /// attribute count differs from the training data.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        instance: &Instance,
        rng: &mut R,
    ) -> Result<Label, TreeError> {
        match self.find_leaf(instance)? {
            Some(leaf) => match &self.nodes[leaf.index()] {
                Node::Leaf { decision, .. } => Ok(*decision),
                Node::Interior { .. } => unreachable!("find_leaf always ends at a leaf"),
            },
            None => Ok(self.labels[rng.gen_range(0..self.labels.len())]),
        }
    }

    /// Walk from the root using `instance`'s attribute values.
    ///
    /// Returns the arena index of the leaf reached, or `None` when an
    /// attribute value was never seen at the corresponding node.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionAttributeMismatch`] when the instance's
    /// attribute count differs from the training data.
    pub fn find_leaf(&self, instance: &Instance) -> Result<Option<NodeIndex>, TreeError> {
        if instance.n_attributes() != self.n_attributes {
            return Err(TreeError::PredictionAttributeMismatch {
                expected: self.n_attributes,
                got: instance.n_attributes(),
            });
        }
        let attributes = instance.attributes();
        let mut idx = NodeIndex::new(0);
        loop {
            match &self.nodes[idx.index()] {
                Node::Leaf { .. } => return Ok(Some(idx)),
                Node::Interior {
                    attribute,
                    children,
                    ..
                } => match children.get(&attributes[attribute.index()]) {
                    Some(&child) => idx = child,
                    None => return Ok(None),
                },
            }
        }
    }

    /// Distinct labels in the training set, ascending.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Number of distinct labels in the training set.
    #[must_use]
    pub fn n_decisions(&self) -> usize {
        self.labels.len()
    }

    /// Number of attributes per instance.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.n_attributes
    }

    /// Number of training instances (counting bootstrap repeats).
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.nodes[0].n_samples()
    }

    /// The criterion this tree was trained with.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// All nodes in arena order; the root is at index 0.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the total number of nodes in the tree.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree. A lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut queue = VecDeque::from([(0usize, 0usize)]);
        while let Some((node_idx, d)) = queue.pop_front() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Interior { children, .. } => {
                    queue.extend(children.values().map(|c| (c.index(), d + 1)));
                }
            }
        }
        max_depth
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, idx: NodeIndex, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            write!(f, "\t")?;
        }
        match &self.nodes[idx.index()] {
            Node::Leaf { decision, .. } => writeln!(f, "LEAF decision: {decision}"),
            Node::Interior {
                attribute,
                children,
                ..
            } => {
                let keys: Vec<_> = children.keys().collect();
                writeln!(f, "INTERIOR attribute: {attribute} children: {keys:?}")?;
                for &child in children.values() {
                    self.fmt_node(f, child, depth + 1)?;
                }
                Ok(())
            }
        }
    }
}

/// Diagnostic dump: one line per node, tab-indented by depth.
impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, NodeIndex::new(0), 0)
    }
}
