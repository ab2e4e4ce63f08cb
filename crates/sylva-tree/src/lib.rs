//! Decision trees and random forests over categorical data.
//!
//! Provides ID3 (information gain) and C4.5 (gain ratio) tree induction,
//! a bagged Random Forest with parallel training via rayon and majority
//! voting, and held-out evaluation with a label-keyed confusion matrix.

mod config;
mod confusion;
mod error;
mod eval;
mod forest;
mod instance;
mod node;
mod split;
mod tree;
mod vote;

pub use config::RandomForestConfig;
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use error::TreeError;
pub use eval::{Classifier, Evaluation, evaluate};
pub use forest::RandomForest;
pub use instance::{AttributeValue, Instance, Label};
pub use node::{AttributeIndex, Entropy, Node, NodeIndex};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
pub use vote::VoteTally;
