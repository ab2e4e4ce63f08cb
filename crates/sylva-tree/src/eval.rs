//! Held-out evaluation for trees and forests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::confusion::ConfusionMatrix;
use crate::error::TreeError;
use crate::forest::RandomForest;
use crate::instance::{Instance, Label};
use crate::tree::DecisionTree;

/// A fitted model that maps an instance's attributes to a label.
pub trait Classifier {
    /// Predict the label for `instance`, ignoring its own label.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionAttributeMismatch`] when the instance's
    /// attribute count differs from the training data.
    fn decide<R: Rng + ?Sized>(&self, instance: &Instance, rng: &mut R)
    -> Result<Label, TreeError>;
}

impl Classifier for DecisionTree {
    fn decide<R: Rng + ?Sized>(
        &self,
        instance: &Instance,
        rng: &mut R,
    ) -> Result<Label, TreeError> {
        DecisionTree::decide(self, instance, rng)
    }
}

impl Classifier for RandomForest {
    fn decide<R: Rng + ?Sized>(
        &self,
        instance: &Instance,
        rng: &mut R,
    ) -> Result<Label, TreeError> {
        RandomForest::decide(self, instance, rng)
    }
}

/// Outcome of evaluating a classifier on a labeled test set.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Proportion of test instances predicted correctly.
    pub accuracy: f64,
    /// Number of correct predictions.
    pub n_correct: usize,
    /// Number of test instances.
    pub n_samples: usize,
    /// True label × predicted label counts.
    pub confusion_matrix: ConfusionMatrix,
}

/// Decide every instance in `test` and compare against its label.
///
/// Unseen-value fallbacks draw from a generator seeded with `seed`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`TreeError::EmptyDataset`] | `test` is empty |
/// | [`TreeError::PredictionAttributeMismatch`] | a test instance has the wrong attribute count |
#[instrument(skip_all, fields(n_samples = test.len()))]
pub fn evaluate<C: Classifier>(
    model: &C,
    test: &[Instance],
    seed: u64,
) -> Result<Evaluation, TreeError> {
    if test.is_empty() {
        return Err(TreeError::EmptyDataset);
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let predicted = test
        .iter()
        .map(|inst| model.decide(inst, &mut rng))
        .collect::<Result<Vec<_>, _>>()?;
    let true_labels: Vec<Label> = test.iter().map(Instance::decision).collect();

    let n_correct = true_labels
        .iter()
        .zip(&predicted)
        .filter(|&(t, p)| t == p)
        .count();
    let accuracy = n_correct as f64 / test.len() as f64;
    let confusion_matrix = ConfusionMatrix::from_labels(&true_labels, &predicted)?;

    info!(accuracy, n_correct, "evaluation complete");

    Ok(Evaluation {
        accuracy,
        n_correct,
        n_samples: test.len(),
        confusion_matrix,
    })
}
