//! Majority-vote prediction for the Random Forest ensemble.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::TreeError;
use crate::forest::RandomForest;
use crate::instance::{Instance, Label};
use crate::split::majority;

/// Per-label vote counts collected from every tree for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
    votes: BTreeMap<Label, usize>,
}

impl VoteTally {
    pub(crate) fn new(votes: BTreeMap<Label, usize>) -> Self {
        Self { votes }
    }

    /// Return the label with the most votes; ties go to the lowest label.
    ///
    /// Returns `None` only for an empty tally.
    #[must_use]
    pub fn winner(&self) -> Option<Label> {
        majority(&self.votes)
    }

    /// Return the number of votes cast for `label`.
    #[must_use]
    pub fn votes_for(&self, label: Label) -> usize {
        self.votes.get(&label).copied().unwrap_or(0)
    }

    /// Return the total number of votes, one per tree.
    #[must_use]
    pub fn total(&self) -> usize {
        self.votes.values().sum()
    }

    /// Return `(label, votes)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, usize)> + '_ {
        self.votes.iter().map(|(&label, &count)| (label, count))
    }
}

impl RandomForest {
    /// Collect one vote per tree for `instance`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionAttributeMismatch`] when the instance's
    /// attribute count differs from the training data.
    pub fn vote<R: Rng + ?Sized>(
        &self,
        instance: &Instance,
        rng: &mut R,
    ) -> Result<VoteTally, TreeError> {
        let mut votes = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.decide(instance, rng)?).or_insert(0) += 1;
        }
        Ok(VoteTally::new(votes))
    }

    /// Predict the label for `instance` by majority vote.
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
        match self.vote(instance, rng)?.winner() {
            Some(label) => Ok(label),
            None => unreachable!("a fitted forest has at least one tree"),
        }
    }

    /// Predict labels for a batch of instances in parallel.
    ///
    /// Each instance gets its own generator, derived from `seed` in input
    /// order, so the output does not depend on the thread count.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionAttributeMismatch`] if any instance has
    /// the wrong attribute count.
    pub fn decide_batch(&self, instances: &[Instance], seed: u64) -> Result<Vec<Label>, TreeError> {
        let mut master_rng = ChaCha8Rng::seed_from_u64(seed);
        let seeds: Vec<u64> = (0..instances.len()).map(|_| master_rng.r#gen()).collect();
        instances
            .par_iter()
            .zip(seeds.into_par_iter())
            .map(|(instance, seed)| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                self.decide(instance, &mut rng)
            })
            .collect()
    }
}
