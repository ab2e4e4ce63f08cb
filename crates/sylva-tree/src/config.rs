//! Configuration builder for Random Forest training.

use crate::error::TreeError;
use crate::forest::RandomForest;
use crate::instance::Instance;
use crate::split::SplitCriterion;

/// Configuration for Random Forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter      | Default           |
/// |----------------|-------------------|
/// | `sample_ratio` | 1.0               |
/// | `criterion`    | `InformationGain` |
/// | `seed`         | 42                |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) sample_ratio: f64,
    pub(crate) criterion: SplitCriterion,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, TreeError> {
        if n_trees == 0 {
            return Err(TreeError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            sample_ratio: 1.0,
            criterion: SplitCriterion::InformationGain,
            seed: 42,
        })
    }

    /// Set the bootstrap size as a fraction of the training set.
    ///
    /// Values above 1.0 oversample with replacement.
    #[must_use]
    pub fn with_sample_ratio(mut self, sample_ratio: f64) -> Self {
        self.sample_ratio = sample_ratio;
        self
    }

    /// Set the attribute ranking criterion shared by every tree.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the sample ratio.
    #[must_use]
    pub fn sample_ratio(&self) -> f64 {
        self.sample_ratio
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a Random Forest on `instances`.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                          |
    /// |---------------------------------------|-----------------------------------------------|
    /// | [`TreeError::EmptyDataset`]           | `instances` is empty                          |
    /// | [`TreeError::AttributeCountMismatch`] | instances have inconsistent lengths           |
    /// | [`TreeError::InvalidSampleRatio`]     | `sample_ratio` is not positive and finite     |
    /// | [`TreeError::EmptyBootstrap`]         | `floor(sample_ratio * n)` is zero             |
    pub fn fit(&self, instances: &[Instance]) -> Result<RandomForest, TreeError> {
        crate::forest::train(self, instances)
    }
}
