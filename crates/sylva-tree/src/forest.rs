//! Random Forest training with parallel tree construction.

use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::TreeError;
use crate::instance::{Instance, validate_schema};
use crate::split::SplitCriterion;
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// A fitted Random Forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) sample_ratio: f64,
    pub(crate) criterion: SplitCriterion,
    pub(crate) n_attributes: usize,
}

/// Largest bootstrap a `Vec<usize>` can address.
const MAX_BOOTSTRAP_DRAWS: usize = isize::MAX as usize / size_of::<usize>();

/// Number of draws per bootstrap: `floor(sample_ratio * n_samples)`.
///
/// Returns `None` when the product does not fit in a bootstrap index vector.
pub(crate) fn bootstrap_size(n_samples: usize, sample_ratio: f64) -> Option<usize> {
    let draws = (sample_ratio * n_samples as f64).floor();
    (draws < MAX_BOOTSTRAP_DRAWS as f64).then_some(draws as usize)
}

/// Draw `draw_count` indices uniformly with replacement from `0..n_samples`.
///
/// The index buffer is reserved up front so an oversized bootstrap surfaces
/// as [`TreeError::BootstrapAllocation`] instead of aborting.
fn bootstrap_sample(
    n_samples: usize,
    draw_count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<usize>, TreeError> {
    let mut sample = Vec::new();
    sample
        .try_reserve_exact(draw_count)
        .map_err(|_| TreeError::BootstrapAllocation { draw_count })?;
    sample.extend((0..draw_count).map(|_| rng.gen_range(0..n_samples)));
    Ok(sample)
}

/// Train the Random Forest ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = instances.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    instances: &[Instance],
) -> Result<RandomForest, TreeError> {
    let n_attributes = validate_schema(instances)?;
    let n_samples = instances.len();

    if !config.sample_ratio.is_finite() || config.sample_ratio <= 0.0 {
        return Err(TreeError::InvalidSampleRatio {
            sample_ratio: config.sample_ratio,
        });
    }

    let Some(draw_count) = bootstrap_size(n_samples, config.sample_ratio) else {
        return Err(TreeError::InvalidSampleRatio {
            sample_ratio: config.sample_ratio,
        });
    };
    if draw_count == 0 {
        return Err(TreeError::EmptyBootstrap {
            sample_ratio: config.sample_ratio,
            n_samples,
        });
    }

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_attributes,
        draw_count,
        criterion = ?config.criterion,
        "training random forest"
    );

    // Per-tree seeds from the master RNG, so results do not depend on scheduling.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let tree_config = DecisionTreeConfig::new().with_criterion(config.criterion);

    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let bootstrap = bootstrap_sample(n_samples, draw_count, &mut rng)?;
            tree_config.fit_indices(instances, &bootstrap, n_attributes)
        })
        .collect::<Result<_, _>>()?;

    debug!(
        n_trees_trained = trees.len(),
        total_nodes = trees.iter().map(DecisionTree::n_nodes).sum::<usize>(),
        "tree training complete"
    );

    Ok(RandomForest {
        trees,
        sample_ratio: config.sample_ratio,
        criterion: config.criterion,
        n_attributes,
    })
}

impl RandomForest {
    /// The member trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the sample ratio used for bootstrapping.
    #[must_use]
    pub fn sample_ratio(&self) -> f64 {
        self.sample_ratio
    }

    /// Return the criterion shared by every tree.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the number of attributes per instance.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.n_attributes
    }
}

/// Diagnostic dump of every tree, each preceded by a `Tree <i>` header.
impl fmt::Display for RandomForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tree) in self.trees.iter().enumerate() {
            writeln!(f, "Tree {i}")?;
            write!(f, "{tree}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(decision: i64, attributes: &[i64]) -> Instance {
        Instance::new(decision, attributes.to_vec())
    }

    /// Three labels, each determined by attribute 0.
    fn make_separable_data() -> Vec<Instance> {
        let mut data = Vec::new();
        for i in 0..20 {
            data.push(inst(0, &[1, i % 3, i % 2]));
            data.push(inst(1, &[2, i % 3, i % 2]));
            data.push(inst(2, &[3, i % 3, i % 2]));
        }
        data
    }

    #[test]
    fn bootstrap_size_is_floor() {
        assert_eq!(bootstrap_size(10, 1.0), Some(10));
        assert_eq!(bootstrap_size(10, 0.25), Some(2));
        assert_eq!(bootstrap_size(7, 0.5), Some(3));
        assert_eq!(bootstrap_size(10, 1.5), Some(15));
        assert_eq!(bootstrap_size(3, 0.2), Some(0));
    }

    #[test]
    fn bootstrap_size_overflow_is_none() {
        assert_eq!(bootstrap_size(2, 1e30), None);
        assert_eq!(bootstrap_size(1, f64::MAX), None);
        assert_eq!(bootstrap_size(2, MAX_BOOTSTRAP_DRAWS as f64), None);
    }

    #[test]
    fn bootstrap_draws_with_replacement_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let sample = bootstrap_sample(5, 200, &mut rng).unwrap();
        assert_eq!(sample.len(), 200);
        assert!(sample.iter().all(|&i| i < 5));
        let mut distinct = sample.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn every_tree_trains_on_exact_bootstrap_size() {
        let data = make_separable_data();
        for ratio in [0.2, 0.5, 1.0, 1.7] {
            let forest = RandomForestConfig::new(6)
                .unwrap()
                .with_sample_ratio(ratio)
                .fit(&data)
                .unwrap();
            let expected = (ratio * data.len() as f64).floor() as usize;
            for tree in forest.trees() {
                assert_eq!(tree.n_samples(), expected);
            }
        }
    }

    #[test]
    fn trees_share_forest_criterion() {
        let data = make_separable_data();
        let forest = RandomForestConfig::new(4)
            .unwrap()
            .with_criterion(SplitCriterion::GainRatio)
            .fit(&data)
            .unwrap();
        assert_eq!(forest.n_trees(), 4);
        assert_eq!(forest.criterion(), SplitCriterion::GainRatio);
        assert!(forest.trees().iter().all(|t| t.criterion() == SplitCriterion::GainRatio));
        assert_eq!(forest.n_attributes(), 3);
    }

    #[test]
    fn empty_dataset_error() {
        let err = RandomForestConfig::new(10).unwrap().fit(&[]).unwrap_err();
        assert!(matches!(err, TreeError::EmptyDataset));
    }

    #[test]
    fn zero_size_bootstrap_is_fatal() {
        let data = vec![inst(0, &[1]), inst(1, &[2]), inst(1, &[3])];
        let err = RandomForestConfig::new(5)
            .unwrap()
            .with_sample_ratio(0.1)
            .fit(&data)
            .unwrap_err();
        assert!(matches!(err, TreeError::EmptyBootstrap { n_samples: 3, .. }));
    }

    #[test]
    fn invalid_sample_ratio_rejected() {
        let data = make_separable_data();
        for ratio in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let err = RandomForestConfig::new(2)
                .unwrap()
                .with_sample_ratio(ratio)
                .fit(&data)
                .unwrap_err();
            assert!(matches!(err, TreeError::InvalidSampleRatio { .. }));
        }
    }

    #[test]
    fn oversized_sample_ratio_rejected() {
        let data = vec![inst(0, &[1]), inst(1, &[2])];
        for ratio in [1e30, f64::MAX] {
            let err = RandomForestConfig::new(1)
                .unwrap()
                .with_sample_ratio(ratio)
                .fit(&data)
                .unwrap_err();
            assert!(matches!(err, TreeError::InvalidSampleRatio { .. }));
        }
    }

    #[test]
    fn unallocatable_bootstrap_is_an_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let draw_count = MAX_BOOTSTRAP_DRAWS - 1;
        let err = bootstrap_sample(2, draw_count, &mut rng).unwrap_err();
        assert!(matches!(err, TreeError::BootstrapAllocation { draw_count: d } if d == draw_count));
    }

    #[test]
    fn same_seed_same_forest() {
        let data = make_separable_data();
        let config = RandomForestConfig::new(8).unwrap().with_sample_ratio(0.4).with_seed(99);
        let a = config.fit(&data).unwrap();
        let b = config.fit(&data).unwrap();
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn display_tags_each_tree() {
        let data = make_separable_data();
        let forest = RandomForestConfig::new(3).unwrap().fit(&data).unwrap();
        let dump = forest.to_string();
        assert!(dump.starts_with("Tree 0\n"));
        assert!(dump.contains("\nTree 1\n"));
        assert!(dump.contains("\nTree 2\n"));
        assert!(!dump.contains("Tree 3"));
    }
}
