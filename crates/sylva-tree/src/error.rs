/// Errors from decision tree and random forest operations.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when the training (or evaluation) dataset has zero instances.
    #[error("dataset has zero instances")]
    EmptyDataset,

    /// Returned when the sample ratio draws zero instances for a tree's bootstrap.
    #[error("sample_ratio {sample_ratio} draws zero instances from a dataset of {n_samples}")]
    EmptyBootstrap {
        /// The configured sample ratio.
        sample_ratio: f64,
        /// The number of instances in the training set.
        n_samples: usize,
    },

    /// Returned when an instance has a different number of attributes than the first one.
    #[error("instance {instance_index} has {got} attributes, expected {expected}")]
    AttributeCountMismatch {
        /// The attribute count of the first instance.
        expected: usize,
        /// The attribute count of the offending instance.
        got: usize,
        /// The zero-based index of the offending instance.
        instance_index: usize,
    },

    /// Returned when a query instance does not match the trained attribute count.
    #[error("query instance has {got} attributes, expected {expected}")]
    PredictionAttributeMismatch {
        /// The attribute count the model was trained on.
        expected: usize,
        /// The attribute count of the query instance.
        got: usize,
    },

    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when sample_ratio is not a positive finite number, or is so
    /// large that the bootstrap size overflows.
    #[error("sample_ratio must be positive, finite and yield an addressable bootstrap, got {sample_ratio}")]
    InvalidSampleRatio {
        /// The invalid sample_ratio value provided.
        sample_ratio: f64,
    },

    /// Returned when the bootstrap index buffer cannot be allocated.
    #[error("cannot allocate a bootstrap of {draw_count} draws")]
    BootstrapAllocation {
        /// Requested number of draws per tree.
        draw_count: usize,
    },
}
