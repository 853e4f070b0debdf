/// Errors from random forest training, prediction, and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when min_size is zero.
    #[error("min_size must be at least 1, got {min_size}")]
    InvalidMinSize {
        /// The invalid min_size value provided.
        min_size: usize,
    },

    /// Returned when the per-split feature count resolves to 0 or exceeds the column count.
    #[error("n_features resolved to {max_features}, but must be in [1, {n_features}]")]
    InvalidMaxFeatures {
        /// The resolved number of features examined per split.
        max_features: usize,
        /// The number of feature columns in the dataset.
        n_features: usize,
    },

    /// Returned when sample_ratio is outside (0, 1].
    #[error("sample_ratio must be in (0, 1], got {ratio}")]
    InvalidSampleRatio {
        /// The invalid sample_ratio value provided.
        ratio: f64,
    },

    /// Returned when the bootstrap draw count rounds to zero rows.
    #[error("sample_ratio {ratio} over {n_rows} rows draws an empty bootstrap sample")]
    EmptyBootstrapSample {
        /// The configured sample ratio.
        ratio: f64,
        /// Number of rows in the training set.
        n_rows: usize,
    },

    /// Returned when n_folds is less than 2.
    #[error("n_folds must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The invalid n_folds value provided.
        n_folds: usize,
    },

    /// Returned when there are more folds than rows, which would leave folds empty.
    #[error("n_folds ({n_folds}) exceeds the number of rows ({n_rows})")]
    FoldCountExceedsRows {
        /// The requested number of folds.
        n_folds: usize,
        /// The number of rows in the dataset.
        n_rows: usize,
    },

    /// Returned when the dataset has zero rows.
    #[error("dataset has zero rows")]
    EmptyDataset,

    /// Returned when the dataset has zero feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a record has a different number of features than the first record.
    #[error("record {row_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the record.
        got: usize,
        /// The zero-based index of the offending record.
        row_index: usize,
    },

    /// Returned when feature rows and labels have different lengths.
    #[error("{n_rows} feature rows but {n_labels} labels")]
    LabelCountMismatch {
        /// Number of feature rows.
        n_rows: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when a label is too large to derive a class count from.
    #[error("label {label} in record {row_index} is out of range")]
    LabelOutOfRange {
        /// The offending label.
        label: usize,
        /// The zero-based index of the offending record.
        row_index: usize,
    },

    /// Returned when a record passed for prediction has the wrong feature count.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },
}
