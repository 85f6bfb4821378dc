//! Dataset construction and access errors.

/// Errors raised while building or reading a [`Dataset`](super::Dataset).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    /// The same feature name appears twice in a schema.
    #[error("duplicate feature name '{0}'")]
    DuplicateFeature(String),

    /// A feature name was looked up that the schema does not contain.
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    /// The number of values does not match the number of feature names.
    #[error("expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A row of a row-wise constructor has the wrong length.
    #[error("row {row} has {actual} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Row index past the end of the dataset.
    #[error("row {row} out of range for dataset with {n_samples} samples")]
    RowOutOfRange { row: usize, n_samples: usize },

    /// A statistic was requested over a dataset with no samples.
    #[error("dataset has no samples")]
    Empty,

    /// A column has no non-missing values to summarize.
    #[error("feature '{0}' has no non-missing values")]
    AllMissing(String),
}
