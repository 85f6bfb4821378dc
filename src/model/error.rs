//! Fitted model construction errors.

/// Errors raised while assembling a [`FittedModelContext`](super::FittedModelContext).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Coefficient matrix width differs from the feature schema.
    #[error("coefficient matrix has {actual} columns, schema has {expected} features")]
    FeatureCountMismatch { expected: usize, actual: usize },

    /// Fewer than two class labels.
    #[error("a classifier needs at least 2 classes, got {0}")]
    TooFewClasses(usize),

    /// Coefficient rows do not match the class count.
    ///
    /// Binary models carry one row; multiclass models carry one row per class.
    #[error("{rows} coefficient rows cannot describe {classes} classes")]
    ClassCountMismatch { rows: usize, classes: usize },

    /// One intercept is required per coefficient row.
    #[error("expected {expected} intercepts, got {actual}")]
    InterceptCountMismatch { expected: usize, actual: usize },

    /// The same class label appears twice.
    #[error("duplicate class label '{0}'")]
    DuplicateClass(String),

    /// A coefficient or intercept is NaN or infinite.
    #[error("non-finite parameter in coefficient row {row}")]
    NonFinite { row: usize },
}
