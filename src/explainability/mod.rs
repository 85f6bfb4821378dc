//! Explainability module.
//!
//! Decomposes a prediction's log-odds into additive per-feature contributions
//! and renders them for humans.
//!
//! # Attribution Sources
//!
//! Two sources produce the same [`ContributionSet`] contract:
//! - **Linear**: closed form `contribution[f] = w[f] * (x[f] - baseline[f])`
//!   ([`LinearDecomposition`])
//! - **Oracle**: per-feature values supplied by an external exact-attribution
//!   method such as tree SHAP ([`ExternalOracleAttribution`])
//!
//! Both are wrapped by [`AttributionSource`] so ranking, waterfall steps and
//! reports never care where the numbers came from.
//!
//! # Example
//!
//! ```
//! use riskshap::{waterfall_steps, FeatureVector, LinearDecisionFunction, LinearDecomposition};
//!
//! let coefficients = FeatureVector::from_pairs([("age", 0.5), ("chol", -0.2)]).unwrap();
//! let baseline = FeatureVector::from_pairs([("age", 50.0), ("chol", 200.0)]).unwrap();
//! let source = LinearDecomposition::new(LinearDecisionFunction::new(coefficients, 0.1), baseline).unwrap();
//!
//! let patient = FeatureVector::from_pairs([("age", 60.0), ("chol", 180.0)]).unwrap();
//! let attribution = source.attribute(&patient).unwrap();
//! let steps: Vec<f64> = waterfall_steps(attribution.baseline_logit, attribution.contributions.as_slice()).collect();
//! assert_eq!(steps.len(), 3);
//! ```

mod contributions;
mod importance;
mod linear_explainer;
mod oracle;
mod report;
mod source;
mod values;
mod waterfall;

pub use contributions::{rank_top_k, render_direction, Contribution, ContributionSet, Direction};
pub use importance::GlobalImportance;
pub use linear_explainer::{
    compute_baseline_logit, compute_instance_logit, compute_logit, decompose, LinearDecomposition,
};
pub use oracle::{AttributionOracle, ExternalAttribution, ExternalOracleAttribution};
pub use report::{AttributionReport, RiskLevel};
pub use source::{Attribution, AttributionSource};
pub use values::AttributionMatrix;
pub use waterfall::{waterfall_steps, Waterfall, WaterfallBar, WaterfallSteps};

use crate::data::{DatasetError, FeatureSchema};
use crate::model::ModelError;

/// Errors raised while explaining a prediction.
#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    /// Instance, baseline and coefficients do not share the same feature names.
    #[error(
        "feature schema mismatch in {context}: missing [{}], unexpected [{}]",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    SchemaMismatch {
        /// What was being compared (e.g. "instance", "baseline").
        context: &'static str,
        /// Expected names the input lacks.
        missing: Vec<String>,
        /// Input names that were not expected.
        unexpected: Vec<String>,
    },

    /// The feature schema is empty; there is nothing to attribute.
    #[error("cannot explain a prediction over zero features")]
    EmptyContributionSet,

    /// A class label not known to the model.
    #[error("unknown class '{0}'")]
    UnknownClass(String),

    /// A class index past the model's class list.
    #[error("class index {index} out of range for {n_classes} classes")]
    ClassIndexOutOfRange { index: usize, n_classes: usize },

    /// `ClassSelection::Positive` on a model with more than two classes.
    #[error("a {n_classes}-class model has no positive class; select a class by index, label or prediction")]
    AmbiguousPositiveClass { n_classes: usize },

    /// Contributions do not sum to the explained logit difference.
    #[error("contributions sum to {sum}, expected {expected} (error {error:e} exceeds tolerance {tolerance:e})")]
    AdditivityViolation {
        sum: f64,
        expected: f64,
        error: f64,
        tolerance: f64,
    },

    /// An attribution oracle returned unusable output.
    #[error("invalid oracle output: {0}")]
    InvalidOracleOutput(String),

    /// Oracle output could not be parsed.
    #[error("failed to parse oracle output: {0}")]
    Json(#[from] serde_json::Error),

    /// Dataset access failed.
    #[error(transparent)]
    Data(#[from] DatasetError),

    /// Model construction failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ExplainError {
    /// Fail unless `found` holds exactly the names of `expected`, in any order.
    pub(crate) fn check_schema(
        context: &'static str,
        expected: &FeatureSchema,
        found: &FeatureSchema,
    ) -> Result<(), ExplainError> {
        if expected.same_features(found) {
            return Ok(());
        }
        let (missing, unexpected) = expected.diff(found);
        Err(ExplainError::SchemaMismatch {
            context,
            missing,
            unexpected,
        })
    }
}

/// Relative additivity check shared by every attribution source.
///
/// The error is scaled by the largest of the compared values, `magnitude`
/// (the size of the logits the values were derived from) and 1.0, so the
/// tolerance acts relative for large logits and absolute near zero.
pub(crate) fn check_additivity(
    sum: f64,
    expected: f64,
    magnitude: f64,
    tolerance: f64,
) -> Result<(), ExplainError> {
    let error = (sum - expected).abs();
    let scale = sum.abs().max(expected.abs()).max(magnitude.abs()).max(1.0);
    if error <= tolerance * scale {
        Ok(())
    } else {
        Err(ExplainError::AdditivityViolation {
            sum,
            expected,
            error,
            tolerance,
        })
    }
}
