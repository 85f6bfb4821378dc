//! riskshap: additive feature attribution for clinical risk classifiers.
//!
//! Decomposes a single patient's predicted log-odds into signed per-feature
//! contributions relative to a reference patient (the baseline), ranks them,
//! and renders them as a console report or waterfall chart data.
//!
//! # Key Types
//!
//! - [`FittedModelContext`] / [`LinearDecisionFunction`] - Fitted linear classifier
//! - [`Dataset`] / [`FeatureVector`] - Patient features with a named schema
//! - [`AttributionSource`] - Linear decomposition or an external attribution oracle
//! - [`AttributionEngine`] - Turns a source and an instance into an [`AttributionReport`]
//! - [`ExplainConfig`] - Engine configuration builder
//!
//! # Example
//!
//! ```
//! use riskshap::{compute_baseline_logit, compute_instance_logit, decompose, FeatureVector};
//!
//! let coefficients = FeatureVector::from_pairs([("age", 0.5), ("chol", -0.2)]).unwrap();
//! let baseline = FeatureVector::from_pairs([("age", 50.0), ("chol", 200.0)]).unwrap();
//! let instance = FeatureVector::from_pairs([("age", 60.0), ("chol", 180.0)]).unwrap();
//!
//! let logit_baseline = compute_baseline_logit(&baseline, &coefficients, 0.1).unwrap();
//! let logit_instance = compute_instance_logit(&instance, &coefficients, 0.1).unwrap();
//! let contributions = decompose(&instance, &baseline, &coefficients).unwrap();
//!
//! assert_eq!(contributions.as_slice()[0].feature, "age");
//! assert!((contributions.total() - (logit_instance - logit_baseline)).abs() < 1e-9);
//! ```

// Re-export approx traits for users who want to compare attributions
pub use approx;

pub mod config;
pub mod data;
pub mod engine;
pub mod explainability;
pub mod model;
pub mod testing;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use config::{BaselineStrategy, ConfigError, ExplainConfig};
pub use data::{Dataset, DatasetError, FeatureSchema, FeatureVector, Standardizer};
pub use engine::AttributionEngine;
pub use explainability::{
    compute_baseline_logit, compute_instance_logit, decompose, rank_top_k, render_direction,
    waterfall_steps, Attribution, AttributionMatrix, AttributionOracle, AttributionReport,
    AttributionSource, Contribution, ContributionSet, Direction, ExplainError,
    ExternalAttribution, ExternalOracleAttribution, GlobalImportance, LinearDecomposition,
    RiskLevel, Waterfall, WaterfallBar, WaterfallSteps,
};
pub use model::{
    sigmoid, ClassSelection, FittedModelContext, LinearDecisionFunction, ModelError,
    SelectedClass,
};
