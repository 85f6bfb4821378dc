//! Testing utilities for riskshap.
//!
//! Seeded synthetic cohorts, random models and oracle test doubles that can
//! be used in unit tests, integration tests, benches and demos.
//!
//! # Usage
//!
//! ```
//! use riskshap::testing::{random_binary_model, synthetic_cohort};
//!
//! let data = synthetic_cohort(50, 42);
//! let model = random_binary_model(data.schema(), 7);
//! assert_eq!(data.n_features(), model.schema().n_features());
//! ```

use ndarray::Array2;
use rand::prelude::*;

use crate::data::{Dataset, FeatureSchema, FeatureVector};
use crate::explainability::{
    compute_baseline_logit, AttributionOracle, ExplainError, ExternalAttribution,
};
use crate::model::{FittedModelContext, LinearDecisionFunction};

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for attribution comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Heart-disease cohort features with plausible `[min, max]` ranges.
///
/// The diagnostic target ("thal") is not a feature.
pub const HEART_FEATURES: [(&str, f64, f64); 12] = [
    ("age", 29.0, 77.0),
    ("sex", 0.0, 1.0),
    ("cp", 0.0, 3.0),
    ("trestbps", 94.0, 200.0),
    ("chol", 126.0, 564.0),
    ("fbs", 0.0, 1.0),
    ("restecg", 0.0, 2.0),
    ("thalach", 71.0, 202.0),
    ("exang", 0.0, 1.0),
    ("oldpeak", 0.0, 6.2),
    ("slope", 0.0, 2.0),
    ("ca", 0.0, 4.0),
];

// =============================================================================
// Synthetic data
// =============================================================================

/// A synthetic heart-disease cohort of `rows` patients.
///
/// Values are uniform within each feature's range; categorical features are
/// rounded to whole numbers.
pub fn synthetic_cohort(rows: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let cols = HEART_FEATURES.len();
    let features = Array2::from_shape_fn((rows, cols), |(_, c)| {
        let (_, min, max) = HEART_FEATURES[c];
        let value = min + rng.r#gen::<f64>() * (max - min);
        if max - min <= 4.0 {
            value.round()
        } else {
            value
        }
    });
    let names = HEART_FEATURES.iter().map(|&(name, _, _)| name);
    Dataset::new(features, names).expect("feature names are unique")
}

/// A random patient over `schema`, values uniform in `[min, max]`.
pub fn random_vector(schema: &FeatureSchema, seed: u64, min: f64, max: f64) -> FeatureVector {
    assert!(max >= min);
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..schema.n_features())
        .map(|_| min + rng.r#gen::<f64>() * (max - min))
        .collect();
    FeatureVector::new(schema.clone(), values).expect("length matches schema")
}

/// A binary logistic model with small random weights over `schema`.
pub fn random_binary_model(schema: &FeatureSchema, seed: u64) -> FittedModelContext {
    let mut rng = StdRng::seed_from_u64(seed);
    let weights: Vec<f64> = (0..schema.n_features())
        .map(|_| rng.r#gen::<f64>() * 0.2 - 0.1)
        .collect();
    let intercept = rng.r#gen::<f64>() - 0.5;
    let coefficients = Array2::from_shape_vec((1, schema.n_features()), weights)
        .expect("one row of n_features weights");
    FittedModelContext::new(
        schema.clone(),
        coefficients,
        vec![intercept],
        vec!["normal".into(), "reversible".into()],
    )
    .expect("random binary model is valid")
}

/// A multiclass logistic model with one random row per class.
pub fn random_multiclass_model(schema: &FeatureSchema, classes: &[&str], seed: u64) -> FittedModelContext {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = classes.len();
    let coefficients = Array2::from_shape_fn((n, schema.n_features()), |_| rng.r#gen::<f64>() * 0.2 - 0.1);
    let intercept = (0..n).map(|_| rng.r#gen::<f64>() - 0.5).collect();
    FittedModelContext::new(
        schema.clone(),
        coefficients,
        intercept,
        classes.iter().map(|c| c.to_string()).collect(),
    )
    .expect("random multiclass model is valid")
}

// =============================================================================
// Oracle test doubles
// =============================================================================

/// An oracle that returns the same output for every patient.
#[derive(Debug, Clone)]
pub struct FixedOracle(pub ExternalAttribution);

impl AttributionOracle for FixedOracle {
    fn explain(&self, _instance: &FeatureVector) -> Result<ExternalAttribution, ExplainError> {
        Ok(self.0.clone())
    }
}

/// An exact oracle for a linear function, reporting its own prediction.
///
/// Stands in for an external exact-attribution method: for a linear model
/// the exact attribution against a fixed background mean is the linear
/// decomposition.
#[derive(Debug, Clone)]
pub struct LinearOracle {
    function: LinearDecisionFunction,
    background: FeatureVector,
}

impl LinearOracle {
    /// Oracle for `function` with `background` as the expected patient.
    pub fn new(function: LinearDecisionFunction, background: FeatureVector) -> Self {
        Self { function, background }
    }
}

impl AttributionOracle for LinearOracle {
    fn explain(&self, instance: &FeatureVector) -> Result<ExternalAttribution, ExplainError> {
        let coefficients = self.function.coefficients();
        let base = compute_baseline_logit(&self.background, coefficients, self.function.intercept())?;
        let x = instance.aligned_to(coefficients.schema())?;
        let b = self.background.aligned_to(coefficients.schema())?;
        let values = coefficients
            .iter()
            .zip(x.iter().zip(&b))
            .map(|((name, w), (xi, bi))| (name.to_string(), w * (xi - bi)))
            .collect::<Vec<_>>();
        let prediction = self.function.logit(instance)?;
        Ok(ExternalAttribution::new(base, values)?.with_prediction(prediction))
    }
}

// =============================================================================
// Assertions
// =============================================================================

/// Assert that two slices are approximately equal.
///
/// # Panics
///
/// Panics if lengths differ or any element differs by more than tolerance.
pub fn assert_slice_approx_eq(actual: &[f64], expected: &[f64], tolerance: f64, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        assert!(
            diff <= tolerance,
            "{context}[{i}]: {a} ≠ {e} (diff={diff}, tolerance={tolerance})"
        );
    }
}
