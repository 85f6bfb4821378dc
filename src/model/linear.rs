//! Linear decision function.

use crate::data::{FeatureSchema, FeatureVector};
use crate::explainability::{compute_logit, ExplainError};

/// Affine log-odds function `logit(x) = x · coefficients + intercept`.
///
/// Coefficients are keyed by feature name; their schema is the model's
/// feature schema and every instance explained against this function must
/// carry exactly the same names.
///
/// # Example
///
/// ```
/// use riskshap::{FeatureVector, LinearDecisionFunction};
///
/// let coefficients = FeatureVector::from_pairs([("age", 0.5), ("chol", -0.2)]).unwrap();
/// let f = LinearDecisionFunction::new(coefficients, 0.1);
///
/// let patient = FeatureVector::from_pairs([("age", 60.0), ("chol", 180.0)]).unwrap();
/// assert!((f.logit(&patient).unwrap() - -5.9).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearDecisionFunction {
    coefficients: FeatureVector,
    intercept: f64,
}

impl LinearDecisionFunction {
    /// Create a decision function from named coefficients and an intercept.
    pub fn new(coefficients: FeatureVector, intercept: f64) -> Self {
        Self { coefficients, intercept }
    }

    /// Named coefficients.
    #[inline]
    pub fn coefficients(&self) -> &FeatureVector {
        &self.coefficients
    }

    /// Intercept (bias).
    #[inline]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// The model's feature schema.
    #[inline]
    pub fn schema(&self) -> &FeatureSchema {
        self.coefficients.schema()
    }

    /// Coefficient for a feature.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.coefficients.get(name)
    }

    /// Log-odds for an instance.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::SchemaMismatch`] if the instance's feature
    /// names differ from the coefficients'.
    pub fn logit(&self, instance: &FeatureVector) -> Result<f64, ExplainError> {
        compute_logit(instance, &self.coefficients, self.intercept)
    }

    /// The decision function of the complementary binary class.
    ///
    /// Log-odds of class 0 are the negated log-odds of class 1.
    pub fn negated(&self) -> Self {
        let values = self.coefficients.values().iter().map(|w| -w).collect();
        Self {
            coefficients: FeatureVector::from_parts(self.schema().clone(), values),
            intercept: -self.intercept,
        }
    }
}
