//! Closed-form attribution for linear models.
//!
//! For an affine decision function the exact additive attribution relative
//! to a reference patient is:
//! `contribution[f] = coefficients[f] * (instance[f] - baseline[f])`
//!
//! Contributions then sum to `logit(instance) - logit(baseline)`.
//!
//! Vectors may list their features in any order; they are aligned by name to
//! the coefficients' schema, which also fixes summation order and ranking
//! tie-breaks.

use super::{Attribution, Contribution, ContributionSet, ExplainError};
use crate::data::FeatureVector;
use crate::model::LinearDecisionFunction;

/// `Σ_f vector[f] * coefficients[f] + intercept`.
///
/// # Errors
///
/// [`ExplainError::SchemaMismatch`] if the names differ,
/// [`ExplainError::EmptyContributionSet`] for an empty schema.
pub fn compute_logit(
    vector: &FeatureVector,
    coefficients: &FeatureVector,
    intercept: f64,
) -> Result<f64, ExplainError> {
    affine("instance", vector, coefficients, intercept)
}

/// Log-odds of the reference patient.
pub fn compute_baseline_logit(
    baseline: &FeatureVector,
    coefficients: &FeatureVector,
    intercept: f64,
) -> Result<f64, ExplainError> {
    affine("baseline", baseline, coefficients, intercept)
}

/// Log-odds of the explained patient.
#[inline]
pub fn compute_instance_logit(
    instance: &FeatureVector,
    coefficients: &FeatureVector,
    intercept: f64,
) -> Result<f64, ExplainError> {
    compute_logit(instance, coefficients, intercept)
}

/// Per-feature contributions `(instance[f] - baseline[f]) * coefficients[f]`,
/// ranked by descending magnitude.
///
/// Pure: the same inputs always produce the same set, and reordering the
/// features of any input changes neither the values nor the ranking.
///
/// # Errors
///
/// [`ExplainError::SchemaMismatch`] if instance, baseline and coefficients do
/// not share identical names; [`ExplainError::EmptyContributionSet`] for an
/// empty schema.
pub fn decompose(
    instance: &FeatureVector,
    baseline: &FeatureVector,
    coefficients: &FeatureVector,
) -> Result<ContributionSet, ExplainError> {
    let x = aligned("instance", instance, coefficients)?;
    let b = aligned("baseline", baseline, coefficients)?;

    let contributions = coefficients
        .iter()
        .zip(x.iter().zip(&b))
        .map(|((name, w), (xi, bi))| Contribution::new(name, (xi - bi) * w))
        .collect();
    ContributionSet::new(contributions)
}

fn affine(
    context: &'static str,
    vector: &FeatureVector,
    coefficients: &FeatureVector,
    intercept: f64,
) -> Result<f64, ExplainError> {
    let values = aligned(context, vector, coefficients)?;
    let dot: f64 = values
        .iter()
        .zip(coefficients.values())
        .map(|(x, w)| x * w)
        .sum();
    Ok(dot + intercept)
}

/// Values of `vector` in the coefficients' schema order.
fn aligned(
    context: &'static str,
    vector: &FeatureVector,
    coefficients: &FeatureVector,
) -> Result<Vec<f64>, ExplainError> {
    if coefficients.is_empty() {
        return Err(ExplainError::EmptyContributionSet);
    }
    ExplainError::check_schema(context, coefficients.schema(), vector.schema())?;
    if vector.schema() == coefficients.schema() {
        return Ok(vector.values().to_vec());
    }
    Ok(vector.aligned_to(coefficients.schema())?)
}

// =============================================================================
// LinearDecomposition
// =============================================================================

/// Attribution source for a linear decision function and a fixed reference
/// patient.
///
/// The baseline logit is computed once at construction.
#[derive(Debug, Clone)]
pub struct LinearDecomposition {
    function: LinearDecisionFunction,
    baseline: FeatureVector,
    baseline_logit: f64,
}

impl LinearDecomposition {
    /// Create a decomposition against `baseline`.
    ///
    /// # Errors
    ///
    /// [`ExplainError::SchemaMismatch`] if the baseline's names differ from
    /// the coefficients'.
    pub fn new(function: LinearDecisionFunction, baseline: FeatureVector) -> Result<Self, ExplainError> {
        let baseline_logit =
            compute_baseline_logit(&baseline, function.coefficients(), function.intercept())?;
        Ok(Self {
            function,
            baseline,
            baseline_logit,
        })
    }

    /// The decision function being explained.
    #[inline]
    pub fn function(&self) -> &LinearDecisionFunction {
        &self.function
    }

    /// The reference patient.
    #[inline]
    pub fn baseline(&self) -> &FeatureVector {
        &self.baseline
    }

    /// Log-odds of the reference patient.
    #[inline]
    pub fn baseline_logit(&self) -> f64 {
        self.baseline_logit
    }

    /// Attribute one patient's log-odds.
    pub fn attribute(&self, instance: &FeatureVector) -> Result<Attribution, ExplainError> {
        let coefficients = self.function.coefficients();
        let instance_logit = compute_instance_logit(instance, coefficients, self.function.intercept())?;
        let contributions = decompose(instance, &self.baseline, coefficients)?;
        log::trace!(
            "linear attribution: baseline {:.6} -> instance {:.6} over {} features",
            self.baseline_logit,
            instance_logit,
            contributions.len()
        );
        Ok(Attribution {
            baseline_logit: self.baseline_logit,
            instance_logit,
            contributions,
        })
    }
}
