//! Polymorphic attribution source.

use serde::Serialize;

use super::{check_additivity, ContributionSet, ExplainError, ExternalOracleAttribution, LinearDecomposition};
use crate::data::{FeatureSchema, FeatureVector};

/// One attributed prediction: where the log-odds started, where they ended,
/// and which features moved them.
///
/// Invariant (checked by [`verify`](Self::verify)):
/// `contributions.total() ≈ instance_logit - baseline_logit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    /// Log-odds of the reference patient (or the oracle's base value).
    pub baseline_logit: f64,
    /// Log-odds of the explained patient.
    pub instance_logit: f64,
    /// Ranked contributions.
    pub contributions: ContributionSet,
}

impl Attribution {
    /// Absolute gap between the contribution total and the logit difference.
    pub fn additivity_error(&self) -> f64 {
        (self.contributions.total() - (self.instance_logit - self.baseline_logit)).abs()
    }

    /// Check additivity within a `tolerance` relative to the larger logit.
    pub fn verify(&self, tolerance: f64) -> Result<(), ExplainError> {
        check_additivity(
            self.contributions.total(),
            self.instance_logit - self.baseline_logit,
            self.instance_logit.abs().max(self.baseline_logit.abs()),
            tolerance,
        )
    }
}

/// Where per-feature contributions come from.
///
/// Both variants yield the same [`Attribution`] shape, so everything
/// downstream (ranking, waterfalls, reports, global importance) is shared.
#[derive(Debug, Clone)]
pub enum AttributionSource<'a> {
    /// Closed-form decomposition of a linear decision function.
    Linear(LinearDecomposition),
    /// Values supplied by an external attribution method.
    Oracle(ExternalOracleAttribution<'a>),
}

impl AttributionSource<'_> {
    /// Attribute one patient's prediction.
    pub fn attribute(&self, instance: &FeatureVector) -> Result<Attribution, ExplainError> {
        match self {
            Self::Linear(linear) => linear.attribute(instance),
            Self::Oracle(oracle) => oracle.attribute(instance),
        }
    }

    /// Feature schema the source attributes over.
    pub fn schema(&self) -> &FeatureSchema {
        match self {
            Self::Linear(linear) => linear.function().schema(),
            Self::Oracle(oracle) => oracle.schema(),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::Oracle(_) => "oracle",
        }
    }
}

impl From<LinearDecomposition> for AttributionSource<'_> {
    fn from(source: LinearDecomposition) -> Self {
        Self::Linear(source)
    }
}

impl<'a> From<ExternalOracleAttribution<'a>> for AttributionSource<'a> {
    fn from(source: ExternalOracleAttribution<'a>) -> Self {
        Self::Oracle(source)
    }
}
