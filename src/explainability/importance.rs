//! Global feature importance from local attributions.

use std::fmt;

use serde::Serialize;

use super::AttributionMatrix;
use crate::utils::by_descending_magnitude;

/// Mean absolute attribution per feature across a cohort, sorted descending.
///
/// Ties keep schema order.
///
/// # Example
///
/// ```
/// use riskshap::{Attribution, AttributionMatrix, ContributionSet, FeatureSchema, GlobalImportance};
///
/// let schema = FeatureSchema::new(["age", "chol"]).unwrap();
/// let rows = [
///     Attribution { baseline_logit: 0.0, instance_logit: 1.0, contributions: ContributionSet::from_pairs([("age", 2.0), ("chol", -1.0)]).unwrap() },
///     Attribution { baseline_logit: 0.0, instance_logit: 1.0, contributions: ContributionSet::from_pairs([("age", -2.0), ("chol", 3.0)]).unwrap() },
/// ];
/// let matrix = AttributionMatrix::from_attributions(schema, &rows).unwrap();
/// let importance = GlobalImportance::from_matrix(&matrix);
///
/// assert_eq!(importance.top_k(1)[0], ("age".to_string(), 2.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalImportance {
    entries: Vec<(String, f64)>,
}

impl GlobalImportance {
    /// Mean |attribution| per feature of a cohort matrix.
    pub fn from_matrix(matrix: &AttributionMatrix) -> Self {
        let mut entries: Vec<(String, f64)> = matrix
            .schema()
            .iter()
            .map(str::to_string)
            .zip(matrix.mean_abs())
            .collect();
        entries.sort_by(|a, b| by_descending_magnitude(a.1, b.1));
        Self { entries }
    }

    /// `(feature, importance)` in descending order.
    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    /// The `k` most important features.
    pub fn top_k(&self, k: usize) -> &[(String, f64)] {
        &self.entries[..k.min(self.entries.len())]
    }

    /// Importance of a named feature.
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == feature)
            .map(|&(_, value)| value)
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no features.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for GlobalImportance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Global feature importance (mean |attribution|):")?;
        for (feature, value) in &self.entries {
            writeln!(f, "{feature}: {value:.4}")?;
        }
        Ok(())
    }
}
