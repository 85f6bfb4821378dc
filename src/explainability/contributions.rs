//! Signed per-feature contributions and their ranking.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ExplainError;
use crate::data::DatasetError;
use crate::utils::by_descending_magnitude;

// =============================================================================
// Contribution
// =============================================================================

/// One feature's signed contribution to the log-odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Feature name.
    pub feature: String,
    /// Signed contribution in log-odds units.
    pub value: f64,
}

impl Contribution {
    /// Create a contribution.
    pub fn new(feature: impl Into<String>, value: f64) -> Self {
        Self {
            feature: feature.into(),
            value,
        }
    }

    /// Whether this contribution raised or lowered the risk.
    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::of(self.value)
    }
}

// =============================================================================
// Direction
// =============================================================================

/// Sign of a contribution as rendered for humans.
///
/// A contribution of exactly zero is `Decreased`: only strictly positive
/// contributions count as raising the risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increased,
    Decreased,
}

impl Direction {
    /// Direction of a contribution value. Zero and NaN map to `Decreased`.
    #[inline]
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Self::Increased
        } else {
            Self::Decreased
        }
    }

    /// `"increased"` or `"decreased"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increased => "increased",
            Self::Decreased => "decreased",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `"increased"` when `contribution > 0`, otherwise `"decreased"`.
///
/// ```
/// use riskshap::render_direction;
///
/// assert_eq!(render_direction(0.3), "increased");
/// assert_eq!(render_direction(0.0), "decreased");
/// assert_eq!(render_direction(-0.0), "decreased");
/// ```
#[inline]
pub fn render_direction(contribution: f64) -> &'static str {
    Direction::of(contribution).as_str()
}

// =============================================================================
// ContributionSet
// =============================================================================

/// Contributions ordered by descending absolute value.
///
/// Equal magnitudes keep the order they were supplied in, which every source
/// in this crate makes the model's feature schema order. The set is never
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContributionSet {
    contributions: Vec<Contribution>,
}

impl ContributionSet {
    /// Rank contributions supplied in schema order.
    ///
    /// # Errors
    ///
    /// - [`ExplainError::EmptyContributionSet`] for an empty input
    /// - [`DatasetError::DuplicateFeature`] if a feature appears twice
    pub fn new(mut contributions: Vec<Contribution>) -> Result<Self, ExplainError> {
        if contributions.is_empty() {
            return Err(ExplainError::EmptyContributionSet);
        }
        if let Some(repeated) = first_repeated(&contributions) {
            return Err(DatasetError::DuplicateFeature(repeated).into());
        }
        // sort_by is stable: ties stay in input order
        contributions.sort_by(|a, b| by_descending_magnitude(a.value, b.value));
        Ok(Self { contributions })
    }

    /// Build from `(feature, value)` pairs in schema order.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ExplainError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(feature, value)| Contribution::new(feature, value))
                .collect(),
        )
    }

    /// Ranked contributions.
    #[inline]
    pub fn as_slice(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Iterate in rank order.
    pub fn iter(&self) -> std::slice::Iter<'_, Contribution> {
        self.contributions.iter()
    }

    /// Number of features.
    #[inline]
    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    /// Sum of all contributions, accumulated in rank order.
    pub fn total(&self) -> f64 {
        self.contributions.iter().map(|c| c.value).sum()
    }

    /// Contribution of a named feature.
    pub fn get(&self, feature: &str) -> Option<f64> {
        self.contributions
            .iter()
            .find(|c| c.feature == feature)
            .map(|c| c.value)
    }

    /// The `k` largest contributions (all of them if `k` exceeds the size).
    pub fn top_k(&self, k: usize) -> &[Contribution] {
        &self.contributions[..k.min(self.contributions.len())]
    }

    /// Consume into the ranked vector.
    pub fn into_vec(self) -> Vec<Contribution> {
        self.contributions
    }
}

impl<'a> IntoIterator for &'a ContributionSet {
    type Item = &'a Contribution;
    type IntoIter = std::slice::Iter<'a, Contribution>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn first_repeated(contributions: &[Contribution]) -> Option<String> {
    let mut seen = HashSet::with_capacity(contributions.len());
    contributions
        .iter()
        .find(|c| !seen.insert(c.feature.as_str()))
        .map(|c| c.feature.clone())
}

/// First `k` entries of an already ranked set.
///
/// `k` larger than the set is not an error; the whole set is returned.
#[inline]
pub fn rank_top_k(contributions: &ContributionSet, k: usize) -> &[Contribution] {
    contributions.top_k(k)
}
