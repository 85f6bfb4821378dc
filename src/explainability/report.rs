//! Human-readable attribution reports.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{rank_top_k, Attribution, Contribution, ContributionSet, Waterfall};
use crate::model::sigmoid;

// =============================================================================
// RiskLevel
// =============================================================================

/// Coarse risk band of a predicted probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Below 30%.
    Low,
    /// 30% up to 60%.
    Moderate,
    /// 60% and above.
    High,
}

impl RiskLevel {
    /// Upper bound (exclusive) of [`RiskLevel::Low`].
    pub const LOW_BELOW: f64 = 0.30;
    /// Upper bound (exclusive) of [`RiskLevel::Moderate`].
    pub const MODERATE_BELOW: f64 = 0.60;

    /// Band a probability in `[0, 1]`.
    ///
    /// ```
    /// use riskshap::RiskLevel;
    ///
    /// assert_eq!(RiskLevel::from_probability(0.29), RiskLevel::Low);
    /// assert_eq!(RiskLevel::from_probability(0.30), RiskLevel::Moderate);
    /// assert_eq!(RiskLevel::from_probability(0.60), RiskLevel::High);
    /// ```
    pub fn from_probability(probability: f64) -> Self {
        if probability < Self::LOW_BELOW {
            Self::Low
        } else if probability < Self::MODERATE_BELOW {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// `"low"`, `"moderate"` or `"high"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// AttributionReport
// =============================================================================

/// One explained prediction, ready for printing or charting.
///
/// Immutable once built. Probabilities are the sigmoid of the corresponding
/// log-odds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionReport {
    class_label: Option<String>,
    baseline_logit: f64,
    instance_logit: f64,
    baseline_probability: f64,
    instance_probability: f64,
    risk_level: RiskLevel,
    ordered_contributions: ContributionSet,
    #[serde(skip)]
    display_k: usize,
}

impl AttributionReport {
    /// Build a report from an attribution.
    ///
    /// `display_k` bounds the factors listed by `Display`.
    pub fn new(attribution: Attribution, class_label: Option<String>, display_k: usize) -> Self {
        let baseline_probability = sigmoid(attribution.baseline_logit);
        let instance_probability = sigmoid(attribution.instance_logit);
        Self {
            class_label,
            baseline_logit: attribution.baseline_logit,
            instance_logit: attribution.instance_logit,
            baseline_probability,
            instance_probability,
            risk_level: RiskLevel::from_probability(instance_probability),
            ordered_contributions: attribution.contributions,
            display_k,
        }
    }

    /// Label of the explained class, if known.
    pub fn class_label(&self) -> Option<&str> {
        self.class_label.as_deref()
    }

    /// Log-odds of the reference patient.
    pub fn baseline_logit(&self) -> f64 {
        self.baseline_logit
    }

    /// Log-odds of the explained patient.
    pub fn instance_logit(&self) -> f64 {
        self.instance_logit
    }

    /// `sigmoid(baseline_logit)`.
    pub fn baseline_probability(&self) -> f64 {
        self.baseline_probability
    }

    /// `sigmoid(instance_logit)`.
    pub fn instance_probability(&self) -> f64 {
        self.instance_probability
    }

    /// Risk band of the instance probability.
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    /// Contributions ranked by descending magnitude.
    pub fn ordered_contributions(&self) -> &ContributionSet {
        &self.ordered_contributions
    }

    /// The factors listed by `Display`.
    pub fn top_factors(&self) -> &[Contribution] {
        rank_top_k(&self.ordered_contributions, self.display_k)
    }

    /// Waterfall chart data for this report.
    pub fn waterfall(&self, baseline_label: &str, max_display: usize) -> Waterfall {
        Waterfall::new(baseline_label, &self.to_attribution(), max_display)
    }

    /// The underlying attribution.
    pub fn to_attribution(&self) -> Attribution {
        Attribution {
            baseline_logit: self.baseline_logit,
            instance_logit: self.instance_logit,
            contributions: self.ordered_contributions.clone(),
        }
    }
}

impl fmt::Display for AttributionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self
            .class_label
            .as_deref()
            .map(|label| format!(" for class {label}"))
            .unwrap_or_default();
        writeln!(f, "Baseline prob{class}: {:.3}", self.baseline_probability)?;
        writeln!(f, "Instance prob{class}: {:.3} ({} risk)", self.instance_probability, self.risk_level)?;
        writeln!(f)?;
        writeln!(f, "===== Top Local Factors Influencing Risk =====")?;
        for c in self.top_factors() {
            writeln!(f, " - {}: {} risk (SHAP={:.3})", c.feature, c.direction(), c.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn report(display_k: usize) -> AttributionReport {
        let contributions =
            ContributionSet::from_pairs([("age", 5.0), ("chol", 4.0), ("sex", 0.0)]).unwrap();
        let attribution = Attribution {
            baseline_logit: -14.9,
            instance_logit: -5.9,
            contributions,
        };
        AttributionReport::new(attribution, Some("reversible".into()), display_k)
    }

    #[rstest]
    #[case(0.0, RiskLevel::Low)]
    #[case(0.2999, RiskLevel::Low)]
    #[case(0.3, RiskLevel::Moderate)]
    #[case(0.5999, RiskLevel::Moderate)]
    #[case(0.6, RiskLevel::High)]
    #[case(1.0, RiskLevel::High)]
    fn risk_bands(#[case] p: f64, #[case] expected: RiskLevel) {
        assert_eq!(RiskLevel::from_probability(p), expected);
    }

    #[test]
    fn probabilities_from_logits() {
        let r = report(5);
        assert_relative_eq!(r.baseline_probability(), 3.380742340962473e-7, max_relative = 1e-12);
        assert_relative_eq!(r.instance_probability(), 0.0027319607630110596, max_relative = 1e-12);
        assert_eq!(r.risk_level(), RiskLevel::Low);
        assert_eq!(r.class_label(), Some("reversible"));
    }

    #[test]
    fn display_lists_top_factors() {
        let text = report(2).to_string();
        assert_eq!(
            text,
            "Baseline prob for class reversible: 0.000\n\
             Instance prob for class reversible: 0.003 (low risk)\n\
             \n\
             ===== Top Local Factors Influencing Risk =====\n \
             - age: increased risk (SHAP=5.000)\n \
             - chol: increased risk (SHAP=4.000)\n"
        );
    }

    #[test]
    fn zero_factor_reads_decreased() {
        let text = report(3).to_string();
        assert!(text.contains(" - sex: decreased risk (SHAP=0.000)\n"));
    }

    #[test]
    fn waterfall_ends_at_instance() {
        let w = report(5).waterfall("Baseline (mean)", 10);
        assert_relative_eq!(w.final_logit(), -5.9, max_relative = 1e-12);
    }

    #[test]
    fn serializes_without_display_k() {
        let json = serde_json::to_value(report(5)).unwrap();
        assert_eq!(json["risk_level"], "low");
        assert_eq!(json["ordered_contributions"][0]["feature"], "age");
        assert!(json.get("display_k").is_none());
    }
}
