//! Waterfall chart data.
//!
//! A waterfall starts at the baseline log-odds and adds one ranked
//! contribution per bar until it reaches the instance log-odds:
//!
//! ```text
//! steps[0]     = baseline_logit
//! steps[i + 1] = steps[i] + contributions[i]
//! steps[n]     = baseline_logit + Σ contributions  (≈ instance_logit)
//! ```

use std::iter::FusedIterator;

use serde::Serialize;

use super::{Attribution, Contribution, Direction};

/// Label of the closing marker.
pub const FINAL_LABEL: &str = "Final";

// =============================================================================
// WaterfallSteps
// =============================================================================

/// Running cumulative log-odds, `contributions.len() + 1` values long.
///
/// Lazy and cheap to clone; cloning before iterating restarts the sequence.
#[derive(Debug, Clone)]
pub struct WaterfallSteps<'a> {
    next: Option<f64>,
    remaining: std::slice::Iter<'a, Contribution>,
}

/// Cumulative steps from `baseline_logit` through each ordered contribution.
///
/// ```
/// use riskshap::{waterfall_steps, Contribution};
///
/// let contributions = [Contribution::new("age", 5.0), Contribution::new("chol", 4.0)];
/// let steps: Vec<f64> = waterfall_steps(-14.9, &contributions).collect();
/// assert_eq!(steps.len(), 3);
/// assert_eq!(steps[0], -14.9);
/// assert!((steps[2] - -5.9).abs() < 1e-12);
/// ```
pub fn waterfall_steps(baseline_logit: f64, contributions: &[Contribution]) -> WaterfallSteps<'_> {
    WaterfallSteps {
        next: Some(baseline_logit),
        remaining: contributions.iter(),
    }
}

impl Iterator for WaterfallSteps<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let current = self.next?;
        self.next = self.remaining.next().map(|c| current + c.value);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::from(self.next.is_some()) + self.remaining.len();
        (n, Some(n))
    }
}

impl ExactSizeIterator for WaterfallSteps<'_> {}

impl FusedIterator for WaterfallSteps<'_> {}

// =============================================================================
// Waterfall
// =============================================================================

/// One bar of a waterfall chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallBar {
    /// Feature name, or "N other features" for a folded remainder.
    pub label: String,
    /// Cumulative log-odds before this bar.
    pub start: f64,
    /// Cumulative log-odds after this bar.
    pub end: f64,
    /// Whether the bar raises or lowers the risk.
    pub direction: Direction,
}

impl WaterfallBar {
    /// Signed height of the bar.
    #[inline]
    pub fn contribution(&self) -> f64 {
        self.end - self.start
    }

    /// Lower edge, for renderers that draw bars from a bottom coordinate.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.start.min(self.end)
    }
}

/// Chart-ready waterfall: a baseline anchor, ranked bars, and a final marker.
///
/// At most `max_display` bars are kept. When there are more contributions,
/// the largest `max_display - 1` keep their own bar and the rest are summed
/// into one trailing "N other features" bar, so the chart still ends at the
/// instance log-odds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waterfall {
    baseline_label: String,
    baseline_logit: f64,
    final_logit: f64,
    bars: Vec<WaterfallBar>,
}

impl Waterfall {
    /// Lay out an attribution as waterfall bars.
    ///
    /// `max_display` of zero is treated as one.
    pub fn new(baseline_label: impl Into<String>, attribution: &Attribution, max_display: usize) -> Self {
        let ranked = attribution.contributions.as_slice();
        let max_display = max_display.max(1);

        let (shown, folded) = if ranked.len() > max_display {
            ranked.split_at(max_display - 1)
        } else {
            (ranked, &[][..])
        };

        let mut heights: Vec<Contribution> = shown.to_vec();
        if !folded.is_empty() {
            let total = folded.iter().map(|c| c.value).sum();
            heights.push(Contribution::new(format!("{} other features", folded.len()), total));
        }

        let steps: Vec<f64> = waterfall_steps(attribution.baseline_logit, &heights).collect();
        let bars = heights
            .into_iter()
            .zip(steps.windows(2))
            .map(|(c, w)| WaterfallBar {
                direction: c.direction(),
                label: c.feature,
                start: w[0],
                end: w[1],
            })
            .collect();

        Self {
            baseline_label: baseline_label.into(),
            baseline_logit: attribution.baseline_logit,
            final_logit: steps.last().copied().unwrap_or(attribution.baseline_logit),
            bars,
        }
    }

    /// Label of the baseline anchor (e.g. "Baseline (mean)").
    pub fn baseline_label(&self) -> &str {
        &self.baseline_label
    }

    /// Where the chart starts.
    pub fn baseline_logit(&self) -> f64 {
        self.baseline_logit
    }

    /// Where the last bar ends.
    pub fn final_logit(&self) -> f64 {
        self.final_logit
    }

    /// Bars in drawing order, left to right.
    pub fn bars(&self) -> &[WaterfallBar] {
        &self.bars
    }

    /// Axis tick labels: the baseline anchor, each bar, then "Final".
    pub fn labels(&self) -> Vec<&str> {
        std::iter::once(self.baseline_label.as_str())
            .chain(self.bars.iter().map(|b| b.label.as_str()))
            .chain(std::iter::once(FINAL_LABEL))
            .collect()
    }
}
