//! Common numeric utilities used across the crate.
//!
//! NaN-aware column statistics and the magnitude ordering shared by every
//! ranked output (contributions, global importance).

use std::cmp::Ordering;

// =============================================================================
// Statistical Utilities
// =============================================================================

/// Mean of the non-NaN values, or `None` if there are none.
#[inline]
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Median of the non-NaN values, or `None` if there are none.
///
/// Even-length inputs average the two middle values, matching pandas.
///
/// # Arguments
/// * `values` - The values to summarize
/// * `scratch` - Scratch buffer for sorting (cleared and reused)
pub fn nan_median(values: impl IntoIterator<Item = f64>, scratch: &mut Vec<f64>) -> Option<f64> {
    scratch.clear();
    scratch.extend(values.into_iter().filter(|v| !v.is_nan()));
    let n = scratch.len();
    if n == 0 {
        return None;
    }

    scratch.sort_by(f64::total_cmp);

    let mid = n / 2;
    if n % 2 == 1 {
        Some(scratch[mid])
    } else {
        Some((scratch[mid - 1] + scratch[mid]) / 2.0)
    }
}

/// Population standard deviation of the non-NaN values around `mean`.
#[inline]
pub fn nan_std(values: impl IntoIterator<Item = f64>, mean: f64) -> Option<f64> {
    let (sum_sq, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0f64, 0usize), |(acc, count), v| {
            let d = v - mean;
            (acc + d * d, count + 1)
        });
    (count > 0).then(|| (sum_sq / count as f64).sqrt())
}

// =============================================================================
// Ordering
// =============================================================================

/// Ordering that puts larger magnitudes first.
///
/// Intended for stable sorts: equal magnitudes compare `Equal`, so the
/// incoming (schema) order decides ties.
#[inline]
pub fn by_descending_magnitude(a: f64, b: f64) -> Ordering {
    b.abs().total_cmp(&a.abs())
}
