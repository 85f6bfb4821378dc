//! Log-odds to probability transform.
//!
//! # Numerical Stability
//!
//! [`sigmoid`] branches on the sign of the logit so `exp` only ever sees a
//! non-positive argument and cannot overflow. NaN inputs propagate.

/// Numerically stable logistic sigmoid: `1 / (1 + exp(-logit))`.
///
/// ```
/// use riskshap::sigmoid;
///
/// assert_eq!(sigmoid(0.0), 0.5);
/// assert_eq!(sigmoid(1000.0), 1.0);
/// assert_eq!(sigmoid(-1000.0), 0.0);
/// ```
#[inline]
pub fn sigmoid(logit: f64) -> f64 {
    if logit >= 0.0 {
        1.0 / (1.0 + (-logit).exp())
    } else {
        let e = logit.exp();
        e / (1.0 + e)
    }
}
