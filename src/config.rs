//! Explanation configuration with builder pattern.
//!
//! [`ExplainConfig`] collects everything an [`AttributionEngine`](crate::AttributionEngine)
//! needs besides the model and the data: how to pick the reference patient,
//! which class to explain, how many factors to show, and how strictly to
//! check additivity. It uses the `bon` crate for builder generation with
//! validation at build time.
//!
//! # Example
//!
//! ```
//! use riskshap::{BaselineStrategy, ClassSelection, ExplainConfig};
//!
//! // All defaults
//! let config = ExplainConfig::builder().build().unwrap();
//! assert_eq!(config.top_k, 5);
//!
//! // Explain the predicted class against the median patient
//! let config = ExplainConfig::builder()
//!     .baseline(BaselineStrategy::Median)
//!     .class_selection(ClassSelection::Predicted)
//!     .standardize(true)
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::model::ClassSelection;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `top_k` must be at least 1.
    InvalidTopK,
    /// `max_display` must be at least 1.
    InvalidMaxDisplay,
    /// Additivity tolerance must be positive and finite.
    InvalidTolerance(f64),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTopK => write!(f, "top_k must be at least 1"),
            Self::InvalidMaxDisplay => write!(f, "max_display must be at least 1"),
            Self::InvalidTolerance(v) => {
                write!(f, "tolerance must be positive and finite, got {}", v)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// BaselineStrategy
// =============================================================================

/// How the reference patient is derived from the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BaselineStrategy {
    /// Column-wise mean (the "mean patient").
    #[default]
    Mean,
    /// Column-wise median.
    Median,
}

impl BaselineStrategy {
    /// Label used for the first waterfall bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mean => "Baseline (mean)",
            Self::Median => "Baseline (median)",
        }
    }
}

// =============================================================================
// ExplainConfig
// =============================================================================

/// Configuration for explaining predictions.
///
/// # Structure
///
/// - **Reference**: `baseline` and `standardize` decide the space contributions live in
/// - **Class**: `class_selection` decides which decision row is explained
/// - **Display**: `top_k` and `max_display` bound the rendered output
/// - **Checks**: `tolerance` and `verify_additivity`
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ExplainConfig {
    // === Reference ===
    /// Reference patient derivation. Default: column means.
    #[builder(default)]
    pub baseline: BaselineStrategy,

    /// Explain in standardized feature space (zero mean, unit variance),
    /// for models fit on standardized inputs. Default: false.
    #[builder(default = false)]
    pub standardize: bool,

    // === Class ===
    /// Which class's log-odds to explain. Default: the positive class of a
    /// binary model.
    #[builder(default)]
    pub class_selection: ClassSelection,

    // === Display ===
    /// Number of local factors listed in the console report. Default: 5.
    #[builder(default = 5)]
    pub top_k: usize,

    /// Number of waterfall bars before the remainder is folded into a single
    /// "other features" bar. Default: 10.
    #[builder(default = 10)]
    pub max_display: usize,

    // === Checks ===
    /// Relative tolerance for the additivity check. Default: 1e-9.
    #[builder(default = 1e-9)]
    pub tolerance: f64,

    /// Fail an explanation whose contributions do not sum to the logit
    /// difference. Default: true.
    #[builder(default = true)]
    pub verify_additivity: bool,
}

/// Custom finishing function that validates the config.
impl<S: explain_config_builder::IsComplete> ExplainConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid:
    /// - `top_k == 0`
    /// - `max_display == 0`
    /// - `tolerance <= 0` or not finite
    pub fn build(self) -> Result<ExplainConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ExplainConfig {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidTopK);
        }
        if self.max_display == 0 {
            return Err(ConfigError::InvalidMaxDisplay);
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

// =============================================================================
// Tests
// =============================================================================
