//! Patient feature data with a named schema.
//!
//! # Overview
//!
//! - [`FeatureSchema`]: ordered, unique feature names shared by all instances
//! - [`FeatureVector`]: one patient (or a baseline, or a coefficient row) keyed by name
//! - [`Dataset`]: sample-major feature matrix `[n_samples, n_features]`
//! - [`Standardizer`]: per-feature centering and scaling
//!
//! # Missing Values
//!
//! Missing values are represented as `f64::NAN`. Column statistics skip them,
//! and [`Dataset::fill_missing_with_median`] replaces them before explanation.

mod dataset;
mod error;
mod scaler;
mod schema;
mod vector;

pub use dataset::Dataset;
pub use error::DatasetError;
pub use scaler::Standardizer;
pub use schema::FeatureSchema;
pub use vector::FeatureVector;
