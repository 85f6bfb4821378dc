//! Fitted model types.
//!
//! - [`LinearDecisionFunction`]: one affine log-odds function over a named schema
//! - [`FittedModelContext`]: a fitted (possibly multiclass) linear classifier
//! - [`ClassSelection`]: caller-supplied choice of which class to explain
//! - [`sigmoid`]: numerically stable log-odds to probability conversion

mod context;
mod error;
mod linear;
mod transform;

pub use context::{ClassSelection, FittedModelContext, SelectedClass};
pub use error::ModelError;
pub use linear::LinearDecisionFunction;
pub use transform::sigmoid;
