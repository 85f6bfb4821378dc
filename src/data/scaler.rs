//! Per-feature standardization.
//!
//! Models fit on standardized inputs have coefficients in "per standard
//! deviation" units, so their explanations must be computed in the same
//! space: both the instance and the baseline are transformed before
//! decomposition.

use super::{Dataset, DatasetError, FeatureSchema, FeatureVector};
use crate::utils::{nan_mean, nan_std};

/// Centers each feature on its mean and scales it to unit variance.
///
/// Uses the population standard deviation. Features with zero variance keep
/// a scale of 1 so they map to 0 rather than NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    schema: FeatureSchema,
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl Standardizer {
    /// Fit means and scales on a dataset.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::Empty`] if the dataset has no samples
    /// - [`DatasetError::AllMissing`] if a column has no non-missing values
    pub fn fit(data: &Dataset) -> Result<Self, DatasetError> {
        let means = data.column_means()?;
        let matrix = data.feature_matrix();

        let scales = means
            .values()
            .iter()
            .enumerate()
            .map(|(j, &mean)| {
                let std = nan_std(matrix.column(j).iter().copied(), mean).unwrap_or(0.0);
                if std > 0.0 { std } else { 1.0 }
            })
            .collect();

        Ok(Self {
            schema: data.schema().clone(),
            means: means.values().to_vec(),
            scales,
        })
    }

    /// Create a standardizer from known means and scales, in schema order.
    pub fn from_parts(
        schema: FeatureSchema,
        means: Vec<f64>,
        scales: Vec<f64>,
    ) -> Result<Self, DatasetError> {
        for len in [means.len(), scales.len()] {
            if len != schema.n_features() {
                return Err(DatasetError::ShapeMismatch {
                    expected: schema.n_features(),
                    actual: len,
                });
            }
        }
        let scales = scales
            .into_iter()
            .map(|s| if s > 0.0 && s.is_finite() { s } else { 1.0 })
            .collect();
        Ok(Self { schema, means, scales })
    }

    /// Schema the standardizer was fit on.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Fitted means, in schema order.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Fitted scales, in schema order.
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Standardize one vector. The result follows the fitted schema order.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::UnknownFeature`] if the vector lacks a fitted feature.
    pub fn transform(&self, vector: &FeatureVector) -> Result<FeatureVector, DatasetError> {
        let values = vector
            .aligned_to(&self.schema)?
            .into_iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect();
        FeatureVector::new(self.schema.clone(), values)
    }

    /// Standardize every row of a dataset with the same schema.
    pub fn transform_dataset(&self, data: &Dataset) -> Result<Dataset, DatasetError> {
        if !data.schema().same_features(&self.schema) {
            let (missing, _) = self.schema.diff(data.schema());
            let name = missing.into_iter().next().unwrap_or_default();
            return Err(DatasetError::UnknownFeature(name));
        }
        let mut features = data.feature_matrix().to_owned();
        for (j, name) in data.schema().iter().enumerate() {
            let k = self
                .schema
                .feature_index(name)
                .ok_or_else(|| DatasetError::UnknownFeature(name.to_string()))?;
            let (mean, scale) = (self.means[k], self.scales[k]);
            features.column_mut(j).mapv_inplace(|x| (x - mean) / scale);
        }
        Dataset::with_schema(features, data.schema().clone())
    }
}
