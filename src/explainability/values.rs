//! Attribution values for a whole cohort.
//!
//! Stores per-patient, per-feature contributions with proper indexing
//! and verification utilities.

use super::{Attribution, ExplainError};
use crate::data::FeatureSchema;

/// Container for attribution values.
///
/// Layout is `[samples × (features + 1)]` where the extra column holds each
/// patient's base value. Feature columns follow the schema order, not rank
/// order.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributionMatrix {
    /// Flat storage: [sample][feature + base]
    values: Vec<f64>,
    n_samples: usize,
    schema: FeatureSchema,
}

impl AttributionMatrix {
    /// Create a matrix initialized to zeros.
    pub fn zeros(n_samples: usize, schema: FeatureSchema) -> Self {
        let values = vec![0.0; n_samples * (schema.n_features() + 1)];
        Self {
            values,
            n_samples,
            schema,
        }
    }

    /// Collect per-patient attributions into a matrix.
    ///
    /// # Errors
    ///
    /// [`ExplainError::SchemaMismatch`] if an attribution names a feature the
    /// schema lacks or omits one it has.
    pub fn from_attributions<'a, I>(schema: FeatureSchema, attributions: I) -> Result<Self, ExplainError>
    where
        I: IntoIterator<Item = &'a Attribution>,
        I::IntoIter: ExactSizeIterator,
    {
        let attributions = attributions.into_iter();
        let mut matrix = Self::zeros(attributions.len(), schema);
        for (sample, attribution) in attributions.enumerate() {
            matrix.set_row(sample, attribution)?;
        }
        Ok(matrix)
    }

    /// Number of patients.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of features (not including the base value).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.schema.n_features()
    }

    /// Feature schema of the columns.
    #[inline]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[inline]
    fn index(&self, sample: usize, feature: usize) -> usize {
        sample * (self.n_features() + 1) + feature
    }

    /// Contribution of `feature` for `sample`.
    #[inline]
    pub fn get(&self, sample: usize, feature: usize) -> f64 {
        self.values[self.index(sample, feature)]
    }

    /// Set the contribution of `feature` for `sample`.
    #[inline]
    pub fn set(&mut self, sample: usize, feature: usize, value: f64) {
        let idx = self.index(sample, feature);
        self.values[idx] = value;
    }

    /// Base value (baseline log-odds) of `sample`.
    ///
    /// Stored at feature index = n_features.
    #[inline]
    pub fn base_value(&self, sample: usize) -> f64 {
        self.get(sample, self.n_features())
    }

    /// Set the base value of `sample`.
    #[inline]
    pub fn set_base_value(&mut self, sample: usize, value: f64) {
        self.set(sample, self.n_features(), value);
    }

    /// Feature contributions of `sample`, excluding the base value.
    pub fn feature_values(&self, sample: usize) -> &[f64] {
        let start = self.index(sample, 0);
        &self.values[start..start + self.n_features()]
    }

    /// Write one patient's attribution into row `sample`.
    pub fn set_row(&mut self, sample: usize, attribution: &Attribution) -> Result<(), ExplainError> {
        let found = FeatureSchema::new(attribution.contributions.iter().map(|c| c.feature.clone()))?;
        ExplainError::check_schema("attribution row", &self.schema, &found)?;
        for contribution in &attribution.contributions {
            if let Some(feature) = self.schema.feature_index(&contribution.feature) {
                self.set(sample, feature, contribution.value);
            }
        }
        self.set_base_value(sample, attribution.baseline_logit);
        Ok(())
    }

    /// Mean absolute contribution per feature, in schema order.
    ///
    /// Empty matrices yield zeros.
    pub fn mean_abs(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_features()];
        for sample in 0..self.n_samples {
            for (sum, value) in sums.iter_mut().zip(self.feature_values(sample)) {
                *sum += value.abs();
            }
        }
        if self.n_samples > 0 {
            let n = self.n_samples as f64;
            sums.iter_mut().for_each(|s| *s /= n);
        }
        sums
    }

    /// Verify that values satisfy the sum property.
    ///
    /// For each sample: `sum(values) + base_value ≈ prediction`.
    ///
    /// Returns `true` if all samples are within tolerance.
    pub fn verify(&self, predictions: &[f64], tolerance: f64) -> bool {
        if predictions.len() != self.n_samples {
            return false;
        }
        predictions.iter().enumerate().all(|(sample, &prediction)| {
            let sum = self.base_value(sample) + self.feature_values(sample).iter().sum::<f64>();
            (sum - prediction).abs() <= tolerance
        })
    }

    /// Raw values slice.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
