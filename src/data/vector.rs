//! Named feature vectors.

use super::{DatasetError, FeatureSchema};

/// Ordered mapping from feature name to value.
///
/// Used for patient instances, baselines and coefficient rows alike. Values
/// are stored in the vector's own schema order; two vectors whose schemas
/// hold the same names in different orders are still compatible, and are
/// aligned by name.
///
/// # Example
///
/// ```
/// use riskshap::FeatureVector;
///
/// let patient = FeatureVector::from_pairs([("age", 63.0), ("chol", 233.0)]).unwrap();
/// assert_eq!(patient.get("chol"), Some(233.0));
/// assert_eq!(patient.get("thal"), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Create a vector from a schema and values in schema order.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::ShapeMismatch`] if the lengths differ.
    pub fn new(schema: FeatureSchema, values: Vec<f64>) -> Result<Self, DatasetError> {
        if values.len() != schema.n_features() {
            return Err(DatasetError::ShapeMismatch {
                expected: schema.n_features(),
                actual: values.len(),
            });
        }
        Ok(Self { schema, values })
    }

    /// Create a vector from `(name, value)` pairs; pair order becomes schema order.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::DuplicateFeature`] if a name repeats.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<f64>) = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .unzip();
        let schema = FeatureSchema::new(names)?;
        Ok(Self { schema, values })
    }

    /// Vector from parts whose lengths the caller has already matched.
    pub(crate) fn from_parts(schema: FeatureSchema, values: Vec<f64>) -> Self {
        debug_assert_eq!(schema.n_features(), values.len());
        Self { schema, values }
    }

    /// A vector of zeros over the given schema.
    pub fn zeros(schema: FeatureSchema) -> Self {
        let values = vec![0.0; schema.n_features()];
        Self { schema, values }
    }

    /// The vector's schema.
    #[inline]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Number of features.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the vector has no features.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in schema order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value for a feature name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.feature_index(name).map(|i| self.values[i])
    }

    /// Iterate over `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema.iter().zip(self.values.iter().copied())
    }

    /// Values reordered to follow `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::UnknownFeature`] for the first name in `schema`
    /// that this vector lacks. Extra names in `self` are ignored; callers that
    /// need an exact match check [`FeatureSchema::same_features`] first.
    pub fn aligned_to(&self, schema: &FeatureSchema) -> Result<Vec<f64>, DatasetError> {
        schema
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| DatasetError::UnknownFeature(name.to_string()))
            })
            .collect()
    }

    /// Copy of this vector reordered to follow `schema`.
    pub fn reordered(&self, schema: &FeatureSchema) -> Result<Self, DatasetError> {
        let values = self.aligned_to(schema)?;
        Self::new(schema.clone(), values)
    }

    /// Copy of this vector with one value replaced.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::UnknownFeature`] if `name` is not in the schema.
    pub fn with_value(mut self, name: &str, value: f64) -> Result<Self, DatasetError> {
        let index = self
            .schema
            .feature_index(name)
            .ok_or_else(|| DatasetError::UnknownFeature(name.to_string()))?;
        self.values[index] = value;
        Ok(self)
    }
}
