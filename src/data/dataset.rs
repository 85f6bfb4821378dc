//! Dataset container.
//!
//! This module provides [`Dataset`], the tabular patient data every
//! explanation reads its instances and baseline from.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use super::{DatasetError, FeatureSchema, FeatureVector};
use crate::config::BaselineStrategy;
use crate::utils::{nan_mean, nan_median};

/// Tabular patient data with a named feature schema.
///
/// # Storage Layout
///
/// Features are stored in **sample-major** layout: `[n_samples, n_features]`,
/// one row per patient and one column per feature.
///
/// # Example
///
/// ```
/// use riskshap::Dataset;
/// use ndarray::array;
///
/// let features = array![[63.0, 233.0], [37.0, 250.0], [41.0, 204.0]];
/// let ds = Dataset::new(features, ["age", "chol"]).unwrap();
///
/// assert_eq!(ds.n_samples(), 3);
/// assert_eq!(ds.n_features(), 2);
/// assert_eq!(ds.row(1).unwrap().get("age"), Some(37.0));
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature data: `[n_samples, n_features]` (sample-major).
    features: Array2<f64>,

    /// Feature names, one per column.
    schema: FeatureSchema,
}

impl Dataset {
    /// Create a dataset from a sample-major matrix and column names.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::ShapeMismatch`] if the column count differs from the name count
    /// - [`DatasetError::DuplicateFeature`] if a name repeats
    pub fn new<I, S>(features: Array2<f64>, feature_names: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = FeatureSchema::new(feature_names)?;
        Self::with_schema(features, schema)
    }

    /// Create a dataset from a sample-major matrix and an existing schema.
    pub fn with_schema(features: Array2<f64>, schema: FeatureSchema) -> Result<Self, DatasetError> {
        if features.ncols() != schema.n_features() {
            return Err(DatasetError::ShapeMismatch {
                expected: schema.n_features(),
                actual: features.ncols(),
            });
        }
        Ok(Self { features, schema })
    }

    /// Create a dataset from row vectors.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::RaggedRow`] if any row length differs from the
    /// number of feature names.
    pub fn from_rows<I, S>(feature_names: I, rows: &[Vec<f64>]) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = FeatureSchema::new(feature_names)?;
        let n_features = schema.n_features();

        let mut flat = Vec::with_capacity(rows.len() * n_features);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != n_features {
                return Err(DatasetError::RaggedRow {
                    row,
                    expected: n_features,
                    actual: values.len(),
                });
            }
            flat.extend_from_slice(values);
        }

        let features = Array2::from_shape_vec((rows.len(), n_features), flat).map_err(|_| {
            DatasetError::ShapeMismatch {
                expected: rows.len() * n_features,
                actual: rows.iter().map(Vec::len).sum(),
            }
        })?;
        Ok(Self { features, schema })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of samples (patients).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    /// Number of features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// The feature schema.
    #[inline]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Feature names in column order.
    #[inline]
    pub fn feature_names(&self) -> &[String] {
        self.schema.names()
    }

    /// The feature matrix `[n_samples, n_features]`.
    #[inline]
    pub fn feature_matrix(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// All values of one feature.
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>, DatasetError> {
        let index = self
            .schema
            .feature_index(name)
            .ok_or_else(|| DatasetError::UnknownFeature(name.to_string()))?;
        Ok(self.features.column(index))
    }

    /// One patient as a [`FeatureVector`].
    pub fn row(&self, row: usize) -> Result<FeatureVector, DatasetError> {
        if row >= self.n_samples() {
            return Err(DatasetError::RowOutOfRange {
                row,
                n_samples: self.n_samples(),
            });
        }
        let values = self.features.row(row).to_vec();
        Ok(FeatureVector::from_parts(self.schema.clone(), values))
    }

    /// Iterate over all patients in row order.
    pub fn rows(&self) -> impl Iterator<Item = FeatureVector> + '_ {
        self.features
            .axis_iter(Axis(0))
            .map(move |row| FeatureVector::from_parts(self.schema.clone(), row.to_vec()))
    }

    /// Copy of the dataset without the named columns (e.g. the target and ids).
    pub fn drop_columns(&self, names: &[&str]) -> Result<Self, DatasetError> {
        let schema = self.schema.without(names)?;
        let keep: Vec<usize> = schema
            .iter()
            .filter_map(|name| self.schema.feature_index(name))
            .collect();
        let features = self.features.select(Axis(1), &keep);
        Ok(Self { features, schema })
    }

    // =========================================================================
    // Column statistics
    // =========================================================================

    /// Per-feature mean over non-missing values.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::Empty`] if there are no samples
    /// - [`DatasetError::AllMissing`] if a column has only NaN values
    pub fn column_means(&self) -> Result<FeatureVector, DatasetError> {
        self.column_statistic(|column| nan_mean(column.iter().copied()))
    }

    /// Per-feature median over non-missing values.
    pub fn column_medians(&self) -> Result<FeatureVector, DatasetError> {
        let mut scratch = Vec::with_capacity(self.n_samples());
        self.column_statistic(|column| nan_median(column.iter().copied(), &mut scratch))
    }

    /// Reference patient for the given strategy.
    pub fn baseline(&self, strategy: BaselineStrategy) -> Result<FeatureVector, DatasetError> {
        match strategy {
            BaselineStrategy::Mean => self.column_means(),
            BaselineStrategy::Median => self.column_medians(),
        }
    }

    fn column_statistic<F>(&self, mut stat: F) -> Result<FeatureVector, DatasetError>
    where
        F: FnMut(ArrayView1<'_, f64>) -> Option<f64>,
    {
        if self.n_samples() == 0 {
            return Err(DatasetError::Empty);
        }
        let values = self
            .features
            .axis_iter(Axis(1))
            .zip(self.schema.iter())
            .map(|(column, name)| stat(column).ok_or_else(|| DatasetError::AllMissing(name.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        FeatureVector::new(self.schema.clone(), values)
    }

    // =========================================================================
    // Cleaning
    // =========================================================================

    /// Replace NaN cells with their column median.
    ///
    /// Returns the number of cells filled. Columns that are entirely missing
    /// are an error, since there is no median to fill with.
    pub fn fill_missing_with_median(&mut self) -> Result<usize, DatasetError> {
        if !self.features.iter().any(|v| v.is_nan()) {
            return Ok(0);
        }
        let medians = self.column_medians()?;

        let mut filled = 0;
        for (mut column, &median) in self
            .features
            .axis_iter_mut(Axis(1))
            .zip(medians.values())
        {
            for value in column.iter_mut().filter(|v| v.is_nan()) {
                *value = median;
                filled += 1;
            }
        }
        log::debug!("filled {filled} missing cells with column medians");
        Ok(filled)
    }
}
