//! Feature schema definitions.
//!
//! A schema is the ordered list of feature names shared by every instance,
//! baseline and coefficient row. Order matters for display and tie-breaking;
//! compatibility between two schemas only depends on the set of names.

use std::collections::HashMap;

use super::DatasetError;

/// Ordered, unique feature names with a name-to-index lookup.
#[derive(Clone, Debug, Default)]
pub struct FeatureSchema {
    /// Feature names in schema order.
    names: Vec<String>,

    /// Feature name → index mapping.
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Create a schema from feature names.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::DuplicateFeature`] if a name appears twice.
    pub fn new<I, S>(names: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(DatasetError::DuplicateFeature(name.clone()));
            }
        }
        Ok(Self { names, index })
    }

    /// Number of features in the schema.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.names.len()
    }

    /// True when the schema has no features.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Feature names in schema order.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Get the feature name at an index.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Get feature index by name.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Check if the schema contains a feature.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// True when both schemas hold exactly the same names, in any order.
    pub fn same_features(&self, other: &FeatureSchema) -> bool {
        self.n_features() == other.n_features()
            && self.names.iter().all(|name| other.contains(name))
    }

    /// Names in `self` that `other` lacks, and names in `other` that `self` lacks.
    ///
    /// Both lists follow the order of the schema they come from.
    pub fn diff(&self, other: &FeatureSchema) -> (Vec<String>, Vec<String>) {
        let missing = self
            .names
            .iter()
            .filter(|name| !other.contains(name))
            .cloned()
            .collect();
        let unexpected = other
            .names
            .iter()
            .filter(|name| !self.contains(name))
            .cloned()
            .collect();
        (missing, unexpected)
    }

    /// Schema with the given names removed, order preserved.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::UnknownFeature`] for a name not in the schema.
    pub fn without(&self, drop: &[&str]) -> Result<Self, DatasetError> {
        if let Some(unknown) = drop.iter().find(|name| !self.contains(name)) {
            return Err(DatasetError::UnknownFeature((*unknown).to_string()));
        }
        let kept = self
            .names
            .iter()
            .filter(|name| !drop.contains(&name.as_str()))
            .cloned();
        Self::new(kept)
    }

    /// Iterate over feature names in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl PartialEq for FeatureSchema {
    /// Schemas are equal when they list the same names in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for FeatureSchema {}
