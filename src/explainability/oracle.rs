//! External attribution oracles.
//!
//! Some models (tree ensembles, for instance) have exact attribution methods
//! that this crate does not implement. An [`AttributionOracle`] wraps such a
//! method: given a patient it returns a base value plus one signed value per
//! feature, in log-odds units. [`ExternalOracleAttribution`] normalizes that
//! output into the same [`Attribution`] shape the linear path produces.
//!
//! # JSON Format
//!
//! Precomputed oracle output can be loaded with [`ExternalAttribution::from_json`]:
//!
//! ```json
//! {
//!   "base_value": -0.42,
//!   "values": { "age": 0.31, "chol": -0.05 },
//!   "prediction": -0.16
//! }
//! ```
//!
//! `prediction` is optional. When present it is the model's raw output and is
//! reconciled against `base_value + Σ values`.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::{check_additivity, Attribution, Contribution, ContributionSet, ExplainError};
use crate::data::{FeatureSchema, FeatureVector};

// =============================================================================
// ExternalAttribution
// =============================================================================

/// Raw output of an attribution oracle for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalAttribution {
    /// Expected model output over the background data.
    pub base_value: f64,
    /// Signed value per feature.
    #[serde(deserialize_with = "unique_values")]
    pub values: BTreeMap<String, f64>,
    /// The model's raw output for the patient, if the oracle reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<f64>,
}

impl ExternalAttribution {
    /// Create oracle output from a base value and `(feature, value)` pairs.
    ///
    /// # Errors
    ///
    /// [`ExplainError::InvalidOracleOutput`] for a repeated feature or a
    /// non-finite number.
    pub fn new<I, S>(base_value: f64, values: I) -> Result<Self, ExplainError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (name, value) in values {
            let name = name.into();
            if !value.is_finite() {
                return Err(ExplainError::InvalidOracleOutput(format!(
                    "value for '{name}' is not finite"
                )));
            }
            if map.insert(name.clone(), value).is_some() {
                return Err(ExplainError::InvalidOracleOutput(format!(
                    "feature '{name}' reported twice"
                )));
            }
        }
        let attribution = Self {
            base_value,
            values: map,
            prediction: None,
        };
        attribution.validate()?;
        Ok(attribution)
    }

    /// Attach the model's raw output.
    pub fn with_prediction(mut self, prediction: f64) -> Self {
        self.prediction = Some(prediction);
        self
    }

    /// Parse oracle output from JSON.
    pub fn from_json(json: &str) -> Result<Self, ExplainError> {
        let attribution: Self = serde_json::from_str(json)?;
        attribution.validate()?;
        Ok(attribution)
    }

    /// `base_value + Σ values`.
    pub fn output(&self) -> f64 {
        self.base_value + self.values.values().sum::<f64>()
    }

    fn validate(&self) -> Result<(), ExplainError> {
        if !self.base_value.is_finite() {
            return Err(ExplainError::InvalidOracleOutput(
                "base value is not finite".into(),
            ));
        }
        if matches!(self.prediction, Some(p) if !p.is_finite()) {
            return Err(ExplainError::InvalidOracleOutput(
                "prediction is not finite".into(),
            ));
        }
        Ok(())
    }

    /// Normalize into an [`Attribution`] over `schema`.
    ///
    /// Contributions are taken in schema order before ranking, so ties break
    /// the same way as in the linear path. The instance logit is
    /// `base_value + Σ values`.
    ///
    /// # Errors
    ///
    /// [`ExplainError::SchemaMismatch`] if the reported features differ from
    /// the schema; [`ExplainError::EmptyContributionSet`] for an empty schema.
    pub fn into_attribution(self, schema: &FeatureSchema) -> Result<Attribution, ExplainError> {
        if schema.is_empty() {
            return Err(ExplainError::EmptyContributionSet);
        }
        let missing: Vec<String> = schema
            .iter()
            .filter(|name| !self.values.contains_key(*name))
            .map(str::to_string)
            .collect();
        let unexpected: Vec<String> = self
            .values
            .keys()
            .filter(|name| !schema.contains(name))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(ExplainError::SchemaMismatch {
                context: "oracle output",
                missing,
                unexpected,
            });
        }

        let instance_logit = self.output();
        let contributions = schema
            .iter()
            .map(|name| Contribution::new(name, self.values[name]))
            .collect();
        Ok(Attribution {
            baseline_logit: self.base_value,
            instance_logit,
            contributions: ContributionSet::new(contributions)?,
        })
    }
}

/// `values` map that fails on a repeated feature instead of keeping the last.
fn unique_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct UniqueValues;

    impl<'de> Visitor<'de> for UniqueValues {
        type Value = BTreeMap<String, f64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of feature names to values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut values = BTreeMap::new();
            while let Some((name, value)) = access.next_entry::<String, f64>()? {
                if values.contains_key(&name) {
                    return Err(de::Error::custom(format_args!("feature '{name}' reported twice")));
                }
                values.insert(name, value);
            }
            Ok(values)
        }
    }

    deserializer.deserialize_map(UniqueValues)
}

// =============================================================================
// AttributionOracle
// =============================================================================

/// An external method that attributes a patient's prediction directly.
pub trait AttributionOracle {
    /// Base value and per-feature values for `instance`.
    fn explain(&self, instance: &FeatureVector) -> Result<ExternalAttribution, ExplainError>;
}

impl<F> AttributionOracle for F
where
    F: Fn(&FeatureVector) -> Result<ExternalAttribution, ExplainError>,
{
    fn explain(&self, instance: &FeatureVector) -> Result<ExternalAttribution, ExplainError> {
        self(instance)
    }
}

// =============================================================================
// ExternalOracleAttribution
// =============================================================================

/// Attribution source backed by an [`AttributionOracle`].
///
/// When the oracle reports the model's raw prediction, the reported values
/// are reconciled against it. A mismatch is logged as a warning, or fails
/// the explanation in strict mode.
#[derive(Clone)]
pub struct ExternalOracleAttribution<'a> {
    oracle: &'a dyn AttributionOracle,
    schema: FeatureSchema,
    tolerance: f64,
    strict: bool,
}

impl<'a> ExternalOracleAttribution<'a> {
    /// Wrap an oracle that attributes over `schema`.
    pub fn new(oracle: &'a dyn AttributionOracle, schema: FeatureSchema) -> Self {
        Self {
            oracle,
            schema,
            tolerance: 1e-9,
            strict: false,
        }
    }

    /// Set the reconciliation tolerance and whether a mismatch is an error.
    pub fn with_reconciliation(mut self, tolerance: f64, strict: bool) -> Self {
        self.tolerance = tolerance;
        self.strict = strict;
        self
    }

    /// Feature schema the oracle attributes over.
    #[inline]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Attribute one patient's prediction.
    ///
    /// # Errors
    ///
    /// - [`ExplainError::SchemaMismatch`] if the instance or the oracle output
    ///   disagree with the schema
    /// - [`ExplainError::AdditivityViolation`] in strict mode when the values
    ///   do not reconcile with the reported prediction
    /// - whatever the oracle itself returns
    pub fn attribute(&self, instance: &FeatureVector) -> Result<Attribution, ExplainError> {
        ExplainError::check_schema("instance", &self.schema, instance.schema())?;

        let raw = self.oracle.explain(instance)?;
        if let Some(prediction) = raw.prediction {
            if let Err(err) = check_additivity(raw.output(), prediction, raw.base_value, self.tolerance) {
                if self.strict {
                    return Err(err);
                }
                log::warn!("oracle values do not reconcile with its prediction: {err}");
            }
        }
        raw.into_attribution(&self.schema)
    }
}

impl fmt::Debug for ExternalOracleAttribution<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalOracleAttribution")
            .field("schema", &self.schema)
            .field("tolerance", &self.tolerance)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}
