//! Attribution engine.
//!
//! Ties a configuration, a fitted model (or an attribution oracle) and a
//! dataset together. Every call takes its model and data explicitly; the
//! engine itself only holds the [`ExplainConfig`].
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use riskshap::{AttributionEngine, Dataset, ExplainConfig, FeatureVector, FittedModelContext};
//!
//! let data = Dataset::new(array![[40.0, 220.0], [60.0, 180.0]], ["age", "chol"]).unwrap();
//! let weights = FeatureVector::from_pairs([("age", 0.5), ("chol", -0.2)]).unwrap();
//! let model = FittedModelContext::binary(&weights, 0.1, "normal", "reversible").unwrap();
//!
//! let engine = AttributionEngine::new(ExplainConfig::default());
//! let report = engine.explain_linear(&model, &data, 1).unwrap();
//!
//! // baseline is the mean patient (50, 200)
//! assert!((report.baseline_logit() - -14.9).abs() < 1e-9);
//! assert_eq!(report.ordered_contributions().as_slice()[0].feature, "age");
//! ```

use crate::config::ExplainConfig;
use crate::data::{Dataset, FeatureVector, Standardizer};
use crate::explainability::{
    Attribution, AttributionMatrix, AttributionOracle, AttributionReport, AttributionSource,
    ExplainError, ExternalOracleAttribution, GlobalImportance, LinearDecomposition, Waterfall,
};
use crate::model::FittedModelContext;

/// Explains predictions according to an [`ExplainConfig`].
#[derive(Debug, Clone, Default)]
pub struct AttributionEngine {
    config: ExplainConfig,
}

/// Baseline and optional scaler derived once per model and dataset.
struct LinearReference {
    baseline: FeatureVector,
    scaler: Option<Standardizer>,
}

impl LinearReference {
    /// Map a raw patient into the model's input space.
    fn prepare(&self, instance: &FeatureVector) -> Result<FeatureVector, ExplainError> {
        match &self.scaler {
            Some(scaler) => Ok(scaler.transform(instance)?),
            None => Ok(instance.clone()),
        }
    }
}

impl AttributionEngine {
    /// Create an engine.
    pub fn new(config: ExplainConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    #[inline]
    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }

    // =========================================================================
    // Single explanations
    // =========================================================================

    /// Attribute one instance with any source and check additivity.
    pub fn attribute(
        &self,
        source: &AttributionSource<'_>,
        instance: &FeatureVector,
    ) -> Result<Attribution, ExplainError> {
        let attribution = source.attribute(instance)?;
        if self.config.verify_additivity {
            attribution.verify(self.config.tolerance)?;
        }
        Ok(attribution)
    }

    /// Explain one instance with any source.
    ///
    /// `class_label` is only used for display.
    pub fn explain(
        &self,
        source: &AttributionSource<'_>,
        instance: &FeatureVector,
        class_label: Option<&str>,
    ) -> Result<AttributionReport, ExplainError> {
        let attribution = self.attribute(source, instance)?;
        log::debug!(
            "{} attribution: baseline logit {:.4}, instance logit {:.4}, top factor {}",
            source.kind(),
            attribution.baseline_logit,
            attribution.instance_logit,
            attribution.contributions.as_slice()[0].feature
        );
        Ok(AttributionReport::new(
            attribution,
            class_label.map(str::to_string),
            self.config.top_k,
        ))
    }

    /// Explain row `row` of `data` with a fitted linear model.
    ///
    /// The baseline is derived from `data` with the configured strategy; when
    /// `standardize` is set, baseline and instance are standardized with
    /// statistics fitted on `data` before decomposition.
    pub fn explain_linear(
        &self,
        model: &FittedModelContext,
        data: &Dataset,
        row: usize,
    ) -> Result<AttributionReport, ExplainError> {
        let instance = data.row(row)?;
        self.explain_linear_instance(model, data, &instance)
    }

    /// Explain an arbitrary patient against a baseline drawn from `data`.
    ///
    /// The instance must carry exactly the model's features, in any order.
    pub fn explain_linear_instance(
        &self,
        model: &FittedModelContext,
        data: &Dataset,
        instance: &FeatureVector,
    ) -> Result<AttributionReport, ExplainError> {
        ExplainError::check_schema("instance", model.schema(), instance.schema())?;
        let reference = self.linear_reference(model, data)?;
        let (source, label) = self.linear_source(model, &reference, instance)?;
        let x = reference.prepare(instance)?;
        self.explain(&source, &x, Some(&label))
    }

    /// Explain row `row` of `data` with an external attribution oracle.
    pub fn explain_oracle(
        &self,
        oracle: &dyn AttributionOracle,
        data: &Dataset,
        row: usize,
    ) -> Result<AttributionReport, ExplainError> {
        let source = self.oracle_source(oracle, data);
        let instance = data.row(row)?;
        self.explain(&source, &instance, None)
    }

    /// Waterfall chart data for a report, labelled with the baseline strategy.
    pub fn waterfall(&self, report: &AttributionReport) -> Waterfall {
        report.waterfall(self.config.baseline.label(), self.config.max_display)
    }

    // =========================================================================
    // Cohort explanations
    // =========================================================================

    /// Attribute every row of `data` with a single source.
    pub fn attribute_dataset(
        &self,
        source: &AttributionSource<'_>,
        data: &Dataset,
    ) -> Result<AttributionMatrix, ExplainError> {
        let attributions = data
            .rows()
            .map(|instance| self.attribute(source, &instance))
            .collect::<Result<Vec<_>, _>>()?;
        AttributionMatrix::from_attributions(source.schema().clone(), &attributions)
    }

    /// Attribute every row of `data` with a fitted linear model.
    ///
    /// With `ClassSelection::Predicted` each row explains its own predicted
    /// class.
    pub fn attribute_dataset_linear(
        &self,
        model: &FittedModelContext,
        data: &Dataset,
    ) -> Result<AttributionMatrix, ExplainError> {
        let reference = self.linear_reference(model, data)?;
        let attributions = data
            .rows()
            .map(|instance| {
                let (source, _) = self.linear_source(model, &reference, &instance)?;
                self.attribute(&source, &reference.prepare(&instance)?)
            })
            .collect::<Result<Vec<_>, _>>()?;
        AttributionMatrix::from_attributions(model.schema().clone(), &attributions)
    }

    /// Mean absolute attribution per feature over `data`.
    pub fn global_importance(
        &self,
        source: &AttributionSource<'_>,
        data: &Dataset,
    ) -> Result<GlobalImportance, ExplainError> {
        let matrix = self.attribute_dataset(source, data)?;
        let importance = GlobalImportance::from_matrix(&matrix);
        log::debug!(
            "global importance over {} patients: {:?}",
            matrix.n_samples(),
            importance.top_k(3)
        );
        Ok(importance)
    }

    // =========================================================================
    // Sources
    // =========================================================================

    /// Oracle source over the dataset's schema, reconciled with the
    /// configured tolerance.
    pub fn oracle_source<'a>(
        &self,
        oracle: &'a dyn AttributionOracle,
        data: &Dataset,
    ) -> AttributionSource<'a> {
        ExternalOracleAttribution::new(oracle, data.schema().clone())
            .with_reconciliation(self.config.tolerance, self.config.verify_additivity)
            .into()
    }

    fn linear_reference(
        &self,
        model: &FittedModelContext,
        data: &Dataset,
    ) -> Result<LinearReference, ExplainError> {
        ExplainError::check_schema("dataset", model.schema(), data.schema())?;

        let raw_baseline = data.baseline(self.config.baseline)?;
        let reference = if self.config.standardize {
            let scaler = Standardizer::fit(data)?;
            LinearReference {
                baseline: scaler.transform(&raw_baseline)?,
                scaler: Some(scaler),
            }
        } else {
            LinearReference {
                baseline: raw_baseline,
                scaler: None,
            }
        };
        Ok(reference)
    }

    fn linear_source(
        &self,
        model: &FittedModelContext,
        reference: &LinearReference,
        instance: &FeatureVector,
    ) -> Result<(AttributionSource<'static>, String), ExplainError> {
        let x = reference.prepare(instance)?;
        let selected = model.select(&self.config.class_selection, &x)?;
        log::trace!("explaining class '{}' (index {})", selected.label, selected.index);
        let source = LinearDecomposition::new(selected.function, reference.baseline.clone())?;
        Ok((source.into(), selected.label))
    }
}
