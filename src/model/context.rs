//! Fitted linear classifier and class selection.
//!
//! A fitted logistic regression carries one coefficient row per decision
//! function: a single row for binary models (the log-odds of the second
//! class), one row per class for multiclass models. Which row an explanation
//! uses is always caller-supplied via [`ClassSelection`].

use std::collections::HashSet;

use ndarray::{Array2, ArrayView2};

use super::{LinearDecisionFunction, ModelError};
use crate::data::{FeatureSchema, FeatureVector};
use crate::explainability::ExplainError;

// =============================================================================
// ClassSelection
// =============================================================================

/// Which class's log-odds to explain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClassSelection {
    /// The positive (second) class of a binary model.
    ///
    /// Multiclass models have no positive class; selecting it there is an
    /// error rather than a silent guess.
    #[default]
    Positive,
    /// The class the model predicts for the explained instance.
    Predicted,
    /// A class by position in the model's class list.
    Index(usize),
    /// A class by label.
    Label(String),
}

/// The resolved class and the decision function that scores it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedClass {
    /// Position in the model's class list.
    pub index: usize,
    /// Class label.
    pub label: String,
    /// Log-odds function for this class.
    pub function: LinearDecisionFunction,
}

// =============================================================================
// FittedModelContext
// =============================================================================

/// A fitted linear classifier: coefficients, intercepts and class labels.
///
/// # Layout
///
/// ```text
/// coefficients[[row, feature]] → weight
/// intercept[row]               → bias
/// ```
///
/// Binary models: 1 row, 2 classes, row 0 scores `classes[1]`.
/// Multiclass models: k rows, k classes (k ≥ 3), row i scores `classes[i]`.
///
/// # Example
///
/// ```
/// use riskshap::{ClassSelection, FeatureVector, FittedModelContext};
///
/// let weights = FeatureVector::from_pairs([("age", 0.5), ("chol", -0.2)]).unwrap();
/// let model = FittedModelContext::binary(&weights, 0.1, "normal", "reversible").unwrap();
///
/// let patient = FeatureVector::from_pairs([("age", 60.0), ("chol", 180.0)]).unwrap();
/// let selected = model.select(&ClassSelection::Positive, &patient).unwrap();
/// assert_eq!(selected.label, "reversible");
/// ```
#[derive(Debug, Clone)]
pub struct FittedModelContext {
    schema: FeatureSchema,
    coefficients: Array2<f64>,
    intercept: Vec<f64>,
    classes: Vec<String>,
}

impl FittedModelContext {
    /// Create a model from a coefficient matrix `[n_rows, n_features]`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if shapes are inconsistent, class labels repeat,
    /// or any parameter is not finite.
    pub fn new(
        schema: FeatureSchema,
        coefficients: Array2<f64>,
        intercept: Vec<f64>,
        classes: Vec<String>,
    ) -> Result<Self, ModelError> {
        if coefficients.ncols() != schema.n_features() {
            return Err(ModelError::FeatureCountMismatch {
                expected: schema.n_features(),
                actual: coefficients.ncols(),
            });
        }
        if classes.len() < 2 {
            return Err(ModelError::TooFewClasses(classes.len()));
        }
        let rows = coefficients.nrows();
        let valid_rows = if classes.len() == 2 { rows == 1 } else { rows == classes.len() };
        if !valid_rows {
            return Err(ModelError::ClassCountMismatch {
                rows,
                classes: classes.len(),
            });
        }
        if intercept.len() != rows {
            return Err(ModelError::InterceptCountMismatch {
                expected: rows,
                actual: intercept.len(),
            });
        }

        let mut seen = HashSet::with_capacity(classes.len());
        if let Some(dup) = classes.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(ModelError::DuplicateClass(dup.clone()));
        }

        for (row, weights) in coefficients.rows().into_iter().enumerate() {
            if !intercept[row].is_finite() || weights.iter().any(|w| !w.is_finite()) {
                return Err(ModelError::NonFinite { row });
            }
        }

        Ok(Self {
            schema,
            coefficients,
            intercept,
            classes,
        })
    }

    /// Create a binary model from named coefficients.
    ///
    /// The coefficients score `positive` against `negative`.
    pub fn binary(
        coefficients: &FeatureVector,
        intercept: f64,
        negative: impl Into<String>,
        positive: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let schema = coefficients.schema().clone();
        let matrix = Array2::from_shape_vec((1, schema.n_features()), coefficients.values().to_vec())
            .map_err(|_| ModelError::FeatureCountMismatch {
                expected: schema.n_features(),
                actual: coefficients.len(),
            })?;
        Self::new(schema, matrix, vec![intercept], vec![negative.into(), positive.into()])
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The model's feature schema.
    #[inline]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Class labels.
    #[inline]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of classes.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// True for a two-class model with a single decision row.
    #[inline]
    pub fn is_binary(&self) -> bool {
        self.classes.len() == 2
    }

    /// Coefficient matrix `[n_rows, n_features]`.
    #[inline]
    pub fn coefficients(&self) -> ArrayView2<'_, f64> {
        self.coefficients.view()
    }

    /// Intercepts, one per coefficient row.
    #[inline]
    pub fn intercept(&self) -> &[f64] {
        &self.intercept
    }

    /// The decision function of coefficient row `row`.
    fn row_function(&self, row: usize) -> LinearDecisionFunction {
        let values = self.coefficients.row(row).to_vec();
        LinearDecisionFunction::new(
            FeatureVector::from_parts(self.schema.clone(), values),
            self.intercept[row],
        )
    }

    /// Decision function for class `index`.
    ///
    /// For binary models class 0 is scored by the negated row.
    pub fn class_function(&self, index: usize) -> Result<LinearDecisionFunction, ExplainError> {
        if index >= self.n_classes() {
            return Err(ExplainError::ClassIndexOutOfRange {
                index,
                n_classes: self.n_classes(),
            });
        }
        Ok(match (self.is_binary(), index) {
            (true, 0) => self.row_function(0).negated(),
            (true, _) => self.row_function(0),
            (false, i) => self.row_function(i),
        })
    }

    /// Raw decision scores for an instance, one per coefficient row.
    pub fn decision_scores(&self, instance: &FeatureVector) -> Result<Vec<f64>, ExplainError> {
        (0..self.coefficients.nrows())
            .map(|row| self.row_function(row).logit(instance))
            .collect()
    }

    /// Index of the class the model predicts for an instance.
    ///
    /// Binary: class 1 when the score is positive. Multiclass: the highest
    /// score, first class winning ties.
    pub fn predict_class(&self, instance: &FeatureVector) -> Result<usize, ExplainError> {
        let scores = self.decision_scores(instance)?;
        if self.is_binary() {
            return Ok(usize::from(scores[0] > 0.0));
        }
        let mut best = 0;
        for (i, &score) in scores.iter().enumerate().skip(1) {
            if score > scores[best] {
                best = i;
            }
        }
        Ok(best)
    }

    /// Resolve a [`ClassSelection`] for an instance.
    ///
    /// # Errors
    ///
    /// - [`ExplainError::AmbiguousPositiveClass`] for `Positive` on a multiclass model
    /// - [`ExplainError::ClassIndexOutOfRange`] / [`ExplainError::UnknownClass`]
    /// - [`ExplainError::SchemaMismatch`] when `Predicted` scores an incompatible instance
    pub fn select(
        &self,
        selection: &ClassSelection,
        instance: &FeatureVector,
    ) -> Result<SelectedClass, ExplainError> {
        let index = match selection {
            ClassSelection::Positive if self.is_binary() => 1,
            ClassSelection::Positive => {
                return Err(ExplainError::AmbiguousPositiveClass {
                    n_classes: self.n_classes(),
                })
            }
            ClassSelection::Predicted => self.predict_class(instance)?,
            ClassSelection::Index(i) => *i,
            ClassSelection::Label(label) => self
                .classes
                .iter()
                .position(|c| c == label)
                .ok_or_else(|| ExplainError::UnknownClass(label.clone()))?,
        };

        let function = self.class_function(index)?;
        Ok(SelectedClass {
            index,
            label: self.classes[index].clone(),
            function,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(["age", "chol"]).unwrap()
    }

    fn multiclass() -> FittedModelContext {
        FittedModelContext::new(
            schema(),
            array![[0.1, 0.0], [0.0, 0.01], [-0.1, 0.0]],
            vec![0.0, 0.0, 1.0],
            vec!["normal".into(), "fixed".into(), "reversible".into()],
        )
        .unwrap()
    }

    fn patient(age: f64, chol: f64) -> FeatureVector {
        FeatureVector::from_pairs([("age", age), ("chol", chol)]).unwrap()
    }

    #[test]
    fn shape_validation() {
        let err = FittedModelContext::new(schema(), array![[1.0]], vec![0.0], vec!["a".into(), "b".into()]);
        assert_eq!(err.unwrap_err(), ModelError::FeatureCountMismatch { expected: 2, actual: 1 });

        let err = FittedModelContext::new(schema(), array![[1.0, 2.0]], vec![0.0], vec!["a".into()]);
        assert_eq!(err.unwrap_err(), ModelError::TooFewClasses(1));

        let err = FittedModelContext::new(
            schema(),
            array![[1.0, 2.0], [3.0, 4.0]],
            vec![0.0, 0.0],
            vec!["a".into(), "b".into()],
        );
        assert_eq!(err.unwrap_err(), ModelError::ClassCountMismatch { rows: 2, classes: 2 });

        let err = FittedModelContext::new(schema(), array![[1.0, 2.0]], vec![], vec!["a".into(), "b".into()]);
        assert_eq!(err.unwrap_err(), ModelError::InterceptCountMismatch { expected: 1, actual: 0 });

        let err = FittedModelContext::new(schema(), array![[1.0, 2.0]], vec![0.0], vec!["a".into(), "a".into()]);
        assert_eq!(err.unwrap_err(), ModelError::DuplicateClass("a".into()));

        let err = FittedModelContext::new(
            schema(),
            array![[f64::NAN, 2.0]],
            vec![0.0],
            vec!["a".into(), "b".into()],
        );
        assert_eq!(err.unwrap_err(), ModelError::NonFinite { row: 0 });
    }

    #[test]
    fn binary_positive_and_negative() {
        let weights = patient(0.5, -0.2);
        let model = FittedModelContext::binary(&weights, 0.1, "absent", "present").unwrap();
        let x = patient(60.0, 180.0);

        let pos = model.select(&ClassSelection::Positive, &x).unwrap();
        assert_eq!((pos.index, pos.label.as_str()), (1, "present"));
        assert_abs_diff_eq!(pos.function.logit(&x).unwrap(), -5.9, epsilon = 1e-12);

        let neg = model.select(&ClassSelection::Label("absent".into()), &x).unwrap();
        assert_eq!(neg.index, 0);
        assert_abs_diff_eq!(neg.function.logit(&x).unwrap(), 5.9, epsilon = 1e-12);
    }

    #[test]
    fn binary_predicted_follows_sign() {
        let weights = patient(0.5, -0.2);
        let model = FittedModelContext::binary(&weights, 0.1, "absent", "present").unwrap();
        // logit = -5.9 < 0 → class 0
        let selected = model.select(&ClassSelection::Predicted, &patient(60.0, 180.0)).unwrap();
        assert_eq!(selected.label, "absent");
        // logit = 0.5*100 - 0.2*100 + 0.1 > 0 → class 1
        let selected = model.select(&ClassSelection::Predicted, &patient(100.0, 100.0)).unwrap();
        assert_eq!(selected.label, "present");
    }

    #[test]
    fn multiclass_selection() {
        let model = multiclass();
        let x = patient(60.0, 200.0);
        // scores: 6.0, 2.0, -5.0
        assert_eq!(model.decision_scores(&x).unwrap(), vec![6.0, 2.0, -5.0]);
        assert_eq!(model.predict_class(&x).unwrap(), 0);

        let selected = model.select(&ClassSelection::Predicted, &x).unwrap();
        assert_eq!(selected.label, "normal");

        let selected = model.select(&ClassSelection::Index(2), &x).unwrap();
        assert_eq!(selected.label, "reversible");
        assert_abs_diff_eq!(selected.function.intercept(), 1.0);
    }

    #[test]
    fn multiclass_positive_is_ambiguous() {
        let model = multiclass();
        let result = model.select(&ClassSelection::Positive, &patient(1.0, 1.0));
        assert!(matches!(result, Err(ExplainError::AmbiguousPositiveClass { n_classes: 3 })));
    }

    #[test]
    fn unknown_classes_rejected() {
        let model = multiclass();
        let x = patient(1.0, 1.0);
        assert!(matches!(
            model.select(&ClassSelection::Index(3), &x),
            Err(ExplainError::ClassIndexOutOfRange { index: 3, n_classes: 3 })
        ));
        assert!(matches!(
            model.select(&ClassSelection::Label("thal".into()), &x),
            Err(ExplainError::UnknownClass(_))
        ));
    }
}
