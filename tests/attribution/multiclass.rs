//! Multiclass class selection.

use approx::assert_abs_diff_eq;
use ndarray::array;

use riskshap::testing::{random_multiclass_model, synthetic_cohort};
use riskshap::{
    AttributionEngine, ClassSelection, Dataset, ExplainConfig, ExplainError, FeatureSchema,
    FittedModelContext,
};

const CLASSES: [&str; 3] = ["normal", "fixed", "reversible"];

fn model() -> FittedModelContext {
    FittedModelContext::new(
        FeatureSchema::new(["age", "chol"]).unwrap(),
        array![[0.1, 0.0], [0.0, 0.01], [-0.1, 0.0]],
        vec![0.0, 0.0, 1.0],
        CLASSES.iter().map(|c| c.to_string()).collect(),
    )
    .unwrap()
}

fn data() -> Dataset {
    Dataset::new(array![[60.0, 200.0], [10.0, 130.0], [50.0, 150.0]], ["age", "chol"]).unwrap()
}

fn engine(selection: ClassSelection) -> AttributionEngine {
    AttributionEngine::new(ExplainConfig::builder().class_selection(selection).build().unwrap())
}

#[test]
fn positive_class_is_ambiguous() {
    let result = AttributionEngine::default().explain_linear(&model(), &data(), 0);
    assert!(matches!(result, Err(ExplainError::AmbiguousPositiveClass { n_classes: 3 })));
}

#[test]
fn predicted_class_per_row() {
    let engine = engine(ClassSelection::Predicted);
    // row 0 scores: 6.0, 2.0, -5.0 → normal
    let report = engine.explain_linear(&model(), &data(), 0).unwrap();
    assert_eq!(report.class_label(), Some("normal"));
    // row 1 scores: 1.0, 1.3, 0.0 → fixed
    let report = engine.explain_linear(&model(), &data(), 1).unwrap();
    assert_eq!(report.class_label(), Some("fixed"));
}

#[test]
fn fixed_class_by_index_and_label() {
    // means: age 40, chol 160
    let by_index = engine(ClassSelection::Index(1)).explain_linear(&model(), &data(), 0).unwrap();
    let by_label = engine(ClassSelection::Label("fixed".into()))
        .explain_linear(&model(), &data(), 0)
        .unwrap();
    assert_eq!(by_index, by_label);
    assert_eq!(by_index.class_label(), Some("fixed"));
    assert_abs_diff_eq!(by_index.baseline_logit(), 1.6, epsilon = 1e-12);
    assert_abs_diff_eq!(by_index.instance_logit(), 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(by_index.ordered_contributions().get("chol").unwrap(), 0.4, epsilon = 1e-12);
    assert_eq!(by_index.ordered_contributions().get("age"), Some(0.0));
}

#[test]
fn unknown_classes() {
    assert!(matches!(
        engine(ClassSelection::Index(3)).explain_linear(&model(), &data(), 0),
        Err(ExplainError::ClassIndexOutOfRange { index: 3, n_classes: 3 })
    ));
    assert!(matches!(
        engine(ClassSelection::Label("absent".into())).explain_linear(&model(), &data(), 0),
        Err(ExplainError::UnknownClass(label)) if label == "absent"
    ));
}

#[test]
fn predicted_class_cohort_stays_additive() {
    let data = synthetic_cohort(60, 21);
    let model = random_multiclass_model(data.schema(), &CLASSES, 22);
    let engine = engine(ClassSelection::Predicted);

    let matrix = engine.attribute_dataset_linear(&model, &data).unwrap();
    let predicted: Vec<f64> = data
        .rows()
        .map(|x| {
            let class = model.predict_class(&x).unwrap();
            model.class_function(class).unwrap().logit(&x).unwrap()
        })
        .collect();
    assert!(matrix.verify(&predicted, 1e-9));
}
