//! Oracle-backed explanations through the engine.

use approx::assert_abs_diff_eq;
use ndarray::array;

use riskshap::testing::{
    assert_slice_approx_eq, random_binary_model, synthetic_cohort, FixedOracle, LinearOracle,
    DEFAULT_TOLERANCE,
};
use riskshap::{
    AttributionEngine, AttributionSource, Dataset, ExplainConfig, ExplainError,
    ExternalAttribution, ExternalOracleAttribution, FeatureVector, GlobalImportance,
};

fn data() -> Dataset {
    Dataset::new(array![[40.0, 220.0], [60.0, 180.0]], ["age", "chol"]).unwrap()
}

#[test]
fn precomputed_json_output() {
    let json = r#"{
        "base_value": -14.9,
        "values": { "chol": 4.0, "age": 5.0 }
    }"#;
    let oracle = FixedOracle(ExternalAttribution::from_json(json).unwrap());
    let report = AttributionEngine::default().explain_oracle(&oracle, &data(), 1).unwrap();

    assert_eq!(report.class_label(), None);
    assert_abs_diff_eq!(report.baseline_logit(), -14.9, epsilon = 1e-12);
    assert_abs_diff_eq!(report.instance_logit(), -5.9, epsilon = 1e-12);
    let names: Vec<_> = report.ordered_contributions().iter().map(|c| c.feature.as_str()).collect();
    assert_eq!(names, ["age", "chol"]);
    assert!(report.to_string().starts_with("Baseline prob: 0.000\n"));
}

#[test]
fn oracle_ties_follow_schema_order() {
    let oracle = FixedOracle(ExternalAttribution::new(0.0, [("chol", 1.0), ("age", -1.0)]).unwrap());
    let report = AttributionEngine::default().explain_oracle(&oracle, &data(), 0).unwrap();
    let names: Vec<_> = report.ordered_contributions().iter().map(|c| c.feature.as_str()).collect();
    assert_eq!(names, ["age", "chol"]);
}

#[test]
fn oracle_output_schema_must_match() {
    let oracle = FixedOracle(ExternalAttribution::new(0.0, [("age", 1.0), ("thal", 2.0)]).unwrap());
    let err = AttributionEngine::default().explain_oracle(&oracle, &data(), 0).unwrap_err();
    match err {
        ExplainError::SchemaMismatch { context, missing, unexpected } => {
            assert_eq!(context, "oracle output");
            assert_eq!(missing, ["chol"]);
            assert_eq!(unexpected, ["thal"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn exact_oracle_matches_linear_path() {
    let data = synthetic_cohort(40, 31);
    let model = random_binary_model(data.schema(), 32);
    let engine = AttributionEngine::default();

    let function = model.class_function(1).unwrap();
    let oracle = LinearOracle::new(function, data.column_means().unwrap());

    for row in 0..data.n_samples() {
        let linear = engine.explain_linear(&model, &data, row).unwrap();
        let external = engine.explain_oracle(&oracle, &data, row).unwrap();
        assert_abs_diff_eq!(linear.baseline_logit(), external.baseline_logit(), epsilon = 1e-9);
        assert_abs_diff_eq!(linear.instance_logit(), external.instance_logit(), epsilon = 1e-9);
        for feature in data.schema().iter() {
            assert_abs_diff_eq!(
                linear.ordered_contributions().get(feature).unwrap(),
                external.ordered_contributions().get(feature).unwrap(),
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn strict_reconciliation_rejects_inconsistent_oracle() {
    let raw = ExternalAttribution::new(-14.9, [("age", 5.0), ("chol", 4.0)])
        .unwrap()
        .with_prediction(-4.0);
    let oracle = FixedOracle(raw);

    let strict = AttributionEngine::default();
    assert!(matches!(
        strict.explain_oracle(&oracle, &data(), 0),
        Err(ExplainError::AdditivityViolation { .. })
    ));

    // lenient: logged, and the values still define the instance logit
    let lenient = AttributionEngine::new(ExplainConfig::builder().verify_additivity(false).build().unwrap());
    let report = lenient.explain_oracle(&oracle, &data(), 0).unwrap();
    assert_abs_diff_eq!(report.instance_logit(), -5.9, epsilon = 1e-12);
}

#[test]
fn closures_are_oracles() {
    let oracle = |x: &FeatureVector| -> Result<ExternalAttribution, ExplainError> {
        let age = x.get("age").unwrap_or_default();
        ExternalAttribution::new(0.0, [("age", (age - 50.0) / 10.0), ("chol", 0.0)])
    };
    let engine = AttributionEngine::default();
    let source = engine.oracle_source(&oracle, &data());
    assert_eq!(source.kind(), "oracle");

    let importance = engine.global_importance(&source, &data()).unwrap();
    assert_eq!(importance.entries()[0].0, "age");
    assert_abs_diff_eq!(importance.get("age").unwrap(), 1.0, epsilon = 1e-12);
    assert_eq!(importance.get("chol"), Some(0.0));
}

#[test]
fn global_importance_matches_matrix() {
    let data = synthetic_cohort(30, 41);
    let model = random_binary_model(data.schema(), 42);
    let oracle = LinearOracle::new(model.class_function(1).unwrap(), data.column_means().unwrap());

    let engine = AttributionEngine::default();
    let source: AttributionSource =
        ExternalOracleAttribution::new(&oracle, data.schema().clone()).into();
    let matrix = engine.attribute_dataset(&source, &data).unwrap();
    let importance = engine.global_importance(&source, &data).unwrap();
    assert_eq!(importance, GlobalImportance::from_matrix(&matrix));

    let means = matrix.mean_abs();
    let by_schema: Vec<f64> = data
        .schema()
        .iter()
        .map(|name| importance.get(name).unwrap())
        .collect();
    assert_slice_approx_eq(&by_schema, &means, DEFAULT_TOLERANCE, "mean |attribution|");
    assert!(importance
        .entries()
        .windows(2)
        .all(|w| w[0].1 >= w[1].1));
}
