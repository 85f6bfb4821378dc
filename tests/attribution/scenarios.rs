//! End-to-end linear explanations.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::array;
use rstest::rstest;

use riskshap::testing::{random_binary_model, synthetic_cohort};
use riskshap::{
    compute_baseline_logit, compute_instance_logit, decompose, rank_top_k, render_direction,
    sigmoid, waterfall_steps, AttributionEngine, ContributionSet, Dataset, Direction,
    ExplainConfig, ExplainError, FeatureVector, FittedModelContext, RiskLevel,
};

fn coefficients() -> FeatureVector {
    FeatureVector::from_pairs([("age", 0.5), ("chol", -0.2)]).unwrap()
}

fn baseline() -> FeatureVector {
    FeatureVector::from_pairs([("age", 50.0), ("chol", 200.0)]).unwrap()
}

fn instance() -> FeatureVector {
    FeatureVector::from_pairs([("age", 60.0), ("chol", 180.0)]).unwrap()
}

#[test]
fn worked_example() {
    let w = coefficients();
    let logit_baseline = compute_baseline_logit(&baseline(), &w, 0.1).unwrap();
    let logit_instance = compute_instance_logit(&instance(), &w, 0.1).unwrap();
    assert_abs_diff_eq!(logit_baseline, -14.9, epsilon = 1e-12);
    assert_abs_diff_eq!(logit_instance, -5.9, epsilon = 1e-12);

    let set = decompose(&instance(), &baseline(), &w).unwrap();
    let ordered: Vec<_> = set.iter().map(|c| c.feature.as_str()).collect();
    assert_eq!(ordered, ["age", "chol"]);
    assert_abs_diff_eq!(set.get("age").unwrap(), 5.0, epsilon = 1e-12);
    assert_abs_diff_eq!(set.get("chol").unwrap(), 4.0, epsilon = 1e-12);
    assert_abs_diff_eq!(set.total(), 9.0, epsilon = 1e-12);
    assert_abs_diff_eq!(set.total(), logit_instance - logit_baseline, epsilon = 1e-12);

    assert_relative_eq!(sigmoid(logit_baseline), 3.380742340962473e-7, max_relative = 1e-9);
    assert_relative_eq!(sigmoid(logit_instance), 0.0027319607630110596, max_relative = 1e-9);
}

#[test]
fn worked_example_through_engine() {
    // two patients whose mean is the reference patient (50, 200)
    let data = Dataset::new(array![[40.0, 220.0], [60.0, 180.0]], ["age", "chol"]).unwrap();
    let model = FittedModelContext::binary(&coefficients(), 0.1, "normal", "reversible").unwrap();
    let engine = AttributionEngine::default();

    let report = engine.explain_linear(&model, &data, 1).unwrap();
    assert_abs_diff_eq!(report.baseline_logit(), -14.9, epsilon = 1e-9);
    assert_abs_diff_eq!(report.instance_logit(), -5.9, epsilon = 1e-9);
    assert_relative_eq!(report.instance_probability(), sigmoid(-5.9), max_relative = 1e-9);
    assert_eq!(report.risk_level(), RiskLevel::Low);

    let text = report.to_string();
    assert!(text.contains("Baseline prob for class reversible: 0.000"));
    assert!(text.contains("Instance prob for class reversible: 0.003"));
    assert!(text.contains(" - age: increased risk (SHAP=5.000)"));
    assert!(text.contains(" - chol: increased risk (SHAP=4.000)"));

    let waterfall = engine.waterfall(&report);
    assert_eq!(waterfall.labels(), vec!["Baseline (mean)", "age", "chol", "Final"]);
    assert_abs_diff_eq!(waterfall.final_logit(), report.instance_logit(), epsilon = 1e-9);
}

#[test]
fn instance_at_baseline_has_nothing_to_explain() {
    let w = coefficients();
    let set = decompose(&baseline(), &baseline(), &w).unwrap();
    assert!(set.iter().all(|c| c.value == 0.0));
    assert!(set.iter().all(|c| c.direction() == Direction::Decreased));
    let names: Vec<_> = set.iter().map(|c| c.feature.as_str()).collect();
    assert_eq!(names, ["age", "chol"]);
    assert_eq!(
        compute_baseline_logit(&baseline(), &w, 0.1).unwrap(),
        compute_instance_logit(&baseline(), &w, 0.1).unwrap()
    );
}

#[rstest]
#[case::positive(1.0, "increased")]
#[case::negative(-1.0, "decreased")]
#[case::zero(0.0, "decreased")]
#[case::negative_zero(-0.0, "decreased")]
#[case::tiny(f64::MIN_POSITIVE, "increased")]
fn direction_policy(#[case] contribution: f64, #[case] expected: &str) {
    assert_eq!(render_direction(contribution), expected);
}

#[test]
fn unchanged_feature_reads_decreased() {
    let w = FeatureVector::from_pairs([("age", 0.5), ("chol", -0.2), ("sex", 1.3)]).unwrap();
    let b = FeatureVector::from_pairs([("age", 50.0), ("chol", 200.0), ("sex", 1.0)]).unwrap();
    let x = FeatureVector::from_pairs([("age", 60.0), ("chol", 180.0), ("sex", 1.0)]).unwrap();
    let set = decompose(&x, &b, &w).unwrap();
    let sex = set.iter().find(|c| c.feature == "sex").unwrap();
    assert_eq!(sex.value, 0.0);
    assert_eq!(sex.direction(), Direction::Decreased);
    assert_eq!(set.as_slice().last().unwrap().feature, "sex");
}

#[rstest]
#[case(vec![("a", 2.0), ("b", -2.0), ("c", 2.0)], vec!["a", "b", "c"])]
#[case(vec![("c", 2.0), ("b", -2.0), ("a", 2.0)], vec!["c", "b", "a"])]
#[case(vec![("x", 0.0), ("y", 0.0)], vec!["x", "y"])]
#[case(vec![("x", 1.0), ("y", -3.0), ("z", 1.0)], vec!["y", "x", "z"])]
fn ties_break_by_schema_order(#[case] pairs: Vec<(&str, f64)>, #[case] expected: Vec<&str>) {
    let set = ContributionSet::from_pairs(pairs).unwrap();
    let names: Vec<_> = set.iter().map(|c| c.feature.as_str()).collect();
    assert_eq!(names, expected);
}

#[test]
fn tie_break_follows_coefficient_schema() {
    // age and chol contribute exactly 5.0 each
    let w = FeatureVector::from_pairs([("chol", 0.25), ("age", 0.5)]).unwrap();
    let b = FeatureVector::from_pairs([("age", 50.0), ("chol", 200.0)]).unwrap();
    let x = FeatureVector::from_pairs([("age", 60.0), ("chol", 220.0)]).unwrap();
    let set = decompose(&x, &b, &w).unwrap();
    let names: Vec<_> = set.iter().map(|c| c.feature.as_str()).collect();
    assert_eq!(names, ["chol", "age"]);
}

#[test]
fn top_k_beyond_size_returns_everything() {
    let set = decompose(&instance(), &baseline(), &coefficients()).unwrap();
    assert_eq!(rank_top_k(&set, 1).len(), 1);
    assert_eq!(rank_top_k(&set, 100).len(), 2);
}

#[test]
fn schema_mismatch_aborts() {
    let w = coefficients();
    let extra = FeatureVector::from_pairs([("age", 60.0), ("chol", 180.0), ("thalach", 150.0)]).unwrap();
    assert!(matches!(
        decompose(&extra, &baseline(), &w),
        Err(ExplainError::SchemaMismatch { context: "instance", .. })
    ));
    assert!(matches!(
        compute_baseline_logit(&extra, &w, 0.1),
        Err(ExplainError::SchemaMismatch { context: "baseline", .. })
    ));
}

#[test]
fn empty_schema_is_rejected() {
    let empty = FeatureVector::from_pairs(Vec::<(&str, f64)>::new()).unwrap();
    assert!(matches!(
        decompose(&empty, &empty, &empty),
        Err(ExplainError::EmptyContributionSet)
    ));
}

#[test]
fn waterfall_steps_track_report() {
    let set = decompose(&instance(), &baseline(), &coefficients()).unwrap();
    let steps: Vec<f64> = waterfall_steps(-14.9, set.as_slice()).collect();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0], -14.9);
    assert_abs_diff_eq!(steps[1], -9.9, epsilon = 1e-12);
    assert_abs_diff_eq!(steps[2], -5.9, epsilon = 1e-12);
}

#[test]
fn synthetic_cohort_end_to_end() {
    let mut data = synthetic_cohort(120, 11);
    assert_eq!(data.fill_missing_with_median().unwrap(), 0);
    let model = random_binary_model(data.schema(), 12);

    let config = ExplainConfig::builder().top_k(3).max_display(5).build().unwrap();
    let engine = AttributionEngine::new(config);

    for row in [0, 17, 119] {
        let report = engine.explain_linear(&model, &data, row).unwrap();
        let attribution = report.to_attribution();
        assert!(attribution.verify(1e-9).is_ok());
        assert_eq!(report.top_factors().len(), 3);
        assert_eq!(report.ordered_contributions().len(), 12);

        let waterfall = engine.waterfall(&report);
        assert_eq!(waterfall.bars().len(), 5);
        assert_eq!(waterfall.bars()[4].label, "8 other features");
        assert_abs_diff_eq!(waterfall.final_logit(), report.instance_logit(), epsilon = 1e-9);
    }

    let matrix = engine.attribute_dataset_linear(&model, &data).unwrap();
    assert_eq!(matrix.n_samples(), 120);
    let predictions: Vec<f64> = data
        .rows()
        .map(|x| model.class_function(1).unwrap().logit(&x).unwrap())
        .collect();
    assert!(matrix.verify(&predictions, 1e-9));
}

#[test]
fn missing_values_are_imputed_before_explaining() {
    let mut data = Dataset::new(
        array![[40.0, f64::NAN], [60.0, 180.0], [50.0, 200.0], [f64::NAN, 220.0]],
        ["age", "chol"],
    )
    .unwrap();
    assert_eq!(data.fill_missing_with_median().unwrap(), 2);
    assert_eq!(data.feature_matrix()[[0, 1]], 200.0);
    assert_eq!(data.feature_matrix()[[3, 0]], 50.0);

    let model = FittedModelContext::binary(&coefficients(), 0.1, "normal", "reversible").unwrap();
    let report = AttributionEngine::default().explain_linear(&model, &data, 1).unwrap();
    assert!(report.instance_logit().is_finite());
}
