//! Explain one patient's risk with a linear model and an oracle.
//!
//! Builds a synthetic heart-disease cohort, fits nothing (the model weights
//! are random), then prints:
//!
//! - the console report for one patient
//! - the waterfall bars that would be plotted
//! - global importance over the cohort
//!
//! Run with:
//! ```bash
//! RUST_LOG=debug cargo run --example explain_patient
//! ```

use riskshap::testing::{random_binary_model, synthetic_cohort, LinearOracle};
use riskshap::{AttributionEngine, BaselineStrategy, ExplainConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut data = synthetic_cohort(303, 42);
    data.fill_missing_with_median()?;
    let model = random_binary_model(data.schema(), 7);

    let config = ExplainConfig::builder()
        .baseline(BaselineStrategy::Median)
        .top_k(5)
        .max_display(8)
        .build()?;
    let engine = AttributionEngine::new(config);

    let patient = 17;
    println!("=== Linear decomposition (patient {patient}) ===\n");
    let report = engine.explain_linear(&model, &data, patient)?;
    println!("{report}");

    println!("=== Waterfall ===\n");
    let waterfall = engine.waterfall(&report);
    println!("{:>20}  {:+.4}", waterfall.baseline_label(), waterfall.baseline_logit());
    for bar in waterfall.bars() {
        println!(
            "{:>20}  {:+.4} -> {:+.4} ({})",
            bar.label, bar.start, bar.end, bar.direction
        );
    }
    println!("{:>20}  {:+.4}\n", "Final", waterfall.final_logit());

    // An exact oracle over the mean patient, standing in for tree SHAP output.
    println!("=== Oracle attribution (patient {patient}) ===\n");
    let oracle = LinearOracle::new(model.class_function(1)?, data.column_means()?);
    let report = engine.explain_oracle(&oracle, &data, patient)?;
    println!("{report}");

    let source = engine.oracle_source(&oracle, &data);
    let importance = engine.global_importance(&source, &data)?;
    println!("{importance}");

    Ok(())
}
