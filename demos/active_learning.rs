//! Active Learning on a Benchmark Function
//!
//! This example runs batch active learning against the Rosenbrock function,
//! stepping the loop one iteration at a time and saving the final result.
//!
//! Set `SYMBAL_LOG=debug` to see per-batch selections.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use symbal::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env("SYMBAL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== Active Learning: Rosenbrock ===\n");

    let mut rng = StdRng::seed_from_u64(42);

    let problem = TestFunction::builder()
        .target(Rosenbrock::new(2))
        .initial_points(20)
        .candidate_points(200)
        .test_points(100)
        .seed(7)
        .build()?;

    let acquisition = AcquisitionWeights::new()
        .with("uncertainty", 1.0)
        .with("distance", 0.5)
        .with("know_grad", 0.5);

    let mut al = ActiveLearning::builder()
        .provider(problem)
        .surrogate(RidgeEnsemble::default().with_artifact("rosenbrock.csv"))
        .selector(DiversitySelector::new())
        .config(
            ActiveLearningConfig::default()
                .with_iterations(8)
                .with_batch_size(10)
                .with_acquisition(acquisition)
                .with_units(vec!["m".to_string(), "m".to_string()], "J"),
        )
        .build()?;

    let result = loop {
        match al.step(&mut rng)? {
            StepResult::Iteration {
                iteration,
                selected,
                rolled_back,
            } => {
                let metrics = al.metrics().last();
                println!(
                    "Iteration {:2}: labeled {:3}, held-out {}{}",
                    iteration,
                    al.labeled().len(),
                    metrics.map(|m| m.held_out.to_string()).unwrap_or_default(),
                    if rolled_back { " (rolled back)" } else { "" }
                );
                println!("  selected: {:?}", selected.iter().map(|id| id.0).collect::<Vec<_>>());
            }
            StepResult::Complete(result) => break *result,
        }
    };

    println!("\n{}", result.metrics.summary());
    println!("Artifact: {}", al.surrogate().artifact());

    let path = PathBuf::from("/tmp/symbal_result.json");
    result.save(&path)?;
    println!("Result saved to {}", path.display());

    Ok(())
}
