//! Seed-Finder Tuning
//!
//! This example tunes the seven seed-finder parameters with the generational
//! GA. By default it scores candidates with an in-process surrogate so it
//! runs anywhere; point `SEEDING_PROGRAM` at a real seeding executable to
//! shell out instead.
//!
//! Environment:
//! - `SEEDING_PROGRAM`: seeding executable (optional)
//! - `SEED_CONFIG`: JSON seed, object or array (optional)
//! - `RUN_CONFIG`: JSON run configuration (optional)
//! - `RUST_LOG`: log filter, e.g. `seed_evo=debug`

use rand::rngs::StdRng;
use rand::SeedableRng;
use seed_evo::prelude::*;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Smooth stand-in for the seeding procedure
///
/// Efficiency grows with the search window, fakes with the impact cut and
/// duplicates with the number of seeds per middle space point.
fn surrogate(params: &[ParameterAssignment]) -> EvaluationOutcome {
    let get = |name: &str| {
        params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_f64())
            .unwrap_or(0.0)
    };

    let window = (get("deltaRMax") / 120.0).min(1.0) * (1.0 - get("deltaRMin") / 25.0).max(0.0);
    let pt = (get("maxPt") / 60000.0).min(1.0);
    let scattering = 1.0 - (-get("sigmaScattering") / 4.0).exp();

    let efficiency = 100.0 * (0.85 + 0.15 * window * pt * scattering);
    let fake_rate = 2.0 + 3.0 * get("impactMax") + 100.0 * get("radLengthPerSeed");
    let duplicate_rate = (20.0 + 8.0 * get("maxSeedsPerSpM") + 0.1 * get("deltaRMax")).min(100.0);

    EvaluationOutcome::Success(SeedingFitness::new(efficiency, fake_rate, duplicate_rate))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();

    println!("=== Seed-Finder Tuning ===\n");

    let space = ParameterSpace::seed_finder();

    let seed = match std::env::var("SEED_CONFIG") {
        Ok(path) => SeedConfig::from_path(path)?.genome(&space)?,
        Err(_) => RealVector::new(vec![0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
    };

    let config = match std::env::var("RUN_CONFIG") {
        Ok(path) => RunConfig::from_path(path)?,
        Err(_) => RunConfig {
            max_generations: 25,
            population_size: 16,
            ..RunConfig::default()
        },
    };

    let evaluator: Box<dyn FitnessEvaluator> = match std::env::var("SEEDING_PROGRAM") {
        Ok(program) => {
            let mut evaluator = SubprocessEvaluator::new(program).with_args(["--output-ML", "True"]);
            if let Some(timeout) = config.evaluation_timeout() {
                evaluator = evaluator.with_timeout(timeout);
            }
            Box::new(evaluator)
        }
        Err(_) => Box::new(FnEvaluator::new(surrogate)),
    };

    let mut rng = StdRng::seed_from_u64(42);
    let ga = config.build_ga(space, evaluator)?;
    let result = ga.run(&seed, &mut rng)?;

    println!("{}\n", result.summary());

    println!("Best parameters:");
    for p in result.best_parameters(ga.space()).unwrap_or_default() {
        println!("  {:<18} {}", p.name, p.value);
    }

    println!("\nPer-generation efficiency (min / mean / max):");
    let generations = result.logbook.generations();
    let mins = result.logbook.series(EFFICIENCY_CHANNEL, Statistic::Min).unwrap_or_default();
    let means = result.logbook.series(EFFICIENCY_CHANNEL, Statistic::Mean).unwrap_or_default();
    let maxs = result.logbook.series(EFFICIENCY_CHANNEL, Statistic::Max).unwrap_or_default();
    for (((g, lo), mean), hi) in generations.iter().zip(&mins).zip(&means).zip(&maxs) {
        println!("  gen {:>3}: {:>7.3} / {:>7.3} / {:>7.3}", g, lo, mean, hi);
    }

    println!("\nBest-ever history:");
    for snapshot in &result.hall_of_fame_history {
        if let Some(f) = snapshot.best.fitness {
            println!(
                "  gen {:>3}: eff {:.3}%  fake {:.3}%  dup {:.3}%",
                snapshot.generation, f.efficiency, f.fake_rate, f.duplicate_rate
            );
        }
    }

    Ok(())
}
