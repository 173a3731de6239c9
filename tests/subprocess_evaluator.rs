//! Subprocess evaluator against real shell programs
#![cfg(unix)]

use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use seed_evo::prelude::*;

fn shell(script: &str) -> SubprocessEvaluator {
    // `sh -c <script> <$0>` then the parameter flags become $1, $2, ...
    SubprocessEvaluator::new("sh").with_args(["-c", script, "seeding"])
}

fn params() -> Vec<ParameterAssignment> {
    ParameterSpace::seed_finder().assignments(&RealVector::new(vec![
        0.5, 1.0, 1.0, 1.0, 1.0, 3.7, 1.0,
    ]))
}

#[test]
fn parses_tagged_record() {
    let evaluator =
        shell("echo 'loading geometry'; echo 'mlTag,eff,0.981,fake,0.052,dup,0.43'; echo done");
    match evaluator.evaluate(&params()) {
        EvaluationOutcome::Success(fitness) => {
            assert_relative_eq!(fitness.efficiency, 98.1, epsilon = 1e-9);
            assert_relative_eq!(fitness.fake_rate, 5.2, epsilon = 1e-9);
            assert_relative_eq!(fitness.duplicate_rate, 43.0, epsilon = 1e-9);
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[test]
fn passes_parameters_as_flags() {
    // only answers when the flags arrive as expected
    let evaluator = shell(
        r#"[ "$1" = --sf-maxPt ] && [ "$2" = 15000 ] && [ "${12}" = 3 ] && echo "mlTag,e,0.5,f,0.1,d,0.2""#,
    );
    let outcome = evaluator.evaluate(&params());
    assert!(!outcome.is_failure(), "{:?}", outcome);

    let args = evaluator.command_args(&params());
    assert!(args.iter().any(|a| a == "--sf-maxPt"));
    assert!(args.iter().any(|a| a == "15000"));
    // integer parameters are truncated, not rounded
    let idx = args.iter().position(|a| a == "--sf-maxSeedsPerSpM").unwrap();
    assert_eq!(args[idx + 1], "3");
}

#[test]
fn missing_record_is_failure() {
    let evaluator = shell("echo 'no metrics today'");
    assert!(matches!(
        evaluator.evaluate(&params()),
        EvaluationOutcome::Failure(EvaluationFailure::MissingRecord(_))
    ));
}

#[test]
fn crash_without_output_is_failure() {
    let evaluator = shell("exit 3");
    assert!(evaluator.evaluate(&params()).is_failure());
}

#[test]
fn custom_tag_and_prefix() {
    let evaluator = shell("echo \"metrics,x,1.0,y,0.0,z,0.0,$1\"")
        .with_record_tag("metrics")
        .with_argument_prefix("--seed-");
    assert!(evaluator.command_args(&params())[3].starts_with("--seed-"));
    assert_eq!(
        evaluator.evaluate(&params()),
        EvaluationOutcome::Success(SeedingFitness::new(100.0, 0.0, 0.0))
    );
}

#[test]
fn hung_program_times_out() {
    let evaluator = shell("exec sleep 10").with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let outcome = evaluator.evaluate(&params());

    assert!(matches!(
        outcome,
        EvaluationOutcome::Failure(EvaluationFailure::Timeout(_))
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn lingering_background_process_still_times_out() {
    // the shell exits at once but its background job keeps stdout open
    let evaluator = shell("sleep 4 & echo 'mlTag,eff,0.9,fake,0.1,dup,0.2'")
        .with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let outcome = evaluator.evaluate(&params());

    assert!(
        matches!(outcome, EvaluationOutcome::Failure(EvaluationFailure::Timeout(_))),
        "{:?}",
        outcome
    );
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn quick_program_within_timeout_succeeds() {
    let evaluator =
        shell("echo 'mlTag,eff,0.9,fake,0.1,dup,0.2'").with_timeout(Duration::from_secs(5));
    assert!(!evaluator.evaluate(&params()).is_failure());
}

#[test]
fn drives_a_full_run() {
    let evaluator = shell("echo 'mlTag,eff,0.97,fake,0.08,dup,0.5'");
    let config = RunConfig {
        population_size: 4,
        max_generations: 2,
        workers: Some(2),
        ..RunConfig::default()
    };
    let space = ParameterSpace::seed_finder();
    let seed = RealVector::new(vec![0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);

    let ga = config.build_ga(space, evaluator).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let result = ga.run(&seed, &mut rng).unwrap();

    assert_eq!(result.failed_evaluations, 0);
    let best = result.best().and_then(|b| b.fitness).unwrap();
    assert_relative_eq!(best.efficiency, 97.0, epsilon = 1e-9);
}
