//! Fitness evaluation interface
//!
//! The seeding procedure is an opaque black box. An evaluator takes one
//! candidate, expressed as named parameters in actual units, and reports a
//! typed outcome. Evaluators must be safe to call from many worker threads at
//! once and must not keep state between calls.

use std::time::Duration;

use thiserror::Error;

use crate::fitness::traits::SeedingFitness;
use crate::genome::parameter_space::ParameterAssignment;

/// Why an evaluation produced no fitness
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationFailure {
    /// The external procedure could not be started
    #[error("failed to start evaluator: {0}")]
    Spawn(String),

    /// The external procedure did not finish in time
    #[error("evaluation timed out after {0:?}")]
    Timeout(Duration),

    /// No output line carried the record tag
    #[error("no output record tagged {0:?}")]
    MissingRecord(String),

    /// The tagged record had the wrong shape
    #[error("malformed output record: {0}")]
    MalformedRecord(String),

    /// Evaluator-specific failure
    #[error("{0}")]
    Other(String),
}

/// Result of evaluating one candidate
#[derive(Clone, Debug, PartialEq)]
pub enum EvaluationOutcome {
    /// Evaluation succeeded with the given fitness (percentages)
    Success(SeedingFitness),
    /// Evaluation failed; the candidate gets a NaN fitness
    Failure(EvaluationFailure),
}

impl EvaluationOutcome {
    /// Fitness to attach to the individual; failures map to NaN
    pub fn into_fitness(self) -> SeedingFitness {
        match self {
            EvaluationOutcome::Success(fitness) => fitness,
            EvaluationOutcome::Failure(_) => SeedingFitness::failed(),
        }
    }

    /// True for `Failure`
    pub fn is_failure(&self) -> bool {
        matches!(self, EvaluationOutcome::Failure(_))
    }
}

impl From<Result<SeedingFitness, EvaluationFailure>> for EvaluationOutcome {
    fn from(result: Result<SeedingFitness, EvaluationFailure>) -> Self {
        match result {
            Ok(fitness) => EvaluationOutcome::Success(fitness),
            Err(failure) => EvaluationOutcome::Failure(failure),
        }
    }
}

/// Fitness evaluation trait
///
/// Defines how one candidate parameter set is scored.
pub trait FitnessEvaluator: Send + Sync {
    /// Evaluate one candidate given its named actual-unit parameters
    fn evaluate(&self, parameters: &[ParameterAssignment]) -> EvaluationOutcome;
}

impl<E: FitnessEvaluator + ?Sized> FitnessEvaluator for &E {
    fn evaluate(&self, parameters: &[ParameterAssignment]) -> EvaluationOutcome {
        (**self).evaluate(parameters)
    }
}

impl<E: FitnessEvaluator + ?Sized> FitnessEvaluator for Box<E> {
    fn evaluate(&self, parameters: &[ParameterAssignment]) -> EvaluationOutcome {
        (**self).evaluate(parameters)
    }
}

/// A simple function wrapper for fitness evaluation
pub struct FnEvaluator<F>
where
    F: Fn(&[ParameterAssignment]) -> EvaluationOutcome,
{
    f: F,
}

impl<F> FnEvaluator<F>
where
    F: Fn(&[ParameterAssignment]) -> EvaluationOutcome,
{
    /// Create a new function-based evaluator
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> FitnessEvaluator for FnEvaluator<F>
where
    F: Fn(&[ParameterAssignment]) -> EvaluationOutcome + Send + Sync,
{
    fn evaluate(&self, parameters: &[ParameterAssignment]) -> EvaluationOutcome {
        (self.f)(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::parameter_space::ActualValue;

    fn assignment(name: &str, value: f64) -> ParameterAssignment {
        ParameterAssignment {
            name: name.to_string(),
            value: ActualValue::Real(value),
        }
    }

    #[test]
    fn test_failure_maps_to_nan() {
        let outcome = EvaluationOutcome::Failure(EvaluationFailure::MissingRecord(
            "mlTag".to_string(),
        ));
        assert!(outcome.is_failure());
        assert!(outcome.into_fitness().is_failed());
    }

    #[test]
    fn test_success_keeps_fitness() {
        let fitness = SeedingFitness::new(95.0, 12.0, 40.0);
        let outcome = EvaluationOutcome::Success(fitness);
        assert!(!outcome.is_failure());
        assert_eq!(outcome.into_fitness(), fitness);
    }

    #[test]
    fn test_fn_evaluator() {
        let evaluator = FnEvaluator::new(|params: &[ParameterAssignment]| {
            let eff = params[0].value.as_f64();
            EvaluationOutcome::Success(SeedingFitness::new(eff, 0.0, 0.0))
        });

        let outcome = evaluator.evaluate(&[assignment("x", 42.0)]);
        assert_eq!(
            outcome,
            EvaluationOutcome::Success(SeedingFitness::new(42.0, 0.0, 0.0))
        );

        let boxed: Box<dyn FitnessEvaluator> = Box::new(evaluator);
        assert!(!boxed.evaluate(&[assignment("x", 1.0)]).is_failure());
    }

    #[test]
    fn test_failure_display() {
        let failure = EvaluationFailure::Timeout(Duration::from_secs(2));
        assert_eq!(failure.to_string(), "evaluation timed out after 2s");
    }
}
