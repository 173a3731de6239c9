//! Termination criteria
//!
//! This module provides the stop conditions checked before each new
//! generation: a generation cap and performance targets on the best-ever
//! individual.

use serde::{Deserialize, Serialize};

use crate::fitness::traits::SeedingFitness;
use crate::population::hall_of_fame::HallOfFame;

/// Evolution state for termination checking
#[derive(Clone, Copy, Debug)]
pub struct EvolutionState<'a> {
    /// Number of completed generations
    pub generation: usize,
    /// Best individuals seen so far
    pub hall_of_fame: &'a HallOfFame,
}

impl EvolutionState<'_> {
    /// Fitness of the best-ever individual, if any
    pub fn best_fitness(&self) -> Option<&SeedingFitness> {
        self.hall_of_fame.best().and_then(|b| b.fitness.as_ref())
    }
}

/// Termination criterion trait
pub trait TerminationCriterion: Send + Sync {
    /// Check if evolution should terminate
    fn should_terminate(&self, state: &EvolutionState) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;
}

/// Terminate after a maximum number of generations
#[derive(Clone, Debug)]
pub struct MaxGenerations(pub usize);

impl MaxGenerations {
    /// Create a new max generations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxGenerations {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        state.generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate once the best-ever individual is good enough on all three
/// objectives
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceTargets {
    /// Efficiency must be at least this (percent)
    pub min_efficiency: f64,
    /// Duplicate rate must be at most this (percent)
    pub max_duplicate_rate: f64,
    /// Fake rate must be at most this (percent)
    pub max_fake_rate: f64,
}

impl Default for PerformanceTargets {
    fn default() -> Self {
        Self {
            min_efficiency: 99.4,
            max_duplicate_rate: 60.0,
            max_fake_rate: 10.0,
        }
    }
}

impl PerformanceTargets {
    /// Create a set of targets
    pub fn new(min_efficiency: f64, max_duplicate_rate: f64, max_fake_rate: f64) -> Self {
        Self {
            min_efficiency,
            max_duplicate_rate,
            max_fake_rate,
        }
    }

    /// Check a fitness against the targets; a failed evaluation never meets them
    pub fn is_met(&self, fitness: &SeedingFitness) -> bool {
        fitness.efficiency >= self.min_efficiency
            && fitness.duplicate_rate <= self.max_duplicate_rate
            && fitness.fake_rate <= self.max_fake_rate
    }
}

impl TerminationCriterion for PerformanceTargets {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        state.best_fitness().is_some_and(|f| self.is_met(f))
    }

    fn reason(&self) -> &'static str {
        "Performance targets reached"
    }
}

/// Combine criteria with OR logic (any one triggers termination)
pub struct AnyOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AnyOf {
    /// Create a new AnyOf combinator
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }

    /// Reason of the first criterion that fires, if any
    pub fn triggered(&self, state: &EvolutionState) -> Option<&'static str> {
        self.criteria
            .iter()
            .find(|c| c.should_terminate(state))
            .map(|c| c.reason())
    }
}

impl TerminationCriterion for AnyOf {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        self.criteria.iter().any(|c| c.should_terminate(state))
    }

    fn reason(&self) -> &'static str {
        "One of multiple criteria met"
    }
}

impl std::fmt::Debug for AnyOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reasons: Vec<&str> = self.criteria.iter().map(|c| c.reason()).collect();
        f.debug_struct("AnyOf").field("criteria", &reasons).finish()
    }
}

pub mod prelude {
    pub use super::{AnyOf, EvolutionState, MaxGenerations, PerformanceTargets, TerminationCriterion};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::FitnessWeights;
    use crate::genome::real_vector::RealVector;
    use crate::population::individual::Individual;

    fn hall_with(fitness: Option<SeedingFitness>) -> HallOfFame {
        let mut hof = HallOfFame::new(1);
        if let Some(f) = fitness {
            hof.update(
                &[Individual::with_fitness(RealVector::new(vec![1.0]), f)],
                &FitnessWeights::default(),
            );
        }
        hof
    }

    fn state(generation: usize, hall_of_fame: &HallOfFame) -> EvolutionState<'_> {
        EvolutionState {
            generation,
            hall_of_fame,
        }
    }

    #[test]
    fn test_max_generations() {
        let hof = hall_with(None);
        let criterion = MaxGenerations::new(15);

        assert!(!criterion.should_terminate(&state(14, &hof)));
        assert!(criterion.should_terminate(&state(15, &hof)));
        assert!(criterion.should_terminate(&state(20, &hof)));
    }

    #[test]
    fn test_performance_targets_boundaries() {
        let targets = PerformanceTargets::default();
        assert!(targets.is_met(&SeedingFitness::new(99.4, 10.0, 60.0)));
        assert!(!targets.is_met(&SeedingFitness::new(99.39, 10.0, 60.0)));
        assert!(!targets.is_met(&SeedingFitness::new(99.5, 10.1, 60.0)));
        assert!(!targets.is_met(&SeedingFitness::new(99.5, 10.0, 60.1)));
        assert!(!targets.is_met(&SeedingFitness::failed()));
    }

    #[test]
    fn test_performance_targets_use_hall_of_fame() {
        let targets = PerformanceTargets::default();

        let empty = hall_with(None);
        assert!(!targets.should_terminate(&state(3, &empty)));

        let good = hall_with(Some(SeedingFitness::new(99.8, 4.0, 30.0)));
        assert!(targets.should_terminate(&state(3, &good)));
    }

    #[test]
    fn test_performance_targets_deserialize_with_defaults() {
        let targets: PerformanceTargets =
            serde_json::from_str(r#"{"min_efficiency": 95.0}"#).unwrap();
        assert_eq!(targets, PerformanceTargets::new(95.0, 60.0, 10.0));
    }

    #[test]
    fn test_any_of_reports_first_triggered() {
        let good = hall_with(Some(SeedingFitness::new(99.8, 4.0, 30.0)));
        let poor = hall_with(Some(SeedingFitness::new(90.0, 4.0, 30.0)));

        let criterion = AnyOf::new(vec![
            Box::new(MaxGenerations::new(15)),
            Box::new(PerformanceTargets::default()),
        ]);

        assert!(!criterion.should_terminate(&state(5, &poor)));
        assert_eq!(criterion.triggered(&state(5, &poor)), None);
        assert_eq!(
            criterion.triggered(&state(15, &poor)),
            Some("Maximum generations reached")
        );
        assert_eq!(
            criterion.triggered(&state(5, &good)),
            Some("Performance targets reached")
        );
    }
}
