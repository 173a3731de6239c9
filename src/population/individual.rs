//! Individual wrapper type
//!
//! This module provides the Individual type that wraps a genome with its fitness.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::fitness::traits::{FitnessWeights, SeedingFitness};
use crate::genome::real_vector::RealVector;

/// An individual in the population
///
/// Fitness is `None` until evaluated and goes back to `None` when the genome
/// is mutated. A failed evaluation is a set fitness holding NaN.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// The genome of this individual
    pub genome: RealVector,
    /// The fitness value (None if not yet evaluated)
    pub fitness: Option<SeedingFitness>,
    /// Generation when this individual was created
    pub birth_generation: usize,
}

impl Individual {
    /// Create a new individual with an unevaluated genome
    pub fn new(genome: RealVector) -> Self {
        Self {
            genome,
            fitness: None,
            birth_generation: 0,
        }
    }

    /// Create a new individual with a known fitness
    pub fn with_fitness(genome: RealVector, fitness: SeedingFitness) -> Self {
        Self {
            genome,
            fitness: Some(fitness),
            birth_generation: 0,
        }
    }

    /// Check if this individual has a valid (set) fitness
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Check if the last evaluation of this individual failed
    pub fn is_failed(&self) -> bool {
        self.fitness.is_some_and(|f| f.is_failed())
    }

    /// Set the fitness value
    pub fn set_fitness(&mut self, fitness: SeedingFitness) {
        self.fitness = Some(fitness);
    }

    /// Clear the fitness so the individual is evaluated again
    pub fn invalidate(&mut self) {
        self.fitness = None;
    }

    /// Get a reference to the genome
    pub fn genome(&self) -> &RealVector {
        &self.genome
    }

    /// Get a mutable reference to the genome
    pub fn genome_mut(&mut self) -> &mut RealVector {
        &mut self.genome
    }

    /// Compare against another individual under the given weights
    pub fn compare(&self, other: &Self, weights: &FitnessWeights) -> Ordering {
        weights.compare_option(self.fitness.as_ref(), other.fitness.as_ref())
    }

    /// Check if this individual is strictly better than another
    pub fn is_better_than(&self, other: &Self, weights: &FitnessWeights) -> bool {
        self.compare(other, weights) == Ordering::Greater
    }

    /// Age of this individual (generations since birth)
    pub fn age(&self, current_generation: usize) -> usize {
        current_generation.saturating_sub(self.birth_generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome() -> RealVector {
        RealVector::new(vec![1.0, 0.5, 2.0])
    }

    #[test]
    fn test_individual_new() {
        let individual = Individual::new(genome());
        assert!(!individual.is_evaluated());
        assert!(!individual.is_failed());
        assert_eq!(individual.birth_generation, 0);
    }

    #[test]
    fn test_individual_set_and_invalidate() {
        let mut individual = Individual::new(genome());
        individual.set_fitness(SeedingFitness::new(97.0, 8.0, 45.0));
        assert!(individual.is_evaluated());

        individual.invalidate();
        assert!(!individual.is_evaluated());
        assert_eq!(individual.fitness, None);
    }

    #[test]
    fn test_failed_individual_is_evaluated() {
        let individual = Individual::with_fitness(genome(), SeedingFitness::failed());
        assert!(individual.is_evaluated());
        assert!(individual.is_failed());
    }

    #[test]
    fn test_individual_is_better_than() {
        let w = FitnessWeights::default();
        let good = Individual::with_fitness(genome(), SeedingFitness::new(99.0, 5.0, 30.0));
        let bad = Individual::with_fitness(genome(), SeedingFitness::new(90.0, 5.0, 30.0));
        let failed = Individual::with_fitness(genome(), SeedingFitness::failed());
        let unevaluated = Individual::new(genome());

        assert!(good.is_better_than(&bad, &w));
        assert!(!bad.is_better_than(&good, &w));
        assert!(bad.is_better_than(&failed, &w));
        assert!(failed.is_better_than(&unevaluated, &w));
        assert!(!failed.is_better_than(&failed.clone(), &w));
    }

    #[test]
    fn test_individual_age() {
        let mut individual = Individual::new(genome());
        individual.birth_generation = 10;
        assert_eq!(individual.age(10), 0);
        assert_eq!(individual.age(15), 5);
        assert_eq!(individual.age(5), 0);
    }

    #[test]
    fn test_clone_is_deep() {
        let original = Individual::with_fitness(genome(), SeedingFitness::new(1.0, 2.0, 3.0));
        let mut copy = original.clone();
        copy.genome_mut()[0] = 42.0;
        copy.invalidate();

        assert_eq!(original.genome()[0], 1.0);
        assert!(original.is_evaluated());
    }
}
