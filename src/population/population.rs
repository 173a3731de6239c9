//! Population type
//!
//! This module provides the Population container type and the worker pool
//! that evaluates its unevaluated members.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::EvolutionError;
use crate::fitness::evaluator::{EvaluationOutcome, FitnessEvaluator};
use crate::fitness::traits::FitnessWeights;
use crate::genome::parameter_space::{ParameterAssignment, ParameterSpace};
use crate::genome::real_vector::RealVector;
use crate::population::individual::Individual;

/// A population of individuals
#[derive(Clone, Debug, PartialEq)]
pub struct Population {
    /// The individuals in this population
    individuals: Vec<Individual>,
    /// Current generation number
    generation: usize,
}

/// Counts from one evaluation pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    /// Individuals sent to the evaluator
    pub dispatched: usize,
    /// Of those, how many came back as failures
    pub failed: usize,
}

impl Population {
    /// Create an empty population
    pub fn new() -> Self {
        Self {
            individuals: Vec::new(),
            generation: 0,
        }
    }

    /// Create a population with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            individuals: Vec::with_capacity(capacity),
            generation: 0,
        }
    }

    /// Create a population from a vector of individuals
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self {
            individuals,
            generation: 0,
        }
    }

    /// `size` identical, unevaluated clones of one seed genome
    pub fn from_seed(seed: &RealVector, size: usize) -> Self {
        let individuals = (0..size).map(|_| Individual::new(seed.clone())).collect();
        Self {
            individuals,
            generation: 0,
        }
    }

    /// Get the current generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Set the generation number
    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get an individual by index
    pub fn get(&self, index: usize) -> Option<&Individual> {
        self.individuals.get(index)
    }

    /// Add an individual to the population
    pub fn push(&mut self, individual: Individual) {
        self.individuals.push(individual);
    }

    /// Get an iterator over the individuals
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    /// Get a mutable iterator over the individuals
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Individual> {
        self.individuals.iter_mut()
    }

    /// Get the underlying slice of individuals
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Get mutable access to the individuals
    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    /// Copies of every genome, in order
    pub fn genomes(&self) -> Vec<RealVector> {
        self.individuals.iter().map(|i| i.genome.clone()).collect()
    }

    /// Best individual under the comparator; the first one wins ties
    pub fn best(&self, weights: &FitnessWeights) -> Option<&Individual> {
        self.individuals.iter().reduce(|best, candidate| {
            if candidate.is_better_than(best, weights) {
                candidate
            } else {
                best
            }
        })
    }

    /// Indices of individuals whose fitness is unset
    pub fn invalid_indices(&self) -> Vec<usize> {
        self.individuals
            .iter()
            .enumerate()
            .filter(|(_, i)| !i.is_evaluated())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Check if all individuals have been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.individuals.iter().all(|i| i.is_evaluated())
    }

    /// Count the number of evaluated individuals
    pub fn count_evaluated(&self) -> usize {
        self.individuals.iter().filter(|i| i.is_evaluated()).count()
    }

    /// Count individuals whose evaluation failed
    pub fn count_failed(&self) -> usize {
        self.individuals.iter().filter(|i| i.is_failed()).count()
    }

    /// Evaluate every individual with an unset fitness, and only those
    ///
    /// Results are reattached by position; a `Failure` becomes a NaN fitness.
    /// Returns once every dispatched evaluation has come back.
    pub fn evaluate_invalid<E>(
        &mut self,
        space: &ParameterSpace,
        evaluator: &E,
        pool: &EvaluationPool,
    ) -> EvaluationSummary
    where
        E: FitnessEvaluator + ?Sized,
    {
        let invalid = self.invalid_indices();
        if invalid.is_empty() {
            return EvaluationSummary::default();
        }

        let requests: Vec<Vec<ParameterAssignment>> = invalid
            .iter()
            .map(|&idx| space.assignments(&self.individuals[idx].genome))
            .collect();

        tracing::debug!(count = requests.len(), "dispatching evaluations");
        let outcomes = pool.map(&requests, |params| evaluator.evaluate(params));

        let mut summary = EvaluationSummary {
            dispatched: invalid.len(),
            failed: 0,
        };
        for ((&idx, params), outcome) in invalid.iter().zip(&requests).zip(outcomes) {
            if let EvaluationOutcome::Failure(reason) = &outcome {
                summary.failed += 1;
                tracing::warn!(
                    individual = idx,
                    reason = %reason,
                    parameters = ?params,
                    "evaluation failed, assigning NaN fitness"
                );
            }
            self.individuals[idx].set_fitness(outcome.into_fitness());
        }
        summary
    }
}

impl Default for Population {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for Population {
    type Output = Individual;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl std::ops::IndexMut<usize> for Population {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.individuals[index]
    }
}

impl IntoIterator for Population {
    type Item = Individual;
    type IntoIter = std::vec::IntoIter<Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.into_iter()
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<I: IntoIterator<Item = Individual>>(iter: I) -> Self {
        Self::from_individuals(iter.into_iter().collect())
    }
}

/// Fixed-size worker pool for fitness evaluation (requires `parallel` feature)
///
/// `map` preserves input order so each outcome lines up with its request.
#[cfg(feature = "parallel")]
pub struct EvaluationPool {
    pool: rayon::ThreadPool,
}

#[cfg(feature = "parallel")]
impl EvaluationPool {
    /// Pool with `workers` threads, or rayon's default when `None`
    pub fn new(workers: Option<usize>) -> Result<Self, EvolutionError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = workers {
            builder = builder.num_threads(n);
        }
        let pool = builder.build().map_err(|e| {
            EvolutionError::Configuration(format!("failed to build evaluation pool: {}", e))
        })?;
        Ok(Self { pool })
    }

    /// Number of worker threads
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Order-preserving parallel map
    pub fn map<T, U, F>(&self, items: &[T], f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Send + Sync,
    {
        self.pool.install(|| items.par_iter().map(f).collect())
    }
}

/// Sequential fallback for the evaluation pool (when `parallel` is disabled)
#[cfg(not(feature = "parallel"))]
pub struct EvaluationPool;

#[cfg(not(feature = "parallel"))]
impl EvaluationPool {
    /// Sequential pool; the worker count is ignored
    pub fn new(_workers: Option<usize>) -> Result<Self, EvolutionError> {
        Ok(Self)
    }

    /// Always one worker
    pub fn workers(&self) -> usize {
        1
    }

    /// Order-preserving sequential map
    pub fn map<T, U, F>(&self, items: &[T], f: F) -> Vec<U>
    where
        F: Fn(&T) -> U,
    {
        items.iter().map(f).collect()
    }
}

impl std::fmt::Debug for EvaluationPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationPool")
            .field("workers", &self.workers())
            .finish()
    }
}
