//! Selection operators
//!
//! This module provides tournament selection.

use rand::Rng;

use crate::error::OperatorError;
use crate::fitness::traits::FitnessWeights;
use crate::operators::traits::SelectionOperator;
use crate::population::individual::Individual;

/// Tournament selection operator
///
/// Each draw samples `tournament_size` aspirants uniformly with replacement
/// and keeps the best; the earliest-drawn aspirant wins ties. A tournament at
/// least as large as the population is run over the whole population, so it
/// always returns the best individual.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Result<Self, OperatorError> {
        if tournament_size == 0 {
            return Err(OperatorError::InvalidConfiguration(
                "tournament size must be at least 1".to_string(),
            ));
        }
        Ok(Self { tournament_size })
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary() -> Self {
        Self { tournament_size: 2 }
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self { tournament_size: 3 }
    }
}

impl SelectionOperator for TournamentSelection {
    fn select<R: Rng>(
        &self,
        population: &[Individual],
        weights: &FitnessWeights,
        rng: &mut R,
    ) -> usize {
        assert!(!population.is_empty(), "Population cannot be empty");

        let n = population.len();
        let keep_better = |best: usize, candidate: usize| {
            if population[candidate].is_better_than(&population[best], weights) {
                candidate
            } else {
                best
            }
        };

        if self.tournament_size >= n {
            return (1..n).fold(0, keep_better);
        }

        let first = rng.gen_range(0..n);
        (1..self.tournament_size)
            .map(|_| rng.gen_range(0..n))
            .fold(first, keep_better)
    }
}
