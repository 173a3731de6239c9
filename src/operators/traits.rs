//! Operator traits
//!
//! This module defines the selection and mutation seams of the generation loop.

use rand::Rng;

use crate::fitness::traits::FitnessWeights;
use crate::genome::bounds::MultiBounds;
use crate::genome::real_vector::RealVector;
use crate::population::individual::Individual;

/// Selection operator trait
///
/// Selects individuals from a population for the next offspring slate.
pub trait SelectionOperator: Send + Sync {
    /// Select a single individual from the population
    ///
    /// Returns the index of the selected individual.
    fn select<R: Rng>(
        &self,
        population: &[Individual],
        weights: &FitnessWeights,
        rng: &mut R,
    ) -> usize;

    /// Select multiple individuals from the population
    fn select_many<R: Rng>(
        &self,
        population: &[Individual],
        count: usize,
        weights: &FitnessWeights,
        rng: &mut R,
    ) -> Vec<usize> {
        (0..count)
            .map(|_| self.select(population, weights, rng))
            .collect()
    }
}

/// Mutation operator trait
///
/// Applies random changes to a genome.
pub trait MutationOperator: Send + Sync {
    /// Apply mutation to a genome in place
    fn mutate<R: Rng>(&self, genome: &mut RealVector, rng: &mut R);

    /// Apply mutation, then clamp every gene into its bounds
    fn mutate_bounded<R: Rng>(&self, genome: &mut RealVector, bounds: &MultiBounds, rng: &mut R) {
        self.mutate(genome, rng);
        bounds.clamp_vec(genome.genes_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::SeedingFitness;
    use crate::genome::bounds::Bounds;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // Mock selection operator for testing
    struct MockSelection;

    impl SelectionOperator for MockSelection {
        fn select<R: Rng>(
            &self,
            population: &[Individual],
            _weights: &FitnessWeights,
            rng: &mut R,
        ) -> usize {
            rng.gen_range(0..population.len())
        }
    }

    // Pushes every gene far out of any sensible range
    struct Overshoot;

    impl MutationOperator for Overshoot {
        fn mutate<R: Rng>(&self, genome: &mut RealVector, _rng: &mut R) {
            for (i, gene) in genome.genes_mut().iter_mut().enumerate() {
                *gene += if i % 2 == 0 { 50.0 } else { -50.0 };
            }
        }
    }

    fn population() -> Vec<Individual> {
        (0..10)
            .map(|i| {
                Individual::with_fitness(
                    RealVector::new(vec![i as f64]),
                    SeedingFitness::new(i as f64, 0.0, 0.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_mock_selection_many() {
        let mut rng = StdRng::seed_from_u64(1);
        let pop = population();
        let indices = MockSelection.select_many(&pop, 5, &FitnessWeights::default(), &mut rng);
        assert_eq!(indices.len(), 5);
        assert!(indices.iter().all(|&idx| idx < pop.len()));
    }

    #[test]
    fn test_mutate_bounded_clamps_every_gene() {
        let mut rng = StdRng::seed_from_u64(1);
        let bounds = MultiBounds::uniform(Bounds::new(0.1, 100.0), 4);
        let mut genome = RealVector::new(vec![1.0, 1.0, 60.0, 60.0]);

        Overshoot.mutate_bounded(&mut genome, &bounds, &mut rng);

        assert_eq!(genome.genes(), &[51.0, 0.1, 100.0, 10.0]);
    }
}
