//! Mutation operators
//!
//! Gaussian per-gene perturbation and the per-generation schedule that
//! decides which offspring get mutated at all.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::OperatorError;
use crate::genome::bounds::MultiBounds;
use crate::genome::real_vector::RealVector;
use crate::operators::traits::MutationOperator;
use crate::population::individual::Individual;

/// Gaussian mutation
///
/// Each gene independently, with probability `mutation_probability`, gets
/// `N(mu, sigma)` noise added.
#[derive(Clone, Debug)]
pub struct GaussianMutation {
    /// Mean of the Gaussian noise
    pub mu: f64,
    /// Standard deviation of the Gaussian noise
    pub sigma: f64,
    /// Per-gene mutation probability
    pub mutation_probability: f64,
    normal: Normal<f64>,
}

impl GaussianMutation {
    /// Zero-mean Gaussian mutation touching every gene
    pub fn new(sigma: f64) -> Result<Self, OperatorError> {
        Self::with_mean(0.0, sigma)
    }

    /// Gaussian mutation with an explicit mean
    pub fn with_mean(mu: f64, sigma: f64) -> Result<Self, OperatorError> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(OperatorError::InvalidConfiguration(format!(
                "sigma must be non-negative and finite, got {}",
                sigma
            )));
        }
        let normal = Normal::new(mu, sigma)
            .map_err(|e| OperatorError::InvalidConfiguration(e.to_string()))?;
        Ok(Self {
            mu,
            sigma,
            mutation_probability: 1.0,
            normal,
        })
    }

    /// Set the per-gene mutation probability
    pub fn with_probability(mut self, probability: f64) -> Result<Self, OperatorError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(OperatorError::InvalidConfiguration(format!(
                "gene mutation probability must be in [0, 1], got {}",
                probability
            )));
        }
        self.mutation_probability = probability;
        Ok(self)
    }
}

impl MutationOperator for GaussianMutation {
    fn mutate<R: Rng>(&self, genome: &mut RealVector, rng: &mut R) {
        for gene in genome.genes_mut() {
            if rng.gen::<f64>() < self.mutation_probability {
                *gene += self.normal.sample(rng);
            }
        }
    }
}

/// Which offspring of a generation get mutated
///
/// Offspring are considered in order. Each is mutated with probability
/// `mutation_probability`, and the walk stops as soon as `max_mutants - 1`
/// offspring have been mutated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MutationSchedule {
    /// Probability that a considered offspring is mutated
    pub mutation_probability: f64,
    /// Mutation cap; at most `max_mutants - 1` offspring are mutated
    pub max_mutants: usize,
}

impl MutationSchedule {
    /// Create a schedule
    pub fn new(mutation_probability: f64, max_mutants: usize) -> Result<Self, OperatorError> {
        if !(0.0..=1.0).contains(&mutation_probability) {
            return Err(OperatorError::InvalidConfiguration(format!(
                "mutation probability must be in [0, 1], got {}",
                mutation_probability
            )));
        }
        Ok(Self {
            mutation_probability,
            max_mutants,
        })
    }

    /// Most offspring one generation may mutate
    pub fn cap(&self) -> usize {
        self.max_mutants.saturating_sub(1)
    }

    /// Mutate offspring in place, clamping each mutated genome into `bounds`
    ///
    /// Mutated offspring lose their fitness; the rest keep it. Returns the
    /// number of mutated offspring.
    pub fn apply<M, R>(
        &self,
        offspring: &mut [Individual],
        operator: &M,
        bounds: &MultiBounds,
        rng: &mut R,
    ) -> usize
    where
        M: MutationOperator,
        R: Rng,
    {
        let cap = self.cap();
        let mut mutated = 0;
        for individual in offspring.iter_mut() {
            if mutated >= cap {
                break;
            }
            if rng.gen::<f64>() < self.mutation_probability {
                operator.mutate_bounded(individual.genome_mut(), bounds, rng);
                individual.invalidate();
                mutated += 1;
            }
        }
        mutated
    }
}

impl Default for MutationSchedule {
    fn default() -> Self {
        Self {
            mutation_probability: 0.3,
            max_mutants: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::SeedingFitness;
    use crate::genome::bounds::Bounds;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn evaluated(n: usize) -> Vec<Individual> {
        (0..n)
            .map(|_| {
                Individual::with_fitness(
                    RealVector::new(vec![0.5, 0.5, 0.5]),
                    SeedingFitness::new(90.0, 5.0, 5.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_gaussian_mutation_rejects_bad_parameters() {
        assert!(GaussianMutation::new(-1.0).is_err());
        assert!(GaussianMutation::new(f64::NAN).is_err());
        assert!(GaussianMutation::new(1.0).unwrap().with_probability(1.5).is_err());
        assert!(GaussianMutation::new(0.0).is_ok());
    }

    #[test]
    fn test_gaussian_mutation_probability_zero_is_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        let mutation = GaussianMutation::new(1.0).unwrap().with_probability(0.0).unwrap();
        let mut genome = RealVector::new(vec![1.0, 2.0, 3.0]);
        mutation.mutate(&mut genome, &mut rng);
        assert_eq!(genome.genes(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_gaussian_mutation_changes_genes() {
        let mut rng = StdRng::seed_from_u64(7);
        let mutation = GaussianMutation::new(0.1).unwrap();
        let original = RealVector::new(vec![1.0, 2.0, 3.0]);
        let mut genome = original.clone();
        mutation.mutate(&mut genome, &mut rng);
        assert_ne!(genome, original);
    }

    #[test]
    fn test_gaussian_mutation_bounded() {
        let mut rng = StdRng::seed_from_u64(11);
        let bounds = MultiBounds::uniform(Bounds::new(0.1, 1.0), 3);
        let mutation = GaussianMutation::new(5.0).unwrap();

        for _ in 0..100 {
            let mut genome = RealVector::new(vec![0.5, 0.5, 0.5]);
            mutation.mutate_bounded(&mut genome, &bounds, &mut rng);
            assert!(bounds.contains_vec(genome.genes()));
        }
    }

    #[test]
    fn test_schedule_invalidates_only_mutated() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = MultiBounds::uniform(Bounds::new(0.0, 1.0), 3);
        let operator = GaussianMutation::new(0.1).unwrap();
        let schedule = MutationSchedule::new(0.5, 100).unwrap();
        let mut offspring = evaluated(50);

        let mutated = schedule.apply(&mut offspring, &operator, &bounds, &mut rng);

        let invalid = offspring.iter().filter(|i| !i.is_evaluated()).count();
        assert_eq!(invalid, mutated);
        assert!(mutated > 0 && mutated < 50);
        for individual in offspring.iter().filter(|i| i.is_evaluated()) {
            assert_eq!(individual.genome.genes(), &[0.5, 0.5, 0.5]);
        }
    }

    #[test]
    fn test_schedule_stops_at_cap() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = MultiBounds::uniform(Bounds::new(0.0, 1.0), 3);
        let operator = GaussianMutation::new(0.1).unwrap();
        let schedule = MutationSchedule::new(1.0, 4).unwrap();
        let mut offspring = evaluated(10);

        let mutated = schedule.apply(&mut offspring, &operator, &bounds, &mut rng);

        assert_eq!(mutated, 3);
        assert!(offspring[..3].iter().all(|i| !i.is_evaluated()));
        assert!(offspring[3..].iter().all(|i| i.is_evaluated()));
    }

    #[test]
    fn test_schedule_cap_of_one_mutates_nothing() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = MultiBounds::uniform(Bounds::new(0.0, 1.0), 3);
        let operator = GaussianMutation::new(0.1).unwrap();
        let schedule = MutationSchedule::new(1.0, 1).unwrap();
        let mut offspring = evaluated(5);

        assert_eq!(schedule.apply(&mut offspring, &operator, &bounds, &mut rng), 0);
        assert!(offspring.iter().all(|i| i.is_evaluated()));
    }

    #[test]
    fn test_schedule_defaults() {
        let schedule = MutationSchedule::default();
        assert_eq!(schedule.mutation_probability, 0.3);
        assert_eq!(schedule.cap(), 15);
        assert!(MutationSchedule::new(-0.1, 16).is_err());
    }
}
