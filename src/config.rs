//! Run and seed configuration
//!
//! Both are plain JSON documents read once before a run starts. Every
//! `RunConfig` field is optional and falls back to the defaults of the
//! seed-finder tuning campaign.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::algorithms::generational::{GenerationalGA, GenerationalGABuilder};
use crate::error::{ConfigError, EvoResult, EvolutionError};
use crate::fitness::evaluator::FitnessEvaluator;
use crate::fitness::traits::FitnessWeights;
use crate::genome::parameter_space::ParameterSpace;
use crate::genome::real_vector::RealVector;
use crate::operators::mutation::{GaussianMutation, MutationSchedule};
use crate::operators::selection::TournamentSelection;
use crate::termination::PerformanceTargets;

/// Settings of one tuning run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Individuals per generation
    pub population_size: usize,
    /// Generation cap
    pub max_generations: usize,
    /// Aspirants per tournament
    pub tournament_size: usize,
    /// Probability that an offspring is mutated
    pub mutation_probability: f64,
    /// Standard deviation of the Gaussian gene noise
    pub mutation_sigma: f64,
    /// Probability that a gene of a mutated offspring is perturbed
    pub gene_mutation_probability: f64,
    /// At most `max_mutants - 1` offspring are mutated per generation
    pub max_mutants: usize,
    /// Best-ever individuals to keep
    pub hall_of_fame_size: usize,
    /// Evaluation worker threads
    pub workers: Option<usize>,
    /// Per-evaluation timeout for subprocess evaluators
    pub evaluation_timeout_secs: Option<f64>,
    /// Early-stop thresholds on the best-ever individual
    pub targets: PerformanceTargets,
    /// Comparator weights
    pub weights: FitnessWeights,
    /// Keep every generation's population in the result
    pub retain_population_history: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            max_generations: 15,
            tournament_size: 3,
            mutation_probability: 0.3,
            mutation_sigma: 1.0,
            gene_mutation_probability: 0.2,
            max_mutants: 16,
            hall_of_fame_size: 1,
            workers: None,
            evaluation_timeout_secs: None,
            targets: PerformanceTargets::default(),
            weights: FitnessWeights::default(),
            retain_population_history: false,
        }
    }
}

impl RunConfig {
    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Evaluation timeout as a duration
    ///
    /// Non-positive or non-finite values mean no timeout, as do values too
    /// large for a [`Duration`] (which `build_ga` rejects).
    pub fn evaluation_timeout(&self) -> Option<Duration> {
        self.evaluation_timeout_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Build the generational GA these settings describe
    pub fn build_ga<E: FitnessEvaluator>(
        &self,
        space: ParameterSpace,
        evaluator: E,
    ) -> EvoResult<GenerationalGA<TournamentSelection, GaussianMutation, E>> {
        if let Some(secs) = self.evaluation_timeout_secs {
            if secs.is_finite() && secs > 0.0 && self.evaluation_timeout().is_none() {
                return Err(EvolutionError::Configuration(format!(
                    "evaluation_timeout_secs is out of range: {}",
                    secs
                )));
            }
        }
        let selection = TournamentSelection::new(self.tournament_size)?;
        let mutation =
            GaussianMutation::new(self.mutation_sigma)?.with_probability(self.gene_mutation_probability)?;
        let schedule = MutationSchedule::new(self.mutation_probability, self.max_mutants)?;

        let mut builder = GenerationalGABuilder::new()
            .space(space)
            .population_size(self.population_size)
            .hall_of_fame_size(self.hall_of_fame_size)
            .max_generations(self.max_generations)
            .targets(self.targets)
            .weights(self.weights)
            .schedule(schedule)
            .retain_population_history(self.retain_population_history);
        if let Some(workers) = self.workers {
            builder = builder.workers(workers);
        }

        builder
            .selection(selection)
            .mutation(mutation)
            .evaluator(evaluator)
            .build()
    }
}

/// Starting point of a run, in normalized units
///
/// Either an object mapping every parameter name to its value, or an array
/// ordered like the parameter space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedConfig {
    Named(BTreeMap<String, f64>),
    Ordered(Vec<f64>),
}

impl SeedConfig {
    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Genome for `space`, with genes in the space's order
    pub fn genome(&self, space: &ParameterSpace) -> Result<RealVector, ConfigError> {
        match self {
            SeedConfig::Ordered(values) => {
                if values.len() != space.len() {
                    return Err(ConfigError::DimensionMismatch {
                        expected: space.len(),
                        actual: values.len(),
                    });
                }
                Ok(RealVector::new(values.clone()))
            }
            SeedConfig::Named(values) => {
                if let Some(unknown) = values.keys().find(|name| space.index_of(name).is_none()) {
                    return Err(ConfigError::UnknownParameter(unknown.clone()));
                }
                let genes = space
                    .names()
                    .map(|name| {
                        values
                            .get(name)
                            .copied()
                            .ok_or_else(|| ConfigError::MissingParameter(name.to_string()))
                    })
                    .collect::<Result<Vec<f64>, _>>()?;
                Ok(RealVector::new(genes))
            }
        }
    }
}
