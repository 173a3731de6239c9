//! Generational genetic algorithm
//!
//! This module implements the tuning loop: a population of seed clones is
//! bred by tournament selection and bounded Gaussian mutation, and only the
//! individuals a generation actually changed are sent to the evaluator.
//!
//! ```text
//! Init -> EvaluateSeed -> (Select -> Mutate -> EvaluateInvalid -> Replace -> Record)* -> Terminated
//! ```

use std::fmt;
use std::time::Instant;

use rand::Rng;
use tracing::instrument;

use crate::diagnostics::{EvolutionResult, HallOfFameSnapshot, Logbook};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::evaluator::{EvaluationOutcome, FitnessEvaluator};
use crate::fitness::traits::FitnessWeights;
use crate::genome::bounds::MultiBounds;
use crate::genome::parameter_space::ParameterSpace;
use crate::genome::real_vector::RealVector;
use crate::operators::mutation::{GaussianMutation, MutationSchedule};
use crate::operators::selection::TournamentSelection;
use crate::operators::traits::{MutationOperator, SelectionOperator};
use crate::population::hall_of_fame::HallOfFame;
use crate::population::individual::Individual;
use crate::population::population::{EvaluationPool, Population};
use crate::termination::{
    AnyOf, EvolutionState, MaxGenerations, PerformanceTargets, TerminationCriterion,
};

/// States of the generation loop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoopPhase {
    /// Building the population from seed clones
    Init,
    /// Evaluating one clone and sharing its fitness
    EvaluateSeed,
    /// Drawing the offspring slate
    Select,
    /// Mutating offspring within bounds
    Mutate,
    /// Evaluating offspring whose fitness was cleared
    EvaluateInvalid,
    /// Swapping the offspring in as the new population
    Replace,
    /// Updating the hall of fame and the logbook
    Record,
    /// Done
    Terminated,
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopPhase::Init => "init",
            LoopPhase::EvaluateSeed => "evaluate_seed",
            LoopPhase::Select => "select",
            LoopPhase::Mutate => "mutate",
            LoopPhase::EvaluateInvalid => "evaluate_invalid",
            LoopPhase::Replace => "replace",
            LoopPhase::Record => "record",
            LoopPhase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

fn enter(phase: LoopPhase, generation: usize) {
    tracing::trace!(%phase, generation, "entering phase");
}

/// Configuration for the generational GA
#[derive(Clone, Debug)]
pub struct GenerationalGAConfig {
    /// Population size
    pub population_size: usize,
    /// Number of best-ever individuals to keep
    pub hall_of_fame_size: usize,
    /// Evaluation worker threads (rayon's default when `None`)
    pub workers: Option<usize>,
    /// Keep a copy of the population after every generation
    pub retain_population_history: bool,
    /// Comparator weights
    pub weights: FitnessWeights,
}

impl Default for GenerationalGAConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            hall_of_fame_size: 1,
            workers: None,
            retain_population_history: false,
            weights: FitnessWeights::default(),
        }
    }
}

/// Builder for GenerationalGA
pub struct GenerationalGABuilder<S, M, E> {
    config: GenerationalGAConfig,
    space: Option<ParameterSpace>,
    selection: Option<S>,
    mutation: Option<M>,
    schedule: MutationSchedule,
    evaluator: Option<E>,
    max_generations: usize,
    targets: Option<PerformanceTargets>,
}

impl GenerationalGABuilder<(), (), ()> {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: GenerationalGAConfig::default(),
            space: None,
            selection: None,
            mutation: None,
            schedule: MutationSchedule::default(),
            evaluator: None,
            max_generations: 15,
            targets: Some(PerformanceTargets::default()),
        }
    }
}

impl Default for GenerationalGABuilder<(), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, M, E> GenerationalGABuilder<S, M, E> {
    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the hall of fame capacity
    pub fn hall_of_fame_size(mut self, size: usize) -> Self {
        self.config.hall_of_fame_size = size;
        self
    }

    /// Set the number of evaluation worker threads
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = Some(workers);
        self
    }

    /// Keep every generation's population in the result
    pub fn retain_population_history(mut self, enabled: bool) -> Self {
        self.config.retain_population_history = enabled;
        self
    }

    /// Set the comparator weights
    pub fn weights(mut self, weights: FitnessWeights) -> Self {
        self.config.weights = weights;
        self
    }

    /// Set the parameter space; its bounds constrain every gene
    pub fn space(mut self, space: ParameterSpace) -> Self {
        self.space = Some(space);
        self
    }

    /// Set the per-generation mutation schedule
    pub fn schedule(mut self, schedule: MutationSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Set the generation cap
    pub fn max_generations(mut self, max: usize) -> Self {
        self.max_generations = max;
        self
    }

    /// Stop early once the best-ever individual meets these targets
    pub fn targets(mut self, targets: PerformanceTargets) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Run until the generation cap regardless of performance
    pub fn without_targets(mut self) -> Self {
        self.targets = None;
        self
    }

    /// Set the selection operator
    pub fn selection<NewS>(self, selection: NewS) -> GenerationalGABuilder<NewS, M, E>
    where
        NewS: SelectionOperator,
    {
        GenerationalGABuilder {
            config: self.config,
            space: self.space,
            selection: Some(selection),
            mutation: self.mutation,
            schedule: self.schedule,
            evaluator: self.evaluator,
            max_generations: self.max_generations,
            targets: self.targets,
        }
    }

    /// Set the mutation operator
    pub fn mutation<NewM>(self, mutation: NewM) -> GenerationalGABuilder<S, NewM, E>
    where
        NewM: MutationOperator,
    {
        GenerationalGABuilder {
            config: self.config,
            space: self.space,
            selection: self.selection,
            mutation: Some(mutation),
            schedule: self.schedule,
            evaluator: self.evaluator,
            max_generations: self.max_generations,
            targets: self.targets,
        }
    }

    /// Set the fitness evaluator
    pub fn evaluator<NewE>(self, evaluator: NewE) -> GenerationalGABuilder<S, M, NewE>
    where
        NewE: FitnessEvaluator,
    {
        GenerationalGABuilder {
            config: self.config,
            space: self.space,
            selection: self.selection,
            mutation: self.mutation,
            schedule: self.schedule,
            evaluator: Some(evaluator),
            max_generations: self.max_generations,
            targets: self.targets,
        }
    }
}

impl<S, M, E> GenerationalGABuilder<S, M, E>
where
    S: SelectionOperator,
    M: MutationOperator,
    E: FitnessEvaluator,
{
    /// Build the GenerationalGA instance
    pub fn build(self) -> EvoResult<GenerationalGA<S, M, E>> {
        let space = self.space.ok_or_else(|| {
            EvolutionError::Configuration("Parameter space must be specified".to_string())
        })?;

        let selection = self.selection.ok_or_else(|| {
            EvolutionError::Configuration("Selection operator must be specified".to_string())
        })?;

        let mutation = self.mutation.ok_or_else(|| {
            EvolutionError::Configuration("Mutation operator must be specified".to_string())
        })?;

        let evaluator = self.evaluator.ok_or_else(|| {
            EvolutionError::Configuration("Fitness evaluator must be specified".to_string())
        })?;

        if self.config.population_size == 0 {
            return Err(EvolutionError::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if self.config.hall_of_fame_size == 0 {
            return Err(EvolutionError::Configuration(
                "Hall of fame size must be at least 1".to_string(),
            ));
        }
        if self.config.workers == Some(0) {
            return Err(EvolutionError::Configuration(
                "Worker count must be at least 1".to_string(),
            ));
        }

        let pool = EvaluationPool::new(self.config.workers)?;

        let mut criteria: Vec<Box<dyn TerminationCriterion>> =
            vec![Box::new(MaxGenerations::new(self.max_generations))];
        if let Some(targets) = self.targets {
            criteria.push(Box::new(targets));
        }

        Ok(GenerationalGA {
            config: self.config,
            bounds: space.bounds(),
            space,
            selection,
            mutation,
            schedule: self.schedule,
            evaluator,
            termination: AnyOf::new(criteria),
            pool,
        })
    }
}

/// Generational genetic algorithm over a parameter space
///
/// Each generation draws a full offspring slate by selection, mutates some of
/// it, evaluates only the mutated offspring and replaces the population
/// wholesale. The best-ever individuals live in a hall of fame.
pub struct GenerationalGA<S, M, E> {
    config: GenerationalGAConfig,
    space: ParameterSpace,
    bounds: MultiBounds,
    selection: S,
    mutation: M,
    schedule: MutationSchedule,
    evaluator: E,
    termination: AnyOf,
    pool: EvaluationPool,
}

impl GenerationalGA<(), (), ()> {
    /// Create a builder for GenerationalGA
    pub fn builder() -> GenerationalGABuilder<(), (), ()> {
        GenerationalGABuilder::new()
    }
}

impl<E: FitnessEvaluator> GenerationalGA<TournamentSelection, GaussianMutation, E> {
    /// Tournament selection and Gaussian mutation with the default settings
    pub fn with_defaults(space: ParameterSpace, evaluator: E) -> EvoResult<Self> {
        let mutation = GaussianMutation::new(1.0)?.with_probability(0.2)?;
        GenerationalGABuilder::new()
            .space(space)
            .selection(TournamentSelection::default())
            .mutation(mutation)
            .evaluator(evaluator)
            .build()
    }
}

impl<S, M, E> GenerationalGA<S, M, E>
where
    S: SelectionOperator,
    M: MutationOperator,
    E: FitnessEvaluator,
{
    /// Run configuration
    pub fn config(&self) -> &GenerationalGAConfig {
        &self.config
    }

    /// Parameter space being tuned
    pub fn space(&self) -> &ParameterSpace {
        &self.space
    }

    /// Per-gene bounds derived from the space
    pub fn bounds(&self) -> &MultiBounds {
        &self.bounds
    }

    /// The evaluator
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Check that a seed genome can start a run
    pub fn validate_seed(&self, seed: &RealVector) -> EvoResult<()> {
        if seed.dimension() != self.space.len() {
            return Err(EvolutionError::Configuration(format!(
                "Seed has {} genes but the parameter space has {}",
                seed.dimension(),
                self.space.len()
            )));
        }
        let outside = seed
            .genes()
            .iter()
            .zip(self.bounds.iter())
            .zip(self.space.names())
            .find(|((gene, bounds), _)| !bounds.contains(**gene));
        if let Some(((gene, bounds), name)) = outside {
            return Err(EvolutionError::Configuration(format!(
                "Seed value {} for {} lies outside its bounds [{}, {}]",
                gene, name, bounds.min, bounds.max
            )));
        }
        Ok(())
    }

    /// Run the genetic algorithm from one seed genome
    #[instrument(
        level = "info",
        skip_all,
        fields(population_size = self.config.population_size, dimension = self.space.len())
    )]
    pub fn run<R: Rng>(
        &self,
        seed: &RealVector,
        rng: &mut R,
    ) -> EvoResult<EvolutionResult> {
        let start_time = Instant::now();
        let weights = &self.config.weights;
        let size = self.config.population_size;

        enter(LoopPhase::Init, 0);
        self.validate_seed(seed)?;
        let mut population = Population::from_seed(seed, size);

        // One evaluation stands in for every clone of the seed.
        enter(LoopPhase::EvaluateSeed, 0);
        let outcome = self.evaluator.evaluate(&self.space.assignments(seed));
        let mut evaluations = 1;
        let mut failed_evaluations = 0;
        if let EvaluationOutcome::Failure(reason) = &outcome {
            failed_evaluations += 1;
            tracing::warn!(reason = %reason, "seed evaluation failed, assigning NaN fitness");
        }
        let seed_fitness = outcome.into_fitness();
        for individual in population.iter_mut() {
            individual.set_fitness(seed_fitness);
        }
        tracing::info!(
            efficiency = seed_fitness.efficiency,
            fake_rate = seed_fitness.fake_rate,
            duplicate_rate = seed_fitness.duplicate_rate,
            "seed evaluated"
        );

        let mut hall_of_fame = HallOfFame::new(self.config.hall_of_fame_size);
        let mut logbook = Logbook::new(&self.space);
        let mut hall_of_fame_history = Vec::new();
        let mut population_history = Vec::new();

        let termination_reason = loop {
            let state = EvolutionState {
                generation: population.generation(),
                hall_of_fame: &hall_of_fame,
            };
            if let Some(reason) = self.termination.triggered(&state) {
                break reason;
            }

            let generation = population.generation() + 1;

            enter(LoopPhase::Select, generation);
            let mut offspring: Vec<Individual> = self
                .selection
                .select_many(population.individuals(), size, weights, rng)
                .into_iter()
                .map(|idx| population[idx].clone())
                .collect();

            enter(LoopPhase::Mutate, generation);
            let mutated = self
                .schedule
                .apply(&mut offspring, &self.mutation, &self.bounds, rng);
            for child in offspring.iter_mut().filter(|c| !c.is_evaluated()) {
                child.birth_generation = generation;
            }

            enter(LoopPhase::EvaluateInvalid, generation);
            let mut next = Population::from_individuals(offspring);
            next.set_generation(generation);
            let summary = next.evaluate_invalid(&self.space, &self.evaluator, &self.pool);
            evaluations += summary.dispatched;
            failed_evaluations += summary.failed;

            enter(LoopPhase::Replace, generation);
            population = next;

            enter(LoopPhase::Record, generation);
            hall_of_fame.update(population.iter(), weights);
            logbook.record(generation, &population, summary.dispatched, summary.failed);
            if let Some(snapshot) =
                HallOfFameSnapshot::capture(generation, &hall_of_fame, &self.space)
            {
                hall_of_fame_history.push(snapshot);
            }
            if self.config.retain_population_history {
                population_history.push(population.clone());
            }

            match hall_of_fame.best().and_then(|b| b.fitness) {
                Some(best) => tracing::info!(
                    generation,
                    mutated,
                    evaluated = summary.dispatched,
                    failed = summary.failed,
                    best_efficiency = best.efficiency,
                    best_fake_rate = best.fake_rate,
                    best_duplicate_rate = best.duplicate_rate,
                    "generation complete"
                ),
                None => tracing::info!(generation, mutated, "generation complete"),
            }
        };

        enter(LoopPhase::Terminated, population.generation());
        tracing::info!(
            generations = population.generation(),
            evaluations,
            failed_evaluations,
            reason = termination_reason,
            "evolution finished"
        );

        Ok(EvolutionResult {
            generations: population.generation(),
            population,
            hall_of_fame,
            hall_of_fame_history,
            logbook,
            evaluations,
            failed_evaluations,
            termination_reason: termination_reason.to_string(),
            population_history,
            runtime: start_time.elapsed(),
        })
    }
}

impl<S, M, E> fmt::Debug for GenerationalGA<S, M, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationalGA")
            .field("config", &self.config)
            .field("space", &self.space)
            .field("schedule", &self.schedule)
            .field("termination", &self.termination)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
