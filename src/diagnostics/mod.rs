//! Diagnostics and statistics
//!
//! This module provides the per-generation logbook and the result object of
//! a run. Statistics are purely observational: nothing in the generation
//! loop reads them back.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::genome::parameter_space::{ParameterAssignment, ParameterSpace};
use crate::population::hall_of_fame::HallOfFame;
use crate::population::individual::Individual;
use crate::population::population::Population;

/// Channel holding each individual's efficiency
pub const EFFICIENCY_CHANNEL: &str = "efficiency";
/// Channel holding each individual's fake rate
pub const FAKE_RATE_CHANNEL: &str = "fake_rate";
/// Channel holding each individual's duplicate rate
pub const DUPLICATE_RATE_CHANNEL: &str = "duplicate_rate";

const OBJECTIVE_CHANNELS: usize = 3;

/// Aggregate of one channel over one generation's population
///
/// Any NaN sample (a failed evaluation) makes every statistic NaN.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
}

impl ChannelStats {
    /// Compute statistics over the given samples
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() || values.iter().any(|v| v.is_nan()) {
            return Self {
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                std: f64::NAN,
            };
        }

        let n = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            min,
            max,
            mean,
            std: variance.sqrt(),
        }
    }

    /// Read one statistic
    pub fn get(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::Min => self.min,
            Statistic::Max => self.max,
            Statistic::Mean => self.mean,
            Statistic::Std => self.std,
        }
    }
}

/// Statistic selector for logbook queries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    Min,
    Max,
    Mean,
    Std,
}

/// Statistics for a single generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Generation number (the first bred generation is 1)
    pub generation: usize,
    /// Individuals evaluated during this generation
    pub evaluations: usize,
    /// Of those, how many failed
    pub failures: usize,
    /// One entry per logbook channel, in channel order
    pub channels: Vec<ChannelStats>,
}

/// Per-generation statistics of a run, queryable as time series
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Logbook {
    channels: Vec<String>,
    records: Vec<GenerationRecord>,
}

impl Logbook {
    /// Logbook with the three fitness channels followed by one channel per
    /// parameter of `space`
    pub fn new(space: &ParameterSpace) -> Self {
        let channels = [EFFICIENCY_CHANNEL, FAKE_RATE_CHANNEL, DUPLICATE_RATE_CHANNEL]
            .into_iter()
            .chain(space.names())
            .map(str::to_string)
            .collect();
        Self {
            channels,
            records: Vec::new(),
        }
    }

    /// Channel names, in record order
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// All records, oldest first
    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    /// Number of generations recorded
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compute and append statistics for one generation's population
    ///
    /// Unevaluated individuals contribute to the gene channels only.
    pub fn record(
        &mut self,
        generation: usize,
        population: &Population,
        evaluations: usize,
        failures: usize,
    ) -> &GenerationRecord {
        let fitnesses: Vec<[f64; 3]> = population
            .iter()
            .filter_map(|i| i.fitness.map(|f| f.values()))
            .collect();

        // One stats entry per named channel: objectives first, then genes.
        let channels = (0..self.channels.len())
            .map(|channel| {
                let values: Vec<f64> = if channel < OBJECTIVE_CHANNELS {
                    fitnesses.iter().map(|f| f[channel]).collect()
                } else {
                    let gene = channel - OBJECTIVE_CHANNELS;
                    population
                        .iter()
                        .filter_map(|i| i.genome.genes().get(gene).copied())
                        .collect()
                };
                ChannelStats::from_values(&values)
            })
            .collect();

        self.records.push(GenerationRecord {
            generation,
            evaluations,
            failures,
            channels,
        });
        &self.records[self.records.len() - 1]
    }

    /// Index of a channel by name
    pub fn channel_index(&self, channel: &str) -> Option<usize> {
        self.channels.iter().position(|c| c == channel)
    }

    /// Statistics of one channel in one generation
    pub fn get(&self, generation: usize, channel: &str) -> Option<&ChannelStats> {
        let idx = self.channel_index(channel)?;
        self.records
            .iter()
            .find(|r| r.generation == generation)
            .and_then(|r| r.channels.get(idx))
    }

    /// Time series of one statistic of one channel, oldest first
    pub fn series(&self, channel: &str, statistic: Statistic) -> Option<Vec<f64>> {
        let idx = self.channel_index(channel)?;
        Some(
            self.records
                .iter()
                .map(|r| r.channels[idx].get(statistic))
                .collect(),
        )
    }

    /// Generation numbers of the records, oldest first
    pub fn generations(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.generation).collect()
    }
}

/// The best-ever individual as of the end of one generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HallOfFameSnapshot {
    pub generation: usize,
    pub best: Individual,
    /// The best individual's parameters in actual units
    pub parameters: Vec<ParameterAssignment>,
}

impl HallOfFameSnapshot {
    /// Snapshot the current best of `hall_of_fame`, if it holds anything
    pub fn capture(
        generation: usize,
        hall_of_fame: &HallOfFame,
        space: &ParameterSpace,
    ) -> Option<Self> {
        hall_of_fame.best().map(|best| Self {
            generation,
            best: best.clone(),
            parameters: space.assignments(&best.genome),
        })
    }
}

/// Result of an evolution run
#[derive(Clone, Debug)]
pub struct EvolutionResult {
    /// Population after the last generation
    pub population: Population,
    /// Best individuals of the whole run
    pub hall_of_fame: HallOfFame,
    /// Best-ever individual after each generation
    pub hall_of_fame_history: Vec<HallOfFameSnapshot>,
    /// Per-generation statistics
    pub logbook: Logbook,
    /// Number of generations completed
    pub generations: usize,
    /// Total fitness evaluations, including the seed
    pub evaluations: usize,
    /// Evaluations that failed
    pub failed_evaluations: usize,
    /// Why the run stopped
    pub termination_reason: String,
    /// Population after each generation, if retention was enabled
    pub population_history: Vec<Population>,
    /// Wall-clock time of the run
    pub runtime: Duration,
}

impl EvolutionResult {
    /// Best individual of the whole run
    pub fn best(&self) -> Option<&Individual> {
        self.hall_of_fame.best()
    }

    /// Best individual's parameters in actual units
    pub fn best_parameters(&self, space: &ParameterSpace) -> Option<Vec<ParameterAssignment>> {
        self.best().map(|b| space.assignments(&b.genome))
    }

    /// Get a summary of the evolution run
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EvolutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Evolution Summary:")?;
        writeln!(f, "- Generations: {}", self.generations)?;
        writeln!(
            f,
            "- Evaluations: {} ({} failed)",
            self.evaluations, self.failed_evaluations
        )?;
        match self.best().and_then(|b| b.fitness) {
            Some(best) => writeln!(
                f,
                "- Best: efficiency {:.3}%, fake rate {:.3}%, duplicate rate {:.3}%",
                best.efficiency, best.fake_rate, best.duplicate_rate
            )?,
            None => writeln!(f, "- Best: none")?,
        }
        writeln!(f, "- Runtime: {:.2}ms", self.runtime.as_secs_f64() * 1000.0)?;
        write!(f, "- Termination: {}", self.termination_reason)
    }
}

pub mod prelude {
    pub use super::{
        ChannelStats, EvolutionResult, GenerationRecord, HallOfFameSnapshot, Logbook, Statistic,
        DUPLICATE_RATE_CHANNEL, EFFICIENCY_CHANNEL, FAKE_RATE_CHANNEL,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::traits::{FitnessWeights, SeedingFitness};
    use crate::genome::real_vector::RealVector;
    use approx::assert_relative_eq;

    fn space() -> ParameterSpace {
        ParameterSpace::new(&["a", "b"], &[10.0, 1.0], &[0.0, 0.0], &[1.0, 1.0], &[false, true])
            .unwrap()
    }

    fn create_test_population() -> Population {
        (1..=5)
            .map(|i| {
                Individual::with_fitness(
                    RealVector::new(vec![i as f64 / 10.0, 0.5]),
                    SeedingFitness::new(90.0 + i as f64, 10.0 - i as f64, 50.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_channel_stats() {
        let stats = ChannelStats::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_relative_eq!(stats.mean, 5.0);
        // population, not sample, deviation
        assert_relative_eq!(stats.std, 2.0);
        assert_eq!(stats.get(Statistic::Max), 9.0);
    }

    #[test]
    fn test_channel_stats_nan_propagates() {
        let stats = ChannelStats::from_values(&[1.0, f64::NAN, 3.0]);
        assert!(stats.min.is_nan() && stats.max.is_nan());
        assert!(stats.mean.is_nan() && stats.std.is_nan());
        assert!(ChannelStats::from_values(&[]).mean.is_nan());
    }

    #[test]
    fn test_logbook_channels() {
        let logbook = Logbook::new(&space());
        assert_eq!(
            logbook.channels(),
            &["efficiency", "fake_rate", "duplicate_rate", "a", "b"]
        );
        assert!(logbook.is_empty());
    }

    #[test]
    fn test_logbook_record_and_series() {
        let mut logbook = Logbook::new(&space());
        let pop = create_test_population();

        logbook.record(1, &pop, 3, 0);
        logbook.record(2, &pop, 2, 1);

        assert_eq!(logbook.len(), 2);
        assert_eq!(logbook.generations(), vec![1, 2]);

        let eff = logbook.get(1, EFFICIENCY_CHANNEL).unwrap();
        assert_eq!(eff.min, 91.0);
        assert_eq!(eff.max, 95.0);
        assert_relative_eq!(eff.mean, 93.0);

        let gene_a = logbook.get(2, "a").unwrap();
        assert_relative_eq!(gene_a.mean, 0.3);
        let gene_b = logbook.get(2, "b").unwrap();
        assert_eq!(gene_b.std, 0.0);

        assert_eq!(
            logbook.series(FAKE_RATE_CHANNEL, Statistic::Min),
            Some(vec![5.0, 5.0])
        );
        assert_eq!(logbook.series("unknown", Statistic::Min), None);
        assert_eq!(logbook.records()[1].failures, 1);
    }

    #[test]
    fn test_logbook_serializes() {
        let mut logbook = Logbook::new(&space());
        logbook.record(1, &create_test_population(), 5, 0);
        let json = serde_json::to_string(&logbook).unwrap();
        let back: Logbook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, logbook);
    }

    #[test]
    fn test_logbook_with_short_channel_list_records() {
        let mut empty: Logbook =
            serde_json::from_str(r#"{"channels": [], "records": []}"#).unwrap();
        let record = empty.record(1, &create_test_population(), 5, 0);
        assert!(record.channels.is_empty());

        let mut partial: Logbook =
            serde_json::from_str(r#"{"channels": ["efficiency"], "records": []}"#).unwrap();
        let record = partial.record(1, &create_test_population(), 5, 0);
        assert_eq!(record.channels.len(), 1);
        assert_eq!(record.channels[0].max, 95.0);
    }

    #[test]
    fn test_hall_of_fame_snapshot() {
        let space = space();
        let mut hof = HallOfFame::new(1);
        assert!(HallOfFameSnapshot::capture(1, &hof, &space).is_none());

        hof.update(create_test_population().iter(), &FitnessWeights::default());
        let snapshot = HallOfFameSnapshot::capture(1, &hof, &space).unwrap();
        assert_eq!(snapshot.best.genome[0], 0.5);
        assert_relative_eq!(snapshot.parameters[0].value.as_f64(), 5.0);
        assert_eq!(snapshot.parameters[1].name, "b");
    }
}
