//! Fitness values and the weighted comparator
//!
//! A seeding configuration is judged on three objectives at once. They are
//! folded into one scalar by a fixed weight vector and every ordering decision
//! in the library (tournaments, hall of fame, best-of-population) goes through
//! [`FitnessWeights::compare`].

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Fitness triple of one evaluated configuration, in percent
///
/// A failed evaluation is represented by NaN in every component.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedingFitness {
    /// Fraction of particles matched by at least one seed (maximize)
    pub efficiency: f64,
    /// Fraction of seeds not matched to a particle (minimize)
    pub fake_rate: f64,
    /// Fraction of duplicated matched seeds (minimize)
    pub duplicate_rate: f64,
}

impl SeedingFitness {
    /// Create a fitness triple
    pub fn new(efficiency: f64, fake_rate: f64, duplicate_rate: f64) -> Self {
        Self {
            efficiency,
            fake_rate,
            duplicate_rate,
        }
    }

    /// Sentinel for a failed evaluation
    pub fn failed() -> Self {
        Self::new(f64::NAN, f64::NAN, f64::NAN)
    }

    /// True if any component is NaN
    pub fn is_failed(&self) -> bool {
        self.efficiency.is_nan() || self.fake_rate.is_nan() || self.duplicate_rate.is_nan()
    }

    /// Components in (efficiency, fake rate, duplicate rate) order
    pub fn values(&self) -> [f64; 3] {
        [self.efficiency, self.fake_rate, self.duplicate_rate]
    }
}

/// Weight vector of the comparator
///
/// Positive weights reward, negative weights penalize.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub efficiency: f64,
    pub fake_rate: f64,
    pub duplicate_rate: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            efficiency: 2.0,
            fake_rate: -1.0,
            duplicate_rate: -5.0,
        }
    }
}

impl FitnessWeights {
    /// Create a weight vector
    pub fn new(efficiency: f64, fake_rate: f64, duplicate_rate: f64) -> Self {
        Self {
            efficiency,
            fake_rate,
            duplicate_rate,
        }
    }

    /// Weighted scalar score; NaN if any component is NaN
    pub fn score(&self, fitness: &SeedingFitness) -> f64 {
        self.efficiency * fitness.efficiency
            + self.fake_rate * fitness.fake_rate
            + self.duplicate_rate * fitness.duplicate_rate
    }

    /// Total order over fitness values, greater is better
    ///
    /// NaN scores are strictly worse than every real score and equal to each
    /// other.
    pub fn compare(&self, a: &SeedingFitness, b: &SeedingFitness) -> Ordering {
        compare_scores(self.score(a), self.score(b))
    }

    /// Order over optional fitness; unset is worse than anything set
    pub fn compare_option(
        &self,
        a: Option<&SeedingFitness>,
        b: Option<&SeedingFitness>,
    ) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => self.compare(a, b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }

    /// Strictly better under this comparator
    pub fn is_better(&self, a: &SeedingFitness, b: &SeedingFitness) -> bool {
        self.compare(a, b) == Ordering::Greater
    }
}

fn compare_scores(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.total_cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_weights_score() {
        let w = FitnessWeights::default();
        let f = SeedingFitness::new(90.0, 10.0, 20.0);
        // 2*90 - 10 - 5*20
        assert_relative_eq!(w.score(&f), 70.0);
    }

    #[test]
    fn test_duplicates_penalized_heaviest() {
        let w = FitnessWeights::default();
        let base = SeedingFitness::new(90.0, 10.0, 20.0);
        let more_dups = SeedingFitness::new(92.0, 10.0, 21.0);
        // +2 efficiency (+4) does not pay for +1 duplicate (-5)
        assert!(w.is_better(&base, &more_dups));
    }

    #[test]
    fn test_nan_is_strictly_worst() {
        let w = FitnessWeights::default();
        let failed = SeedingFitness::failed();
        let awful = SeedingFitness::new(0.0, 100.0, 100.0);

        assert_eq!(w.compare(&failed, &awful), Ordering::Less);
        assert_eq!(w.compare(&awful, &failed), Ordering::Greater);
        assert_eq!(w.compare(&failed, &failed), Ordering::Equal);
        assert!(!w.is_better(&failed, &awful));
    }

    #[test]
    fn test_partial_nan_is_failed() {
        let w = FitnessWeights::default();
        let partial = SeedingFitness::new(99.0, f64::NAN, 1.0);
        assert!(partial.is_failed());
        assert_eq!(
            w.compare(&partial, &SeedingFitness::new(0.0, 100.0, 100.0)),
            Ordering::Less
        );
    }

    #[test]
    fn test_unset_fitness_is_worse_than_failed() {
        let w = FitnessWeights::default();
        let failed = SeedingFitness::failed();
        assert_eq!(w.compare_option(None, Some(&failed)), Ordering::Less);
        assert_eq!(w.compare_option(Some(&failed), None), Ordering::Greater);
        assert_eq!(w.compare_option(None, None), Ordering::Equal);
    }

    #[test]
    fn test_custom_weights() {
        let w = FitnessWeights::new(1.0, 0.0, 0.0);
        let a = SeedingFitness::new(80.0, 0.0, 90.0);
        let b = SeedingFitness::new(70.0, 0.0, 0.0);
        assert!(w.is_better(&a, &b));
        assert!(FitnessWeights::default().is_better(&b, &a));
    }
}
