//! Hall of fame
//!
//! Best-ever individuals across a whole run, kept independently of the
//! population that produced them.

use serde::{Deserialize, Serialize};

use crate::fitness::traits::FitnessWeights;
use crate::population::individual::Individual;

/// Capacity-bounded, best-first record of the best individuals ever seen
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HallOfFame {
    capacity: usize,
    entries: Vec<Individual>,
}

impl HallOfFame {
    /// Create an empty hall with room for `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if the hall is at capacity
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Best individual ever recorded
    pub fn best(&self) -> Option<&Individual> {
        self.entries.first()
    }

    /// Worst retained individual
    pub fn worst(&self) -> Option<&Individual> {
        self.entries.last()
    }

    /// Entries, best first
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.entries.iter()
    }

    /// Entries, best first
    pub fn entries(&self) -> &[Individual] {
        &self.entries
    }

    /// Offer every individual, in order, to the hall
    ///
    /// An individual gets in when the hall is not full or it is strictly
    /// better than the worst entry. Entries with a genome already present are
    /// skipped. Unevaluated individuals are ignored. Returns how many were
    /// inserted.
    pub fn update<'a, I>(&mut self, individuals: I, weights: &FitnessWeights) -> usize
    where
        I: IntoIterator<Item = &'a Individual>,
    {
        if self.capacity == 0 {
            return 0;
        }

        let mut inserted = 0;
        for candidate in individuals {
            if !candidate.is_evaluated() {
                continue;
            }
            if self.is_full() {
                match self.entries.last() {
                    Some(worst) if candidate.is_better_than(worst, weights) => {}
                    _ => continue,
                }
            }
            if self.entries.iter().any(|e| e.genome == candidate.genome) {
                continue;
            }

            // After all entries that are at least as good, so earlier arrivals win ties.
            let position = self
                .entries
                .iter()
                .position(|e| candidate.is_better_than(e, weights))
                .unwrap_or(self.entries.len());
            self.entries.insert(position, candidate.clone());
            self.entries.truncate(self.capacity);
            inserted += 1;
        }
        inserted
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a HallOfFame {
    type Item = &'a Individual;
    type IntoIter = std::slice::Iter<'a, Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
