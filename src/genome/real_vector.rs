//! Normalized real-valued genome
//!
//! A genome is the optimizer-internal view of one candidate parameter set:
//! one real number per tunable parameter, in the normalized domain. The
//! [`ParameterSpace`](crate::genome::parameter_space::ParameterSpace) maps it
//! to actual units.

use serde::{Deserialize, Serialize};

/// Fixed-length vector of normalized genes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RealVector {
    genes: Vec<f64>,
}

impl RealVector {
    /// Create a new genome from its genes
    pub fn new(genes: Vec<f64>) -> Self {
        Self { genes }
    }

    /// Genome with every gene set to the same value
    pub fn filled(dimension: usize, value: f64) -> Self {
        Self {
            genes: vec![value; dimension],
        }
    }

    /// Number of genes
    pub fn dimension(&self) -> usize {
        self.genes.len()
    }

    /// Read access to the genes
    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    /// Write access to the genes
    pub fn genes_mut(&mut self) -> &mut [f64] {
        &mut self.genes
    }

    /// Take the genes out
    pub fn into_inner(self) -> Vec<f64> {
        self.genes
    }

    /// Euclidean distance to another genome of the same dimension
    pub fn distance(&self, other: &Self) -> f64 {
        self.genes
            .iter()
            .zip(&other.genes)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl std::ops::Index<usize> for RealVector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.genes[index]
    }
}

impl std::ops::IndexMut<usize> for RealVector {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.genes[index]
    }
}

impl From<Vec<f64>> for RealVector {
    fn from(genes: Vec<f64>) -> Self {
        Self { genes }
    }
}

impl<const N: usize> From<[f64; N]> for RealVector {
    fn from(arr: [f64; N]) -> Self {
        Self {
            genes: arr.to_vec(),
        }
    }
}

impl<'a> IntoIterator for &'a RealVector {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.genes.iter()
    }
}
