//! Tunable parameter space
//!
//! The optimizer searches in a normalized domain where every gene is drawn
//! from the same mutation distribution. Each parameter carries a scaling
//! factor that maps a normalized gene to the value the seeding procedure
//! actually receives:
//!
//! ```text
//! actual = normalized * factor                 (real parameters)
//! actual = trunc(normalized * factor)          (integer parameters)
//! ```
//!
//! Integer parameters are truncated toward zero, never rounded.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParameterSpaceError;
use crate::genome::bounds::{Bounds, MultiBounds};
use crate::genome::real_vector::RealVector;

/// Description of one tunable parameter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Name as understood by the seeding procedure
    pub name: String,
    /// Multiplier from normalized to actual units
    pub scaling_factor: f64,
    /// Lower bound of the normalized gene
    pub min: f64,
    /// Upper bound of the normalized gene
    pub max: f64,
    /// Whether the actual value is an integer
    #[serde(default)]
    pub integer: bool,
}

impl ParameterDescriptor {
    /// Real-valued parameter
    pub fn real(name: impl Into<String>, scaling_factor: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            scaling_factor,
            min,
            max,
            integer: false,
        }
    }

    /// Integer-valued parameter
    pub fn integer(name: impl Into<String>, scaling_factor: f64, min: f64, max: f64) -> Self {
        Self {
            integer: true,
            ..Self::real(name, scaling_factor, min, max)
        }
    }

    /// Map a normalized gene to actual units
    pub fn to_actual(&self, normalized: f64) -> ActualValue {
        let scaled = normalized * self.scaling_factor;
        if self.integer {
            ActualValue::Integer(scaled.trunc() as i64)
        } else {
            ActualValue::Real(scaled)
        }
    }
}

/// A parameter value in the units of the seeding procedure
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ActualValue {
    /// Real-valued parameter
    Real(f64),
    /// Integer parameter (truncated)
    Integer(i64),
}

impl ActualValue {
    /// Value as f64
    pub fn as_f64(&self) -> f64 {
        match self {
            ActualValue::Real(v) => *v,
            ActualValue::Integer(v) => *v as f64,
        }
    }

    /// Value as i64, for integer parameters only
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ActualValue::Integer(v) => Some(*v),
            ActualValue::Real(_) => None,
        }
    }
}

impl fmt::Display for ActualValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActualValue::Real(v) => write!(f, "{}", v),
            ActualValue::Integer(v) => write!(f, "{}", v),
        }
    }
}

/// A named parameter value handed to the evaluator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterAssignment {
    /// Parameter name
    pub name: String,
    /// Value in actual units
    pub value: ActualValue,
}

/// Immutable, validated set of tunable parameters
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterSpace {
    descriptors: Vec<ParameterDescriptor>,
}

impl ParameterSpace {
    /// Build a space from parallel per-parameter lists
    ///
    /// Fails if the lists do not all have the same length.
    pub fn new(
        names: &[&str],
        factors: &[f64],
        mins: &[f64],
        maxs: &[f64],
        integer_flags: &[bool],
    ) -> Result<Self, ParameterSpaceError> {
        let n = names.len();
        if factors.len() != n || mins.len() != n || maxs.len() != n || integer_flags.len() != n {
            return Err(ParameterSpaceError::LengthMismatch {
                names: n,
                factors: factors.len(),
                mins: mins.len(),
                maxs: maxs.len(),
                integer_flags: integer_flags.len(),
            });
        }

        let descriptors = (0..n)
            .map(|i| ParameterDescriptor {
                name: names[i].to_string(),
                scaling_factor: factors[i],
                min: mins[i],
                max: maxs[i],
                integer: integer_flags[i],
            })
            .collect();
        Self::from_descriptors(descriptors)
    }

    /// Build a space from descriptors
    pub fn from_descriptors(
        descriptors: Vec<ParameterDescriptor>,
    ) -> Result<Self, ParameterSpaceError> {
        if descriptors.is_empty() {
            return Err(ParameterSpaceError::Empty);
        }

        let mut seen = HashSet::new();
        for d in &descriptors {
            if !seen.insert(d.name.as_str()) {
                return Err(ParameterSpaceError::DuplicateName(d.name.clone()));
            }
            if Bounds::checked(d.min, d.max).is_none() {
                return Err(ParameterSpaceError::InvalidBounds {
                    name: d.name.clone(),
                    min: d.min,
                    max: d.max,
                });
            }
            if !d.scaling_factor.is_finite() {
                return Err(ParameterSpaceError::InvalidFactor {
                    name: d.name.clone(),
                    factor: d.scaling_factor,
                });
            }
        }

        Ok(Self { descriptors })
    }

    /// The seven seed-finder parameters of the track-seeding tuning campaign
    pub fn seed_finder() -> Self {
        let descriptors = vec![
            ParameterDescriptor::real("maxPt", 30000.0, 0.1, 100.0),
            ParameterDescriptor::real("impactMax", 1.1, 0.1, 100.0),
            ParameterDescriptor::real("deltaRMin", 0.25, 0.1, 100.0),
            ParameterDescriptor::real("sigmaScattering", 4.0, 0.1, 100.0),
            ParameterDescriptor::real("deltaRMax", 60.0, 0.1, 100.0),
            ParameterDescriptor::integer("maxSeedsPerSpM", 1.0, 1.0, 100.0),
            ParameterDescriptor::real("radLengthPerSeed", 0.0023, 0.1, 100.0),
        ];
        Self { descriptors }
    }

    /// Number of parameters (genome dimension)
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Always false for a constructed space
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors in genome order
    pub fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }

    /// Parameter names in genome order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    /// Position of a parameter in the genome
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.name == name)
    }

    /// Per-gene bounds
    pub fn bounds(&self) -> MultiBounds {
        self.descriptors
            .iter()
            .map(|d| Bounds::new(d.min, d.max))
            .collect()
    }

    /// Map normalized genes to actual values, in genome order
    pub fn to_actual(&self, genes: &[f64]) -> Vec<ActualValue> {
        self.descriptors
            .iter()
            .zip(genes)
            .map(|(d, &g)| d.to_actual(g))
            .collect()
    }

    /// Named actual values for one genome
    pub fn assignments(&self, genome: &RealVector) -> Vec<ParameterAssignment> {
        self.descriptors
            .iter()
            .zip(genome.genes())
            .map(|(d, &g)| ParameterAssignment {
                name: d.name.clone(),
                value: d.to_actual(g),
            })
            .collect()
    }
}

impl<'de> Deserialize<'de> for ParameterSpace {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            descriptors: Vec<ParameterDescriptor>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::from_descriptors(raw.descriptors).map_err(serde::de::Error::custom)
    }
}
