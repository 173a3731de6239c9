//! Fitness values and evaluation
//!
//! This module provides the fitness triple, the weighted comparator, and the
//! evaluator interface to the external seeding procedure.

pub mod evaluator;
pub mod subprocess;
pub mod traits;

pub mod prelude {
    pub use super::evaluator::*;
    pub use super::subprocess::*;
    pub use super::traits::*;
}
