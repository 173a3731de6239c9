//! Population management
//!
//! This module provides the Individual, Population and HallOfFame types.

pub mod hall_of_fame;
pub mod individual;
#[allow(clippy::module_inception)]
pub mod population;

pub mod prelude {
    pub use super::hall_of_fame::*;
    pub use super::individual::*;
    pub use super::population::*;
}
