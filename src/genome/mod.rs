//! Genome representation
//!
//! This module provides the normalized genome, its bounds, and the parameter
//! space that maps it to actual units.

pub mod bounds;
pub mod parameter_space;
pub mod real_vector;

pub mod prelude {
    pub use super::bounds::*;
    pub use super::parameter_space::*;
    pub use super::real_vector::*;
}
