//! Genetic operators
//!
//! This module provides selection and mutation operators.

pub mod mutation;
pub mod selection;
pub mod traits;

pub mod prelude {
    pub use super::mutation::*;
    pub use super::selection::*;
    pub use super::traits::*;
}
