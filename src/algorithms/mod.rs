//! Evolutionary algorithms
//!
//! This module provides the generational tuning loop.

pub mod generational;

pub mod prelude {
    pub use super::generational::*;
}
