//! Error types for seed-evo
//!
//! This module defines all error types used throughout the library.
//! Evaluation failures are not errors of the run: they live in
//! [`crate::fitness::evaluator::EvaluationFailure`] and only ever turn an
//! individual's fitness into NaN.

use thiserror::Error;

/// Error type for parameter space construction
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterSpaceError {
    /// The per-parameter lists do not have the same length
    #[error("Mismatched parameter definition: {names} names, {factors} factors, {mins} lower bounds, {maxs} upper bounds, {integer_flags} integer flags")]
    LengthMismatch {
        names: usize,
        factors: usize,
        mins: usize,
        maxs: usize,
        integer_flags: usize,
    },

    /// No parameters were given
    #[error("Parameter space is empty")]
    Empty,

    /// The same name appears twice
    #[error("Duplicate parameter name: {0}")]
    DuplicateName(String),

    /// Lower bound above upper bound, or a non-finite bound
    #[error("Invalid bounds for {name}: [{min}, {max}]")]
    InvalidBounds { name: String, min: f64, max: f64 },

    /// Non-finite scaling factor
    #[error("Invalid scaling factor for {name}: {factor}")]
    InvalidFactor { name: String, factor: f64 },
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Invalid operator configuration
    #[error("Invalid operator configuration: {0}")]
    InvalidConfiguration(String),
}

/// Error type for loading configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error while reading a configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A seed value names a parameter the space does not know
    #[error("Unknown parameter in seed: {0}")]
    UnknownParameter(String),

    /// The seed does not provide a value for a parameter
    #[error("Missing seed value for parameter: {0}")]
    MissingParameter(String),

    /// Positional seed has the wrong number of values
    #[error("Seed dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Top-level error type for evolution operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Parameter space error
    #[error("Parameter space error: {0}")]
    ParameterSpace(#[from] ParameterSpaceError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Configuration loading error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;
