//! # seed-evo
//!
//! Evolutionary tuning of track-seeding hyperparameters.
//!
//! The seeding procedure is an opaque program. This library drives it with a
//! generational genetic algorithm that trades off three objectives at once:
//! maximize efficiency, minimize fake rate, minimize duplicate rate.
//!
//! ## Core Concepts
//!
//! - **Normalized genomes**: genes live in a bounded normalized domain and are
//!   scaled to actual units (optionally truncated to integers) only when
//!   handed to the evaluator
//! - **Lazy fitness**: only offspring changed by mutation are re-evaluated,
//!   in parallel on a fixed worker pool
//! - **Weighted comparator**: `2·efficiency − fake rate − 5·duplicate rate`;
//!   failed evaluations are NaN and lose every comparison
//! - **Hall of fame**: the best-ever configurations survive generational
//!   replacement
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use seed_evo::prelude::*;
//! use rand::SeedableRng;
//!
//! let space = ParameterSpace::seed_finder();
//! let seed = SeedConfig::from_path("my_guess.json")?.genome(&space)?;
//! let config = RunConfig::from_path("run.json")?;
//!
//! let mut evaluator = SubprocessEvaluator::new("/opt/acts/bin/seeding")
//!     .with_args(["--output-ML", "True"]);
//! if let Some(timeout) = config.evaluation_timeout() {
//!     evaluator = evaluator.with_timeout(timeout);
//! }
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let result = config.build_ga(space, evaluator)?.run(&seed, &mut rng)?;
//! println!("{}", result.summary());
//! ```

pub mod algorithms;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod operators;
pub mod population;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::config::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::termination::prelude::*;
}
