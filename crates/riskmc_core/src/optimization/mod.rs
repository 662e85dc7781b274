//! Equal-risk-contribution optimization
//!
//! [`solve_erc`] runs the damped fixed-point iteration on one engine.
//! [`solve_erc_ensemble`] and [`progressive_erc`] run several independently
//! seeded engines and average their weights.
//!
//! # Example
//!
//! ```ignore
//! use riskmc_core::optimization::{ErcConfig, solve_erc};
//! use riskmc_core::bootstrap::SimulationMethod;
//!
//! let config = ErcConfig {
//!     method: SimulationMethod::Stationary { mean_block_size: 10.0, theta: 30.0 },
//!     tol: 1e-3,
//!     ..Default::default()
//! };
//! let outcome = solve_erc(&mut engine, &config, None)?;
//! println!("weights: {:?}", outcome.weights);
//! ```

mod config;
mod ensemble;
mod erc;
mod result;

pub use config::ErcConfig;
pub use ensemble::{
    DEFAULT_FRACTIONS, EnsembleOutcome, ProgressiveRow, ProgressiveSettings, progressive_erc,
    solve_erc_ensemble,
};
pub use erc::{
    ErcStep, ProgressCallback, evaluate_weights, multiplicative_update, relative_deviation,
    solve_erc,
};
pub use result::{ConvergenceHistory, ErcOutcome, IterationRecord, TerminationReason};
