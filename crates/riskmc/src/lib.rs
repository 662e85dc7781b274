//! Command-line front end for `riskmc_core`
//!
//! Loads Yahoo-Finance style market CSV files, runs scenario risk,
//! ERC optimization or progressive ensembles, and prints tables or JSON.

#![warn(clippy::all)]

pub mod cli;
pub mod commands;
pub mod loader;
pub mod logging;
pub mod report;
pub mod run_config;

pub use loader::{LoadError, LoadOptions, load_market_csv};
pub use logging::init_logging;
pub use run_config::RunConfig;
