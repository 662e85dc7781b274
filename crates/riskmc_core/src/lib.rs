//! Bootstrap Monte Carlo tail risk and equal-risk-contribution weights
//!
//! This crate estimates portfolio tail risk from historical returns by
//! resampling them into synthetic paths, and derives risk-balanced weights
//! from those estimates. It supports:
//! - Return matrices built from a date/category/ticker market table
//! - Vanilla, loss-biased (lambda) and exponentially tilted stationary block bootstraps
//! - Value-at-Risk and Expected Shortfall with per-asset marginal contributions
//! - A damped multiplicative ERC optimizer, plus seeded parallel ensembles
//!
//! # Example
//!
//! ```ignore
//! use riskmc_core::{EngineBuilder, ErcConfig, RiskMeasure, SimulationMethod};
//!
//! let mut engine = EngineBuilder::new()
//!     .market(table)
//!     .seed(7)
//!     .category("Close")
//!     .build()?;
//!
//! let method = SimulationMethod::LambdaBias { block_size: 10, lambda: 0.7 };
//! engine.run_simulation(&method)?;
//! let es = engine.compute_risk_contributions(RiskMeasure::ES)?;
//!
//! let outcome = engine.solve_erc(&ErcConfig { method, ..Default::default() }, None)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod bootstrap;
pub mod error;
pub mod optimization;
pub mod risk;
pub mod sampling;
pub mod simulation;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use bootstrap::{SimulationKind, SimulationMethod};
pub use config::{EngineBuilder, EngineConfig};
pub use error::{EngineError, Result};
pub use model::{AssetList, MarketTable, ReturnMatrix, RiskMeasure, RiskResult, WeightVector};
pub use optimization::{ErcConfig, ErcOutcome, solve_erc};
pub use simulation::SimulationEngine;
