//! Integration tests for the simulation engine
//!
//! Tests are organized by topic:
//! - `scenarios` - Block structure and shape of generated paths
//! - `risk_measures` - Quantile selection, VaR and ES decomposition
//! - `erc` - Optimizer trajectory, fixed point and ensembles
//! - `engine` - Engine state, selection and weight validation

mod common;
mod erc;
mod scenarios;
