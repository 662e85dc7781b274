//! Engine configuration
//!
//! [`EngineConfig`] holds the scalar knobs shared by every simulation run.
//! Optimizer settings live in [`crate::optimization::ErcConfig`].
//!
//! # Builder
//!
//! ```ignore
//! use riskmc_core::config::EngineBuilder;
//!
//! let mut engine = EngineBuilder::new()
//!     .market(table)
//!     .n_simulations(500)
//!     .alpha(5.0)
//!     .seed(42)
//!     .category("Close")
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub mod builder;

pub use builder::EngineBuilder;

fn default_n_simulations() -> usize {
    1000
}

fn default_n_samples() -> usize {
    365
}

fn default_alpha() -> f64 {
    5.0
}

/// Scenario count, path length and confidence level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of simulated paths per run
    #[serde(default = "default_n_simulations")]
    pub n_simulations: usize,

    /// Rows per simulated path
    #[serde(default = "default_n_samples")]
    pub n_samples: usize,

    /// Tail size in percent, 5 means the worst 5% of scenarios
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            n_simulations: default_n_simulations(),
            n_samples: default_n_samples(),
            alpha: default_alpha(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_simulations == 0 {
            return Err(EngineError::invalid_parameter(
                "n_simulations",
                0.0,
                "must be at least 1",
            ));
        }
        if self.n_samples == 0 {
            return Err(EngineError::invalid_parameter(
                "n_samples",
                0.0,
                "must be at least 1",
            ));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha > 100.0 {
            return Err(EngineError::invalid_parameter(
                "alpha",
                self.alpha,
                "must lie in (0, 100]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.n_simulations, 1000);
        assert_eq!(config.n_samples, 365);
        assert!((config.alpha - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate() {
        assert!(EngineConfig::default().validate().is_ok());
        let bad = EngineConfig {
            alpha: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = EngineConfig {
            n_samples: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
