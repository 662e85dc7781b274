//! ERC optimizer settings

use serde::{Deserialize, Serialize};

use crate::bootstrap::SimulationMethod;
use crate::error::{EngineError, Result};

fn default_max_iterations() -> usize {
    50
}

fn default_tol() -> f64 {
    1e-4
}

fn default_eps_rc() -> f64 {
    1e-10
}

fn default_damping() -> f64 {
    0.5
}

/// Settings for the equal-risk-contribution fixed-point iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErcConfig {
    /// Iteration budget; running out is not an error
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Resampling policy used to regenerate scenarios each iteration
    #[serde(default)]
    pub method: SimulationMethod,

    /// Tolerance on `max |rc_i - ES/N| / ES`
    #[serde(default = "default_tol")]
    pub tol: f64,

    /// Floor applied to contributions before dividing by them
    #[serde(default = "default_eps_rc")]
    pub eps_rc: f64,

    /// Blend factor in `(0, 1]`, 1 means no damping
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Log every iteration at info level instead of debug
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ErcConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            method: SimulationMethod::default(),
            tol: default_tol(),
            eps_rc: default_eps_rc(),
            damping: default_damping(),
            verbose: false,
        }
    }
}

impl ErcConfig {
    pub fn validate(&self) -> Result<()> {
        self.method.validate()?;
        if !self.tol.is_finite() || self.tol < 0.0 {
            return Err(EngineError::invalid_parameter(
                "tol",
                self.tol,
                "must be finite and non-negative",
            ));
        }
        if !self.eps_rc.is_finite() || self.eps_rc <= 0.0 {
            return Err(EngineError::invalid_parameter(
                "eps_rc",
                self.eps_rc,
                "must be positive",
            ));
        }
        if !self.damping.is_finite() || self.damping <= 0.0 || self.damping > 1.0 {
            return Err(EngineError::invalid_parameter(
                "damping",
                self.damping,
                "must lie in (0, 1]",
            ));
        }
        Ok(())
    }
}
