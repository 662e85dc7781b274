//! YAML run configuration
//!
//! Every field is optional in the file; command-line flags are applied on
//! top of whatever was read.

use std::path::Path;

use color_eyre::eyre::{WrapErr, eyre};
use riskmc_core::optimization::DEFAULT_FRACTIONS;
use riskmc_core::{EngineConfig, ErcConfig, SimulationMethod};
use serde::{Deserialize, Serialize};

fn default_category() -> String {
    "Close".to_string()
}

fn default_members() -> usize {
    4
}

fn default_fractions() -> Vec<f64> {
    DEFAULT_FRACTIONS.to_vec()
}

fn default_methods() -> Vec<SimulationMethod> {
    vec![
        SimulationMethod::Vanilla { block_size: 15 },
        SimulationMethod::LambdaBias {
            block_size: 15,
            lambda: 0.5,
        },
        SimulationMethod::Stationary {
            mean_block_size: 10.0,
            theta: 30.0,
        },
    ]
}

/// Settings for one `riskmc` invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Market data category to build returns from
    #[serde(default = "default_category")]
    pub category: String,

    /// Fixed seed; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub engine: EngineConfig,

    /// Optimizer settings, `erc.method` is the method for `risk` and `erc`
    #[serde(default)]
    pub erc: ErcConfig,

    /// Ensemble size for `progressive`
    #[serde(default = "default_members")]
    pub members: usize,

    #[serde(default = "default_fractions")]
    pub fractions: Vec<f64>,

    /// Methods solved by `progressive`, in order
    #[serde(default = "default_methods")]
    pub methods: Vec<SimulationMethod>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            category: default_category(),
            seed: None,
            engine: EngineConfig::default(),
            erc: ErcConfig::default(),
            members: default_members(),
            fractions: default_fractions(),
            methods: default_methods(),
        }
    }
}

impl RunConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .map_err(|e| eyre!("failed to parse config {}: {e}", path.display()))?;
        tracing::debug!(path = %path.display(), "run config loaded");
        Ok(config)
    }

    /// Check every nested setting.
    pub fn validate(&self) -> riskmc_core::Result<()> {
        self.engine.validate()?;
        self.erc.validate()?;
        for method in &self.methods {
            method.validate()?;
        }
        Ok(())
    }
}
