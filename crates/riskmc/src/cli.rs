//! Command-line arguments

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use jiff::civil::Date;
use riskmc_core::bootstrap::{DEFAULT_BLOCK_SIZE, DEFAULT_LAMBDA, DEFAULT_THETA};
use riskmc_core::{RiskMeasure, SimulationKind, SimulationMethod};

use crate::loader::LoadOptions;
use crate::run_config::RunConfig;

#[derive(Parser, Debug)]
#[command(name = "riskmc")]
#[command(about = "Bootstrap Monte Carlo tail risk and equal-risk-contribution weights")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate once and print VaR/ES with per-asset contributions
    Risk(RiskArgs),
    /// Solve for equal-risk-contribution weights
    Erc(ErcArgs),
    /// ERC ensembles on growing fractions of the history
    Progressive(ProgressiveArgs),
}

/// Options shared by every sub-command
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Market CSV file
    pub data: PathBuf,

    /// YAML run configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Category to build returns from (e.g. Close)
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of simulated paths
    #[arg(short = 'n', long)]
    pub simulations: Option<usize>,

    /// Rows per simulated path
    #[arg(long)]
    pub samples: Option<usize>,

    /// Tail size in percent
    #[arg(short, long)]
    pub alpha: Option<f64>,

    /// First date to load (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<Date>,

    /// Last date to load (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<Date>,

    /// Print JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

impl CommonArgs {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            start: self.start,
            end: self.end,
        }
    }

    /// Read the config file if given and apply flag overrides.
    pub fn run_config(&self) -> color_eyre::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        if let Some(category) = &self.category {
            config.category.clone_from(category);
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(n) = self.simulations {
            config.engine.n_simulations = n;
        }
        if let Some(n) = self.samples {
            config.engine.n_samples = n;
        }
        if let Some(alpha) = self.alpha {
            config.engine.alpha = alpha;
        }
        Ok(config)
    }
}

/// Resampling method selection
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct MethodArgs {
    /// vanilla, lambda-bias or stationary
    #[arg(short, long)]
    pub method: Option<SimulationKind>,

    /// Block size, or mean block size for stationary
    #[arg(long)]
    pub block_size: Option<f64>,

    /// Lambda for lambda-bias, theta for stationary
    #[arg(long)]
    pub param: Option<f64>,
}

impl MethodArgs {
    /// Method from flags, falling back to `current` for anything not given.
    pub fn resolve(&self, current: SimulationMethod) -> riskmc_core::Result<SimulationMethod> {
        if self.method.is_none() && self.block_size.is_none() && self.param.is_none() {
            return Ok(current);
        }
        let kind = self.method.unwrap_or(current.kind());
        let (block, param) = if kind == current.kind() {
            method_params(current)
        } else {
            default_params(kind)
        };
        SimulationMethod::from_params(
            kind,
            self.block_size.unwrap_or(block),
            self.param.unwrap_or(param),
        )
    }
}

fn method_params(method: SimulationMethod) -> (f64, f64) {
    match method {
        SimulationMethod::Vanilla { block_size } => (block_size as f64, 0.0),
        SimulationMethod::LambdaBias { block_size, lambda } => (block_size as f64, lambda),
        SimulationMethod::Stationary {
            mean_block_size,
            theta,
        } => (mean_block_size, theta),
    }
}

fn default_params(kind: SimulationKind) -> (f64, f64) {
    match kind {
        SimulationKind::Vanilla => (DEFAULT_BLOCK_SIZE as f64, 0.0),
        SimulationKind::LambdaBias => (DEFAULT_BLOCK_SIZE as f64, DEFAULT_LAMBDA),
        SimulationKind::Stationary => (DEFAULT_BLOCK_SIZE as f64, DEFAULT_THETA),
    }
}

/// Optimizer overrides
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct OptimizerArgs {
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Tolerance on the relative contribution spread
    #[arg(long)]
    pub tol: Option<f64>,

    #[arg(long)]
    pub eps_rc: Option<f64>,

    /// Blend factor in (0, 1]
    #[arg(long)]
    pub damping: Option<f64>,

    /// Log every iteration at info level
    #[arg(short, long)]
    pub verbose: bool,
}

impl OptimizerArgs {
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(n) = self.max_iterations {
            config.erc.max_iterations = n;
        }
        if let Some(tol) = self.tol {
            config.erc.tol = tol;
        }
        if let Some(eps) = self.eps_rc {
            config.erc.eps_rc = eps;
        }
        if let Some(damping) = self.damping {
            config.erc.damping = damping;
        }
        if self.verbose {
            config.erc.verbose = true;
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RiskArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub method: MethodArgs,

    /// Only report this measure (var or es); both when absent
    #[arg(long)]
    pub measure: Option<RiskMeasure>,

    /// Comma-separated portfolio weights; equal weights when absent
    #[arg(short, long, value_delimiter = ',')]
    pub weights: Option<Vec<f64>>,

    /// Print a portfolio loss histogram with this many bins
    #[arg(long)]
    pub histogram: Option<usize>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ErcArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub method: MethodArgs,

    #[command(flatten)]
    pub optimizer: OptimizerArgs,

    /// Average this many independently seeded runs
    #[arg(long)]
    pub ensemble: Option<usize>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ProgressiveArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub optimizer: OptimizerArgs,

    /// Ensemble size per method and fraction
    #[arg(long)]
    pub members: Option<usize>,

    /// Comma-separated dataset fractions in (0, 1]
    #[arg(long, value_delimiter = ',')]
    pub fractions: Option<Vec<f64>>,
}
