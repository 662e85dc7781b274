//! Block bootstrap scenario generation
//!
//! Three resampling policies turn a historical [`ReturnMatrix`] into
//! synthetic `samples x N` return paths. Whole rows are always copied
//! together so cross-asset correlation survives resampling.
//!
//! - [`SimulationMethod::Vanilla`]: fixed blocks with uniform starts
//! - [`SimulationMethod::LambdaBias`]: fixed blocks, starts biased toward
//!   portfolio losses
//! - [`SimulationMethod::Stationary`]: geometric block lengths, exponentially
//!   tilted starts, rows wrap around the end of history

mod lambda_bias;
mod stationary;
mod vanilla;

pub use lambda_bias::badness_scores;
pub use stationary::{block_length_distribution, tilt_scores};

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::distr::Distribution;
use rand_distr::Geometric;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::{Matrix, ReturnMatrix, ScenarioSet};
use crate::sampling::{IndexSampler, StartSampler};

pub const DEFAULT_BLOCK_SIZE: usize = 10;
pub const DEFAULT_LAMBDA: f64 = 0.7;
pub const DEFAULT_THETA: f64 = 30.0;

/// Resampling policy with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimulationMethod {
    /// Uniform block bootstrap
    Vanilla { block_size: usize },
    /// Badness-weighted block bootstrap, `lambda` in `[0, 1]`
    LambdaBias { block_size: usize, lambda: f64 },
    /// Stationary bootstrap with exponential tilt, `theta >= 0`
    Stationary { mean_block_size: f64, theta: f64 },
}

impl Default for SimulationMethod {
    fn default() -> Self {
        SimulationMethod::Vanilla {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Method selector without parameters, used for parsing user input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    Vanilla,
    LambdaBias,
    Stationary,
}

impl SimulationKind {
    pub const ALL: [SimulationKind; 3] = [
        SimulationKind::Vanilla,
        SimulationKind::LambdaBias,
        SimulationKind::Stationary,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SimulationKind::Vanilla => "vanilla",
            SimulationKind::LambdaBias => "lambda-bias",
            SimulationKind::Stationary => "stationary",
        }
    }
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimulationKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "vanilla" | "block" => Ok(SimulationKind::Vanilla),
            "lambda" | "lambda-bias" | "lambdabias" => Ok(SimulationKind::LambdaBias),
            "stationary" => Ok(SimulationKind::Stationary),
            _ => Err(EngineError::UnknownSimulationMethod(s.to_string())),
        }
    }
}

impl SimulationMethod {
    /// Build a method from a kind and its two scalar parameters.
    ///
    /// `param1` is the (mean) block size, `param2` is lambda or theta and is
    /// ignored for the vanilla policy.
    pub fn from_params(kind: SimulationKind, param1: f64, param2: f64) -> Result<Self> {
        let method = match kind {
            SimulationKind::Vanilla => SimulationMethod::Vanilla {
                block_size: block_size_param(param1)?,
            },
            SimulationKind::LambdaBias => SimulationMethod::LambdaBias {
                block_size: block_size_param(param1)?,
                lambda: param2,
            },
            SimulationKind::Stationary => SimulationMethod::Stationary {
                mean_block_size: param1,
                theta: param2,
            },
        };
        method.validate()?;
        Ok(method)
    }

    #[must_use]
    pub fn kind(&self) -> SimulationKind {
        match self {
            SimulationMethod::Vanilla { .. } => SimulationKind::Vanilla,
            SimulationMethod::LambdaBias { .. } => SimulationKind::LambdaBias,
            SimulationMethod::Stationary { .. } => SimulationKind::Stationary,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            SimulationMethod::Vanilla { block_size } => check_block_size(block_size),
            SimulationMethod::LambdaBias { block_size, lambda } => {
                check_block_size(block_size)?;
                if !(0.0..=1.0).contains(&lambda) {
                    return Err(EngineError::invalid_parameter(
                        "lambda",
                        lambda,
                        "must lie in [0, 1]",
                    ));
                }
                Ok(())
            }
            SimulationMethod::Stationary {
                mean_block_size,
                theta,
            } => {
                if !mean_block_size.is_finite() || mean_block_size <= 0.0 {
                    return Err(EngineError::invalid_parameter(
                        "mean_block_size",
                        mean_block_size,
                        "must be positive",
                    ));
                }
                if !theta.is_finite() || theta < 0.0 {
                    return Err(EngineError::invalid_parameter(
                        "theta",
                        theta,
                        "must be finite and non-negative",
                    ));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SimulationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationMethod::Vanilla { block_size } => write!(f, "vanilla(block={block_size})"),
            SimulationMethod::LambdaBias { block_size, lambda } => {
                write!(f, "lambda-bias(block={block_size}, lambda={lambda})")
            }
            SimulationMethod::Stationary {
                mean_block_size,
                theta,
            } => write!(f, "stationary(mean_block={mean_block_size}, theta={theta})"),
        }
    }
}

fn block_size_param(value: f64) -> Result<usize> {
    if !value.is_finite() || value < 1.0 {
        return Err(EngineError::invalid_parameter(
            "block_size",
            value,
            "must be at least 1",
        ));
    }
    Ok(value.round() as usize)
}

fn check_block_size(block_size: usize) -> Result<()> {
    if block_size == 0 {
        return Err(EngineError::invalid_parameter(
            "block_size",
            0.0,
            "must be at least 1",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum BlockLength {
    Fixed(usize),
    Geometric(Geometric),
}

impl BlockLength {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            BlockLength::Fixed(len) => *len,
            BlockLength::Geometric(dist) => {
                let failures: u64 = dist.sample(rng);
                usize::try_from(failures).unwrap_or(usize::MAX).saturating_add(1)
            }
        }
    }
}

/// Prepared resampler for one (method, returns, weights) combination.
///
/// Start scores depend on the weights, so a sampler must be rebuilt whenever
/// the portfolio weights change.
#[derive(Debug, Clone)]
pub struct ScenarioSampler<'a> {
    source: &'a Matrix,
    starts: StartSampler,
    length: BlockLength,
}

impl<'a> ScenarioSampler<'a> {
    pub fn new(method: &SimulationMethod, returns: &'a ReturnMatrix, weights: &[f64]) -> Result<Self> {
        method.validate()?;
        if weights.len() != returns.num_assets() {
            return Err(EngineError::InvalidWeights(format!(
                "expected {} weights, got {}",
                returns.num_assets(),
                weights.len()
            )));
        }

        let periods = returns.num_periods();
        let (starts, length) = match *method {
            SimulationMethod::Vanilla { block_size } => {
                let block = block_size.min(periods);
                (vanilla::start_sampler(periods, block), BlockLength::Fixed(block))
            }
            SimulationMethod::LambdaBias { block_size, lambda } => {
                let block = block_size.min(periods);
                let scores = badness_scores(returns, weights, block, lambda);
                (StartSampler::from_scores(&scores), BlockLength::Fixed(block))
            }
            SimulationMethod::Stationary {
                mean_block_size,
                theta,
            } => {
                let scores = tilt_scores(returns, weights, theta);
                (
                    StartSampler::from_scores(&scores),
                    BlockLength::Geometric(block_length_distribution(mean_block_size)?),
                )
            }
        };

        Ok(Self {
            source: returns.returns(),
            starts,
            length,
        })
    }

    /// Start-index distribution in use.
    #[must_use]
    pub fn starts(&self) -> &StartSampler {
        &self.starts
    }

    /// Draw one `samples x N` path.
    pub fn sample<R: Rng + ?Sized>(&self, samples: usize, rng: &mut R) -> Matrix {
        fill_blocks(self.source, samples, rng, |rng| {
            (self.starts.sample_index(rng), self.length.draw(rng))
        })
    }
}

/// Copy blocks of source rows into a `samples`-row matrix.
///
/// `next_block` yields `(start, length)`. Rows are read modulo the source
/// length and the last block is truncated to fit exactly.
fn fill_blocks<R, F>(source: &Matrix, samples: usize, rng: &mut R, mut next_block: F) -> Matrix
where
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> (usize, usize),
{
    let periods = source.rows();
    let mut out = Matrix::with_capacity(source.cols(), samples);
    if periods == 0 {
        return out;
    }

    while out.rows() < samples {
        let (start, len) = next_block(rng);
        let take = len.max(1).min(samples - out.rows());
        for k in 0..take {
            out.push_row(source.row((start + k) % periods));
        }
    }
    out
}

/// Generate a single scenario path.
pub fn generate_scenario<R: Rng + ?Sized>(
    method: &SimulationMethod,
    returns: &ReturnMatrix,
    weights: &[f64],
    samples: usize,
    rng: &mut R,
) -> Result<Matrix> {
    check_samples(samples)?;
    Ok(ScenarioSampler::new(method, returns, weights)?.sample(samples, rng))
}

/// Generate `n_simulations` independent paths from one RNG stream.
pub fn generate_scenarios<R: Rng + ?Sized>(
    method: &SimulationMethod,
    returns: &ReturnMatrix,
    weights: &[f64],
    samples: usize,
    n_simulations: usize,
    rng: &mut R,
) -> Result<ScenarioSet> {
    check_samples(samples)?;
    if n_simulations == 0 {
        return Err(EngineError::invalid_parameter(
            "n_simulations",
            0.0,
            "must be at least 1",
        ));
    }

    let sampler = ScenarioSampler::new(method, returns, weights)?;
    let mut scenarios = ScenarioSet::with_capacity(n_simulations);
    for _ in 0..n_simulations {
        scenarios.push(sampler.sample(samples, rng));
    }

    tracing::trace!(%method, n_simulations, samples, "generated scenario batch");
    Ok(scenarios)
}

fn check_samples(samples: usize) -> Result<()> {
    if samples == 0 {
        return Err(EngineError::invalid_parameter(
            "n_samples",
            0.0,
            "must be at least 1",
        ));
    }
    Ok(())
}
