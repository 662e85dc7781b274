use rand_distr::Geometric;

use crate::error::{EngineError, Result};
use crate::model::ReturnMatrix;

const MIN_SUCCESS_PROBABILITY: f64 = 1e-9;

/// Geometric distribution of block-length failures for a given mean length.
///
/// The success probability `1 / mean` is clamped to `[1e-9, 1]`; callers add
/// one to each draw so every block has at least one row.
pub fn block_length_distribution(mean_block_size: f64) -> Result<Geometric> {
    let p = (1.0 / mean_block_size).clamp(MIN_SUCCESS_PROBABILITY, 1.0);
    Geometric::new(p).map_err(|_| {
        EngineError::invalid_parameter("mean_block_size", mean_block_size, "must be positive")
    })
}

/// Exponentially tilted start scores `exp(theta * max(0, -r_p))` over every row.
///
/// The exponent is shifted by its maximum before exponentiating, which leaves
/// the normalized distribution unchanged.
#[must_use]
pub fn tilt_scores(returns: &ReturnMatrix, weights: &[f64], theta: f64) -> Vec<f64> {
    let exponents: Vec<f64> = returns
        .portfolio_returns(weights, returns.num_periods())
        .into_iter()
        .map(|r| theta * (-r).max(0.0))
        .collect();
    let max = exponents.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    exponents.into_iter().map(|x| (x - max).exp()).collect()
}
