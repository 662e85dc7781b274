//! Equal-risk-contribution optimizer
//!
//! The risk measure is only available through re-simulation, and the biased
//! resampling policies depend on the current weights, so there is no gradient
//! to follow. Each iteration regenerates scenarios, measures ES contributions
//! and applies a damped multiplicative update pulling every contribution
//! toward `ES / N`.

use crate::bootstrap::SimulationMethod;
use crate::error::{EngineError, Result};
use crate::model::{RiskMeasure, WeightVector};
use crate::simulation::SimulationEngine;

use super::config::ErcConfig;
use super::result::{ConvergenceHistory, ErcOutcome, IterationRecord, TerminationReason};

/// Progress callback invoked after every evaluated iteration
pub type ProgressCallback = Box<dyn Fn(&IterationRecord) + Send + Sync>;

/// ES decomposition of one set of weights
#[derive(Debug, Clone, PartialEq)]
pub struct ErcStep {
    pub contributions: Vec<f64>,
    pub expected_shortfall: f64,
    pub target: f64,
    pub rel_dev: f64,
}

/// Largest distance of any contribution from `target`, relative to `es`.
///
/// Falls back to the raw distance when `es` is not positive.
#[must_use]
pub fn relative_deviation(contributions: &[f64], target: f64, es: f64) -> f64 {
    let max_dev = contributions
        .iter()
        .map(|rc| (rc - target).abs())
        .fold(0.0, f64::max);
    if es > 0.0 { max_dev / es } else { max_dev }
}

/// One damped multiplicative update.
///
/// `w'_i = w_i * target / max(rc_i, eps_rc)`, renormalized (uniform if
/// nothing positive remains), then blended as `(1 - damping) w + damping w'`.
#[must_use]
pub fn multiplicative_update(
    weights: &[f64],
    contributions: &[f64],
    target: f64,
    eps_rc: f64,
    damping: f64,
) -> WeightVector {
    let proposal: Vec<f64> = weights
        .iter()
        .zip(contributions)
        .map(|(w, rc)| (w * (target / rc.max(eps_rc))).max(0.0))
        .collect();
    let proposal = WeightVector::normalized(proposal);

    let blended = weights
        .iter()
        .zip(proposal.as_slice())
        .map(|(w, p)| (1.0 - damping) * w + damping * p)
        .collect();
    WeightVector::normalized(blended)
}

/// Simulate with the engine's current weights and decompose ES.
pub fn evaluate_weights(engine: &mut SimulationEngine, method: &SimulationMethod) -> Result<ErcStep> {
    let n = engine.num_assets();
    engine.run_simulation(method)?;
    let result = engine.compute_risk_contributions(RiskMeasure::ES)?;
    if result.num_assets() != n {
        return Err(EngineError::RiskContributionSizeMismatch {
            expected: n,
            actual: result.num_assets(),
        });
    }

    let expected_shortfall = result.portfolio_loss().abs();
    let target = expected_shortfall / n as f64;
    let contributions = result.contributions().to_vec();
    let rel_dev = relative_deviation(&contributions, target, expected_shortfall);
    Ok(ErcStep {
        contributions,
        expected_shortfall,
        target,
        rel_dev,
    })
}

/// Solve for equal-risk-contribution weights.
///
/// Starts from `1/N`. Stops as soon as the relative deviation reaches
/// `config.tol`, returning the weights that achieved it; otherwise returns the
/// weights after the last update once `max_iterations` is used up. The
/// engine is left holding the returned weights.
pub fn solve_erc(
    engine: &mut SimulationEngine,
    config: &ErcConfig,
    progress: Option<ProgressCallback>,
) -> Result<ErcOutcome> {
    config.validate()?;
    let n = engine.return_matrix()?.num_assets();
    engine.set_weight_vector(WeightVector::uniform(n))?;

    let mut history = ConvergenceHistory::new();
    for iteration in 0..config.max_iterations {
        let weights = engine.weights()?.as_slice().to_vec();
        let step = evaluate_weights(engine, &config.method)?;

        let record = IterationRecord {
            iteration,
            weights,
            contributions: step.contributions,
            expected_shortfall: step.expected_shortfall,
            target: step.target,
            rel_dev: step.rel_dev,
        };
        if config.verbose {
            tracing::info!(
                iteration,
                es = record.expected_shortfall,
                target = record.target,
                rel_dev = record.rel_dev,
                contributions = ?record.contributions,
                weights = ?record.weights,
                "erc iteration"
            );
        } else {
            tracing::debug!(
                iteration,
                es = record.expected_shortfall,
                target = record.target,
                rel_dev = record.rel_dev,
                "erc iteration"
            );
        }
        if let Some(callback) = &progress {
            callback(&record);
        }

        if record.rel_dev <= config.tol {
            tracing::info!(
                iterations = iteration + 1,
                rel_dev = record.rel_dev,
                method = %config.method,
                "erc converged"
            );
            let weights = engine.weights()?.clone();
            history.record(record);
            return Ok(ErcOutcome {
                weights,
                converged: true,
                termination_reason: TerminationReason::Converged,
                iterations: iteration + 1,
                history,
            });
        }

        let next = multiplicative_update(
            &record.weights,
            &record.contributions,
            record.target,
            config.eps_rc,
            config.damping,
        );
        engine.set_weight_vector(next)?;
        history.record(record);
    }

    tracing::info!(
        max_iterations = config.max_iterations,
        best_rel_dev = history.best_rel_dev(),
        method = %config.method,
        "erc stopped at iteration limit"
    );
    Ok(ErcOutcome {
        weights: engine.weights()?.clone(),
        converged: false,
        termination_reason: TerminationReason::MaxIterationsReached,
        iterations: history.len(),
        history,
    })
}
