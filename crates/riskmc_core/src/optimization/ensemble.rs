//! Ensembles of independently seeded ERC runs
//!
//! Each member is a clone of a prepared engine reseeded with
//! `base_seed + k`. Members share nothing mutable, so with the `parallel`
//! feature they run on the rayon pool. The ensemble weight vector is the
//! average of the members' weights.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bootstrap::SimulationMethod;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::model::{MarketTable, WeightVector};
use crate::simulation::SimulationEngine;

use super::config::ErcConfig;
use super::erc::solve_erc;
use super::result::ErcOutcome;

/// Dataset fractions used by [`progressive_erc`] when none are given
pub const DEFAULT_FRACTIONS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

/// Averaged result of several independently seeded ERC runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleOutcome {
    pub weights: WeightVector,
    pub members: Vec<ErcOutcome>,
}

impl EnsembleOutcome {
    /// Number of members that reached the tolerance.
    #[must_use]
    pub fn converged_members(&self) -> usize {
        self.members.iter().filter(|m| m.converged).count()
    }
}

fn run_member(engine: &SimulationEngine, config: &ErcConfig, seed: u64) -> Result<ErcOutcome> {
    let mut member = engine.clone();
    member.set_seed(seed);
    solve_erc(&mut member, config, None)
}

/// Run `members` ERC optimizations on clones of `engine` and average the weights.
///
/// `engine` must already have a category selected.
pub fn solve_erc_ensemble(
    engine: &SimulationEngine,
    config: &ErcConfig,
    members: usize,
    base_seed: u64,
) -> Result<EnsembleOutcome> {
    if members == 0 {
        return Err(EngineError::invalid_parameter(
            "members",
            0.0,
            "must be at least 1",
        ));
    }
    config.validate()?;
    let n = engine.return_matrix()?.num_assets();

    #[cfg(feature = "parallel")]
    let outcomes: Result<Vec<ErcOutcome>> = (0..members)
        .into_par_iter()
        .map(|k| run_member(engine, config, base_seed.wrapping_add(k as u64)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Result<Vec<ErcOutcome>> = (0..members)
        .map(|k| run_member(engine, config, base_seed.wrapping_add(k as u64)))
        .collect();

    let members = outcomes?;
    let mut mean = vec![0.0; n];
    for outcome in &members {
        for (m, w) in mean.iter_mut().zip(outcome.weights.as_slice()) {
            *m += w / members.len() as f64;
        }
    }

    tracing::debug!(
        members = members.len(),
        converged = members.iter().filter(|m| m.converged).count(),
        method = %config.method,
        "ensemble finished"
    );
    Ok(EnsembleOutcome {
        weights: WeightVector::normalized(mean),
        members,
    })
}

/// Ensemble weights for one method on one prefix of the date axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveRow {
    pub method: SimulationMethod,
    pub fraction: f64,
    /// Dates in the prefix
    pub dates: usize,
    pub weights: WeightVector,
    pub converged_members: usize,
}

/// Settings shared by every cell of a progressive run
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressiveSettings {
    pub engine: EngineConfig,
    pub erc: ErcConfig,
    pub methods: Vec<SimulationMethod>,
    pub fractions: Vec<f64>,
    pub members: usize,
    pub base_seed: u64,
}

/// Re-run ERC ensembles on growing prefixes of the market data.
///
/// For each fraction `f` the first `floor(f * dates)` dates are kept;
/// prefixes shorter than two dates are skipped. Every method in
/// `settings.methods` is solved on every prefix, in that order.
pub fn progressive_erc(
    market: &Arc<MarketTable>,
    category: &str,
    settings: &ProgressiveSettings,
) -> Result<Vec<ProgressiveRow>> {
    if market.is_empty() {
        return Err(EngineError::DataEmpty);
    }

    let total = market.len();
    let mut rows = Vec::with_capacity(settings.fractions.len() * settings.methods.len());
    for &fraction in &settings.fractions {
        if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
            return Err(EngineError::invalid_parameter(
                "fraction",
                fraction,
                "must lie in (0, 1]",
            ));
        }
        let cutoff = (fraction * total as f64).floor() as usize;
        if cutoff < 2 {
            tracing::debug!(fraction, cutoff, "prefix too short, skipping");
            continue;
        }

        let prefix = Arc::new(market.prefix(cutoff));
        let mut engine = SimulationEngine::new(prefix, settings.engine)?;
        engine.select_category(category)?;
        tracing::info!(fraction, dates = cutoff, "progressive erc on prefix");

        for method in &settings.methods {
            let config = ErcConfig {
                method: *method,
                ..settings.erc
            };
            let outcome = solve_erc_ensemble(&engine, &config, settings.members, settings.base_seed)?;
            rows.push(ProgressiveRow {
                method: *method,
                fraction,
                dates: cutoff,
                converged_members: outcome.converged_members(),
                weights: outcome.weights,
            });
        }
    }
    Ok(rows)
}
