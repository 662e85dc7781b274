//! Tests for the ERC optimizer
//!
//! These tests verify that:
//! - The lower-volatility asset ends up with the larger weight
//! - Every iteration keeps weights on the simplex
//! - A converged state is a fixed point under the same RNG state
//! - Ensembles are reproducible and average their members

use std::sync::{Arc, Mutex};

use super::common::{close_prices, engine_for, normal_returns};
use crate::bootstrap::SimulationMethod;
use crate::config::EngineConfig;
use crate::model::WEIGHT_TOLERANCE;
use crate::optimization::{
    ErcConfig, IterationRecord, ProgressCallback, ProgressiveSettings, TerminationReason,
    evaluate_weights, progressive_erc, solve_erc, solve_erc_ensemble,
};

fn erc_config(method: SimulationMethod, tol: f64, max_iterations: usize) -> ErcConfig {
    ErcConfig {
        max_iterations,
        method,
        tol,
        damping: 0.5,
        ..Default::default()
    }
}

#[test]
fn test_low_volatility_asset_gets_larger_weight() {
    let mut engine = engine_for(normal_returns(&[0.02, 0.01], 500, 1), 400, 50, 3);
    let config = erc_config(SimulationMethod::Vanilla { block_size: 5 }, 1e-3, 50);

    let outcome = solve_erc(&mut engine, &config, None).unwrap();
    assert!(outcome.converged, "stopped after {} iterations", outcome.iterations);
    assert_eq!(outcome.termination_reason, TerminationReason::Converged);
    assert!(outcome.final_rel_dev().unwrap() <= 1e-3);
    let w = outcome.weights.as_slice();
    assert!(w[1] > w[0], "weights {w:?}");
    assert_eq!(outcome.history.len(), outcome.iterations);
    assert_eq!(engine.weights().unwrap(), &outcome.weights);
}

#[test]
fn test_weights_stay_on_simplex() {
    let mut engine = engine_for(normal_returns(&[0.03, 0.01, 0.02], 300, 2), 200, 30, 9);
    let config = erc_config(
        SimulationMethod::LambdaBias {
            block_size: 5,
            lambda: 0.7,
        },
        0.0,
        10,
    );

    let outcome = solve_erc(&mut engine, &config, None).unwrap();
    assert_eq!(outcome.termination_reason, TerminationReason::MaxIterationsReached);
    assert!(!outcome.converged);
    assert_eq!(outcome.iterations, 10);
    for record in &outcome.history.iterations {
        let sum: f64 = record.weights.iter().sum();
        assert!((sum - 1.0).abs() < WEIGHT_TOLERANCE);
        assert!(record.weights.iter().all(|w| *w >= 0.0));
    }
    assert!((outcome.weights.sum() - 1.0).abs() < WEIGHT_TOLERANCE);
}

#[test]
fn test_converged_state_is_a_fixed_point() {
    let returns = normal_returns(&[0.02, 0.01], 500, 11);
    let method = SimulationMethod::Vanilla { block_size: 5 };
    let config = erc_config(method, 0.15, 50);

    let mut engine = engine_for(returns.clone(), 400, 50, 2024);
    let outcome = solve_erc(&mut engine, &config, None).unwrap();
    assert!(outcome.converged, "rel devs {:?}", outcome.history.rel_devs());
    let k = outcome.iterations;
    let converged_rel_dev = outcome.final_rel_dev().unwrap();
    assert!(converged_rel_dev <= config.tol);

    // Replay the first k - 1 iterations, leaving the same weights and RNG state.
    let mut replay = engine_for(returns, 400, 50, 2024);
    let partial = solve_erc(&mut replay, &erc_config(method, 0.15, k - 1), None).unwrap();
    assert_eq!(partial.iterations, k - 1);
    assert_eq!(replay.weights().unwrap(), &outcome.weights);

    let step = evaluate_weights(&mut replay, &method).unwrap();
    assert_eq!(step.rel_dev, converged_rel_dev);
    assert!(step.rel_dev <= config.tol);
}

#[test]
fn test_progress_callback_sees_every_iteration() {
    let mut engine = engine_for(normal_returns(&[0.02, 0.01], 200, 5), 100, 20, 3);
    let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let callback: ProgressCallback = Box::new(move |record: &IterationRecord| {
        sink.lock().unwrap().push(record.iteration);
    });

    let outcome = solve_erc(
        &mut engine,
        &erc_config(SimulationMethod::Vanilla { block_size: 4 }, 0.0, 6),
        Some(callback),
    )
    .unwrap();
    assert_eq!(*seen.lock().unwrap(), (0..outcome.iterations).collect::<Vec<_>>());
}

#[test]
fn test_solve_requires_selection() {
    let mut engine = crate::simulation::SimulationEngine::new(
        crate::model::MarketTable::new(),
        EngineConfig::default(),
    )
    .unwrap();
    assert_eq!(
        solve_erc(&mut engine, &ErcConfig::default(), None).unwrap_err(),
        crate::error::EngineError::NoCategorySelected
    );
}

#[test]
fn test_ensemble_is_reproducible_and_averages_members() {
    let engine = engine_for(normal_returns(&[0.02, 0.01], 300, 8), 150, 30, 0);
    let config = erc_config(
        SimulationMethod::Stationary {
            mean_block_size: 5.0,
            theta: 30.0,
        },
        1e-3,
        8,
    );

    let first = solve_erc_ensemble(&engine, &config, 3, 100).unwrap();
    let second = solve_erc_ensemble(&engine, &config, 3, 100).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.members.len(), 3);

    for i in 0..2 {
        let mean = first
            .members
            .iter()
            .map(|m| m.weights.as_slice()[i])
            .sum::<f64>()
            / 3.0;
        assert!((first.weights.as_slice()[i] - mean).abs() < 1e-9);
    }
}

#[test]
fn test_progressive_skips_short_prefixes() {
    let market = Arc::new(close_prices(40));
    let settings = ProgressiveSettings {
        engine: EngineConfig {
            n_simulations: 50,
            n_samples: 10,
            alpha: 5.0,
        },
        erc: erc_config(SimulationMethod::default(), 1e-3, 3),
        methods: vec![
            SimulationMethod::Vanilla { block_size: 3 },
            SimulationMethod::Stationary {
                mean_block_size: 3.0,
                theta: 30.0,
            },
        ],
        fractions: vec![0.025, 0.5, 1.0],
        members: 2,
        base_seed: 42,
    };

    let rows = progressive_erc(&market, "Close", &settings).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].dates, 20);
    assert_eq!(rows[3].dates, 40);
    assert_eq!(rows[1].method, settings.methods[1]);
    for row in &rows {
        assert_eq!(row.weights.len(), 2);
        assert!((row.weights.sum() - 1.0).abs() < WEIGHT_TOLERANCE);
    }
}
