//! Tests for scenario generation
//!
//! These tests verify that:
//! - Vanilla paths are built from contiguous blocks of source rows
//! - Every policy returns exactly the requested number of rows
//! - Loss-biased policies concentrate their starts on loss periods
//! - The stationary bootstrap wraps around the end of history

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::common::{tag_of, tagged_returns};
use crate::bootstrap::{ScenarioSampler, SimulationMethod, generate_scenario, generate_scenarios};
use crate::model::{AssetList, Matrix, ReturnMatrix};
use crate::sampling::IndexSampler;

/// Alternating gains and losses, losses on odd rows.
fn alternating(periods: usize) -> ReturnMatrix {
    let rows: Vec<Vec<f64>> = (0..periods)
        .map(|t| {
            if t % 2 == 1 {
                vec![-0.05, -0.03]
            } else {
                vec![0.01, 0.02]
            }
        })
        .collect();
    ReturnMatrix::from_returns(AssetList::from_iter(["A", "B"]), Matrix::from_rows(&rows).unwrap())
        .unwrap()
}

#[test]
fn test_vanilla_rows_are_contiguous_source_blocks() {
    let returns = tagged_returns(40);
    let block = 6;
    let mut rng = StdRng::seed_from_u64(42);
    let scenarios = generate_scenarios(
        &SimulationMethod::Vanilla { block_size: block },
        &returns,
        &[1.0],
        50,
        20,
        &mut rng,
    )
    .unwrap();

    for path in scenarios.iter() {
        assert_eq!(path.rows(), 50);
        let tags: Vec<usize> = path.iter_rows().map(tag_of).collect();
        for chunk in tags.chunks(block) {
            // Starts are drawn from [0, T - b], so a block never wraps.
            assert!(chunk[0] + block <= 40);
            for pair in chunk.windows(2) {
                assert_eq!(pair[1], pair[0] + 1);
            }
        }
    }
}

#[test]
fn test_every_row_comes_from_history() {
    let returns = alternating(25);
    let mut rng = StdRng::seed_from_u64(9);
    for method in [
        SimulationMethod::Vanilla { block_size: 4 },
        SimulationMethod::LambdaBias {
            block_size: 4,
            lambda: 0.7,
        },
        SimulationMethod::Stationary {
            mean_block_size: 3.0,
            theta: 30.0,
        },
    ] {
        let path = generate_scenario(&method, &returns, &[0.5, 0.5], 33, &mut rng).unwrap();
        for row in path.iter_rows() {
            assert!(returns.returns().iter_rows().any(|src| src == row));
        }
    }
}

#[test]
fn test_lambda_one_draws_only_loss_blocks() {
    let returns = alternating(30);
    let mut rng = StdRng::seed_from_u64(5);
    let path = generate_scenario(
        &SimulationMethod::LambdaBias {
            block_size: 1,
            lambda: 1.0,
        },
        &returns,
        &[0.5, 0.5],
        200,
        &mut rng,
    )
    .unwrap();
    assert!(path.iter_rows().all(|row| row[0] < 0.0));
}

#[test]
fn test_lambda_zero_is_uniform_over_block_starts() {
    let returns = alternating(30);
    let sampler = ScenarioSampler::new(
        &SimulationMethod::LambdaBias {
            block_size: 3,
            lambda: 0.0,
        },
        &returns,
        &[0.5, 0.5],
    )
    .unwrap();
    assert_eq!(sampler.starts().len(), 28);
    for i in 0..28 {
        assert!((sampler.starts().probability(i) - 1.0 / 28.0).abs() < 1e-12);
    }
}

#[test]
fn test_stationary_row_count_is_exact() {
    let returns = tagged_returns(17);
    let mut rng = StdRng::seed_from_u64(123);
    for mean in [1.0, 2.5, 8.0, 1e12] {
        for samples in [1, 16, 17, 100] {
            let path = generate_scenario(
                &SimulationMethod::Stationary {
                    mean_block_size: mean,
                    theta: 0.0,
                },
                &returns,
                &[1.0],
                samples,
                &mut rng,
            )
            .unwrap();
            assert_eq!(path.rows(), samples);
        }
    }
}

#[test]
fn test_stationary_wraps_around_history() {
    let returns = tagged_returns(10);
    let mut rng = StdRng::seed_from_u64(8);
    // A huge mean block length makes the whole path one circular block.
    let path = generate_scenario(
        &SimulationMethod::Stationary {
            mean_block_size: 1e12,
            theta: 0.0,
        },
        &returns,
        &[1.0],
        35,
        &mut rng,
    )
    .unwrap();
    let tags: Vec<usize> = path.iter_rows().map(tag_of).collect();
    for pair in tags.windows(2) {
        assert_eq!(pair[1], (pair[0] + 1) % 10);
    }
}

#[test]
fn test_stationary_tilt_favors_losses() {
    let returns = alternating(40);
    let mut rng = StdRng::seed_from_u64(31);
    let path = generate_scenario(
        &SimulationMethod::Stationary {
            mean_block_size: 1.0,
            theta: 1000.0,
        },
        &returns,
        &[0.5, 0.5],
        1000,
        &mut rng,
    )
    .unwrap();
    let losses = path.iter_rows().filter(|row| row[0] < 0.0).count();
    assert!(losses >= 990, "only {losses} loss rows");
}

#[test]
fn test_same_seed_same_scenarios() {
    let returns = alternating(30);
    let method = SimulationMethod::Stationary {
        mean_block_size: 4.0,
        theta: 10.0,
    };
    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        generate_scenarios(&method, &returns, &[0.3, 0.7], 20, 10, &mut rng).unwrap()
    };
    assert_eq!(run(42), run(42));
    assert_ne!(run(42), run(43));
}
