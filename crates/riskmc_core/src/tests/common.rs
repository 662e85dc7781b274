//! Shared fixtures

use rand::SeedableRng;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::config::EngineConfig;
use crate::model::{AssetList, MarketTable, Matrix, ReturnMatrix};
use crate::simulation::SimulationEngine;

/// Independent zero-mean normal returns, one column per entry of `sigmas`.
pub fn normal_returns(sigmas: &[f64], periods: usize, seed: u64) -> ReturnMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let dists: Vec<Normal<f64>> = sigmas
        .iter()
        .map(|s| Normal::new(0.0, *s).unwrap())
        .collect();

    let mut matrix = Matrix::with_capacity(sigmas.len(), periods);
    let mut row = vec![0.0; sigmas.len()];
    for _ in 0..periods {
        for (cell, dist) in row.iter_mut().zip(&dists) {
            *cell = dist.sample(&mut rng);
        }
        matrix.push_row(&row);
    }

    let assets = AssetList::from_iter((0..sigmas.len()).map(|i| format!("ASSET{i}")));
    ReturnMatrix::from_returns(assets, matrix).unwrap()
}

/// Single-column returns whose row `t` is `t * 1e-4`, so every row is unique.
pub fn tagged_returns(periods: usize) -> ReturnMatrix {
    let rows: Vec<Vec<f64>> = (0..periods).map(|t| vec![t as f64 * 1e-4]).collect();
    ReturnMatrix::from_returns(AssetList::from_iter(["TAG"]), Matrix::from_rows(&rows).unwrap())
        .unwrap()
}

/// Source row index of a generated row of `tagged_returns`.
pub fn tag_of(row: &[f64]) -> usize {
    (row[0] / 1e-4).round() as usize
}

/// Seeded engine over prepared returns.
pub fn engine_for(returns: ReturnMatrix, n_simulations: usize, n_samples: usize, seed: u64) -> SimulationEngine {
    let config = EngineConfig {
        n_simulations,
        n_samples,
        alpha: 5.0,
    };
    let mut engine = SimulationEngine::from_return_matrix(returns, config).unwrap();
    engine.set_seed(seed);
    engine
}

/// Deterministic "Close" prices for two tickers plus a one-ticker "Volume" category.
pub fn close_prices(dates: usize) -> MarketTable {
    let mut table = MarketTable::new();
    let mut a = 100.0;
    let mut b = 100.0;
    for d in 0..dates {
        let date = format!("2024-{:02}-{:02}", d / 28 + 1, d % 28 + 1);
        table.insert(date.clone(), "Close", "AAA", a);
        table.insert(date.clone(), "Close", "BBB", b);
        table.insert(date, "Volume", "AAA", 1_000.0);
        a *= if d % 3 == 0 { 0.98 } else { 1.012 };
        b *= if d % 2 == 0 { 0.995 } else { 1.006 };
    }
    table
}
