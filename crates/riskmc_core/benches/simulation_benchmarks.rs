//! Criterion benchmarks for riskmc_core scenario generation, risk and ERC
//!
//! Run with: cargo bench -p riskmc_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand_distr::Normal;
use riskmc_core::bootstrap::{SimulationMethod, generate_scenarios};
use riskmc_core::config::EngineConfig;
use riskmc_core::model::{AssetList, Matrix, ReturnMatrix, RiskMeasure};
use riskmc_core::optimization::{ErcConfig, solve_erc};
use riskmc_core::risk::compute_risk_contributions;
use riskmc_core::simulation::SimulationEngine;

fn synthetic_returns(num_assets: usize, periods: usize) -> ReturnMatrix {
    let mut rng = StdRng::seed_from_u64(42);
    let mut matrix = Matrix::with_capacity(num_assets, periods);
    let mut row = vec![0.0; num_assets];
    for _ in 0..periods {
        for (j, cell) in row.iter_mut().enumerate() {
            let sigma = 0.005 * (j + 1) as f64;
            *cell = Normal::new(0.0, sigma).unwrap().sample(&mut rng);
        }
        matrix.push_row(&row);
    }
    let assets = AssetList::from_iter((0..num_assets).map(|j| format!("A{j}")));
    ReturnMatrix::from_returns(assets, matrix).unwrap()
}

fn methods() -> [SimulationMethod; 3] {
    [
        SimulationMethod::Vanilla { block_size: 10 },
        SimulationMethod::LambdaBias {
            block_size: 10,
            lambda: 0.7,
        },
        SimulationMethod::Stationary {
            mean_block_size: 10.0,
            theta: 30.0,
        },
    ]
}

fn bench_scenario_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios");
    let returns = synthetic_returns(5, 2_500);
    let weights = vec![0.2; 5];

    for method in methods() {
        group.bench_with_input(
            BenchmarkId::new(method.kind().name(), 1000),
            &method,
            |b, method| {
                let mut rng = StdRng::seed_from_u64(7);
                b.iter(|| {
                    generate_scenarios(
                        black_box(method),
                        black_box(&returns),
                        &weights,
                        365,
                        1000,
                        &mut rng,
                    )
                })
            },
        );
    }

    group.finish();
}

fn bench_risk_measures(c: &mut Criterion) {
    let mut group = c.benchmark_group("risk");
    let returns = synthetic_returns(5, 2_500);
    let weights = vec![0.2; 5];

    for n_simulations in [100, 1000, 5000] {
        let mut rng = StdRng::seed_from_u64(11);
        let scenarios = generate_scenarios(
            &SimulationMethod::Vanilla { block_size: 10 },
            &returns,
            &weights,
            365,
            n_simulations,
            &mut rng,
        )
        .unwrap();

        group.bench_with_input(
            BenchmarkId::new("es", n_simulations),
            &scenarios,
            |b, scenarios| {
                b.iter(|| {
                    compute_risk_contributions(black_box(scenarios), &weights, 5.0, RiskMeasure::ES)
                })
            },
        );
    }

    group.finish();
}

fn bench_erc(c: &mut Criterion) {
    let mut group = c.benchmark_group("erc");
    group.sample_size(10);
    let config = EngineConfig {
        n_simulations: 200,
        n_samples: 120,
        alpha: 5.0,
    };
    let engine = SimulationEngine::from_return_matrix(synthetic_returns(3, 1_000), config).unwrap();

    for method in methods() {
        let erc = ErcConfig {
            max_iterations: 10,
            method,
            tol: 0.0,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::new(method.kind().name(), 10),
            &erc,
            |b, erc| {
                b.iter(|| {
                    let mut engine = engine.clone();
                    engine.set_seed(3);
                    solve_erc(&mut engine, black_box(erc), None)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_scenario_generation,
    bench_risk_measures,
    bench_erc
);
criterion_main!(benches);
