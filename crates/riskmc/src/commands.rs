//! Sub-command drivers
//!
//! Each driver loads the market file, resolves the run configuration from
//! the YAML file and flags, runs the core library and renders the result.

use std::io::Write;
use std::sync::Arc;

use riskmc_core::model::ReturnMatrix;
use riskmc_core::optimization::{ProgressiveSettings, progressive_erc, solve_erc_ensemble};
use riskmc_core::risk::LossHistogram;
use riskmc_core::{EngineBuilder, MarketTable, RiskMeasure, SimulationEngine};

use crate::cli::{CommonArgs, ErcArgs, ProgressiveArgs, RiskArgs};
use crate::loader::load_market_csv;
use crate::report::{
    ErcReport, ProgressiveReport, RiskReport, write_erc, write_json, write_progressive, write_risk,
};
use crate::run_config::RunConfig;

fn load_market(common: &CommonArgs) -> color_eyre::Result<MarketTable> {
    Ok(load_market_csv(&common.data, &common.load_options())?)
}

fn build_engine(market: MarketTable, config: &RunConfig) -> color_eyre::Result<SimulationEngine> {
    let mut builder = EngineBuilder::new()
        .market(market)
        .config(config.engine)
        .category(config.category.as_str());
    if let Some(seed) = config.seed {
        builder = builder.seed(seed);
    }
    Ok(builder.build()?)
}

fn asset_names(returns: &ReturnMatrix) -> Vec<String> {
    returns.assets().iter().map(str::to_string).collect()
}

pub fn run_risk<W: Write>(args: &RiskArgs, out: &mut W) -> color_eyre::Result<()> {
    let mut config = args.common.run_config()?;
    config.erc.method = args.method.resolve(config.erc.method)?;
    config.validate()?;
    let method = config.erc.method;

    let mut engine = build_engine(load_market(&args.common)?, &config)?;
    if let Some(weights) = &args.weights {
        engine.set_weights(weights.clone())?;
    }
    engine.run_simulation(&method)?;

    let measures = match args.measure {
        Some(measure) => vec![measure],
        None => vec![RiskMeasure::VaR, RiskMeasure::ES],
    };
    let mut histogram = args.histogram.map(LossHistogram::new);
    let mut results = Vec::with_capacity(measures.len());
    for measure in measures {
        let result = match histogram.as_mut() {
            Some(sink) => engine.compute_risk_contributions_with_sink(measure, sink)?,
            None => engine.compute_risk_contributions(measure)?,
        };
        results.push(result.clone());
    }

    let report = RiskReport {
        category: config.category.clone(),
        method,
        n_simulations: config.engine.n_simulations,
        assets: asset_names(engine.return_matrix()?),
        weights: engine.weights()?.as_slice().to_vec(),
        results,
        histogram: histogram.and_then(|h| h.portfolio().cloned()),
    };
    if args.common.json {
        write_json(out, &report)
    } else {
        write_risk(out, &report)
    }
}

pub fn run_erc<W: Write>(args: &ErcArgs, out: &mut W) -> color_eyre::Result<()> {
    let mut config = args.common.run_config()?;
    config.erc.method = args.method.resolve(config.erc.method)?;
    args.optimizer.apply(&mut config);
    config.validate()?;
    let method = config.erc.method;

    let mut engine = build_engine(load_market(&args.common)?, &config)?;
    let assets = asset_names(engine.return_matrix()?);
    let report = match args.ensemble {
        Some(members) if members > 1 => {
            let base_seed = config.seed.unwrap_or_else(rand::random);
            tracing::info!(members, base_seed, %method, "solving erc ensemble");
            let outcome = solve_erc_ensemble(&engine, &config.erc, members, base_seed)?;
            ErcReport::ensemble(&config.category, method, assets, &outcome)
        }
        _ => {
            tracing::info!(%method, "solving erc");
            let outcome = engine.solve_erc(&config.erc, None)?;
            ErcReport::single(&config.category, method, assets, &outcome)
        }
    };

    if args.common.json {
        write_json(out, &report)
    } else {
        write_erc(out, &report)
    }
}

pub fn run_progressive<W: Write>(args: &ProgressiveArgs, out: &mut W) -> color_eyre::Result<()> {
    let mut config = args.common.run_config()?;
    args.optimizer.apply(&mut config);
    if let Some(members) = args.members {
        config.members = members;
    }
    if let Some(fractions) = &args.fractions {
        config.fractions.clone_from(fractions);
    }
    config.validate()?;

    let market = Arc::new(load_market(&args.common)?);
    let assets = asset_names(&ReturnMatrix::from_market(&market, &config.category)?);
    let settings = ProgressiveSettings {
        engine: config.engine,
        erc: config.erc,
        methods: config.methods.clone(),
        fractions: config.fractions.clone(),
        members: config.members,
        base_seed: config.seed.unwrap_or_else(rand::random),
    };
    let rows = progressive_erc(&market, &config.category, &settings)?;

    let report = ProgressiveReport {
        category: config.category,
        members: config.members,
        assets,
        rows,
    };
    if args.common.json {
        write_json(out, &report)
    } else {
        write_progressive(out, &report)
    }
}
