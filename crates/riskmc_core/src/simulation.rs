//! Simulation engine context
//!
//! [`SimulationEngine`] owns everything one optimization run mutates: the RNG
//! stream, the selected return matrix and asset list, the current weights and
//! the latest scenario set and risk result. Scenario generation and risk
//! measurement themselves are free functions in [`crate::bootstrap`] and
//! [`crate::risk`]; the engine only wires its state into them.
//!
//! Independent engines share no mutable state, so cloning one and reseeding
//! the clone is enough to run it on another thread.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::bootstrap::{SimulationMethod, generate_scenario, generate_scenarios};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::model::{
    AssetList, MarketTable, Matrix, ReturnMatrix, RiskMeasure, RiskResult, ScenarioSet,
    WeightVector,
};
use crate::optimization::{ErcConfig, ErcOutcome, ProgressCallback};
use crate::risk::{self, LossSink};

#[derive(Debug, Clone)]
struct Selection {
    category: Option<String>,
    returns: ReturnMatrix,
    weights: WeightVector,
}

/// Explicit simulation context holding the RNG, the return matrix and weights
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    market: Arc<MarketTable>,
    config: EngineConfig,
    rng: StdRng,
    selection: Option<Selection>,
    scenarios: ScenarioSet,
    risk: Option<RiskResult>,
}

impl SimulationEngine {
    /// Engine over `market`, seeded from OS entropy.
    pub fn new(market: impl Into<Arc<MarketTable>>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            market: market.into(),
            config,
            rng: StdRng::from_os_rng(),
            selection: None,
            scenarios: ScenarioSet::default(),
            risk: None,
        })
    }

    /// Engine over `market` with a deterministic RNG stream.
    pub fn with_seed(
        market: impl Into<Arc<MarketTable>>,
        config: EngineConfig,
        seed: u64,
    ) -> Result<Self> {
        let mut engine = Self::new(market, config)?;
        engine.set_seed(seed);
        Ok(engine)
    }

    /// Engine over a prepared return matrix, with uniform initial weights.
    ///
    /// The market table stays empty, so `select_category` is unavailable.
    pub fn from_return_matrix(returns: ReturnMatrix, config: EngineConfig) -> Result<Self> {
        let mut engine = Self::new(MarketTable::new(), config)?;
        engine.install(None, returns);
        Ok(engine)
    }

    /// Restart the RNG stream from `seed`.
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn market(&self) -> &MarketTable {
        &self.market
    }

    /// Shared handle to the market data, e.g. for building sibling engines.
    #[must_use]
    pub fn market_handle(&self) -> Arc<MarketTable> {
        Arc::clone(&self.market)
    }

    /// Build the return matrix for `category` and reset weights to `1/N`.
    pub fn select_category(&mut self, category: &str) -> Result<()> {
        let returns = ReturnMatrix::from_market(&self.market, category)?;
        self.install(Some(category.to_string()), returns);
        Ok(())
    }

    fn install(&mut self, category: Option<String>, returns: ReturnMatrix) {
        let weights = WeightVector::uniform(returns.num_assets());
        self.selection = Some(Selection {
            category,
            returns,
            weights,
        });
        self.scenarios = ScenarioSet::default();
        self.risk = None;
    }

    fn selection(&self) -> Result<&Selection> {
        self.selection.as_ref().ok_or(EngineError::NoCategorySelected)
    }

    /// Selected category, if the engine was built from market data.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.selection.as_ref()?.category.as_deref()
    }

    pub fn return_matrix(&self) -> Result<&ReturnMatrix> {
        Ok(&self.selection()?.returns)
    }

    pub fn assets(&self) -> Result<&AssetList> {
        Ok(self.selection()?.returns.assets())
    }

    /// Number of assets, 0 before a category is selected.
    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.selection
            .as_ref()
            .map_or(0, |s| s.returns.num_assets())
    }

    pub fn weights(&self) -> Result<&WeightVector> {
        Ok(&self.selection()?.weights)
    }

    /// Replace the portfolio weights after validating them.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> Result<()> {
        let num_assets = self.selection()?.returns.num_assets();
        let weights = WeightVector::new(weights, num_assets)?;
        self.set_weight_vector(weights)
    }

    pub(crate) fn set_weight_vector(&mut self, weights: WeightVector) -> Result<()> {
        let selection = self
            .selection
            .as_mut()
            .ok_or(EngineError::NoCategorySelected)?;
        if weights.len() != selection.returns.num_assets() {
            return Err(EngineError::InvalidWeights(format!(
                "expected {} weights, got {}",
                selection.returns.num_assets(),
                weights.len()
            )));
        }
        selection.weights = weights;
        Ok(())
    }

    /// Draw one `n_samples x N` path with the current weights.
    pub fn run_single_simulation(&mut self, method: &SimulationMethod) -> Result<Matrix> {
        let selection = self
            .selection
            .as_ref()
            .ok_or(EngineError::NoCategorySelected)?;
        generate_scenario(
            method,
            &selection.returns,
            selection.weights.as_slice(),
            self.config.n_samples,
            &mut self.rng,
        )
    }

    /// Replace the scenario set with `n_simulations` fresh paths.
    pub fn run_simulation(&mut self, method: &SimulationMethod) -> Result<&ScenarioSet> {
        let selection = self
            .selection
            .as_ref()
            .ok_or(EngineError::NoCategorySelected)?;
        self.scenarios = generate_scenarios(
            method,
            &selection.returns,
            selection.weights.as_slice(),
            self.config.n_samples,
            self.config.n_simulations,
            &mut self.rng,
        )?;
        Ok(&self.scenarios)
    }

    /// Scenarios from the last `run_simulation`.
    #[must_use]
    pub fn scenarios(&self) -> &ScenarioSet {
        &self.scenarios
    }

    /// Measure risk of the current scenario set under the current weights.
    pub fn compute_risk_contributions(&mut self, measure: RiskMeasure) -> Result<&RiskResult> {
        self.measure(measure, None)
    }

    /// As [`Self::compute_risk_contributions`], also handing the raw loss table to `sink`.
    pub fn compute_risk_contributions_with_sink(
        &mut self,
        measure: RiskMeasure,
        sink: &mut dyn LossSink,
    ) -> Result<&RiskResult> {
        self.measure(measure, Some(sink))
    }

    fn measure(&mut self, measure: RiskMeasure, sink: Option<&mut dyn LossSink>) -> Result<&RiskResult> {
        let weights = self.selection()?.weights.as_slice();
        let result = risk::compute_risk_contributions_with_sink(
            &self.scenarios,
            weights,
            self.config.alpha,
            measure,
            sink,
        )?;
        Ok(&*self.risk.insert(result))
    }

    /// Latest risk result, if any.
    #[must_use]
    pub fn risk_contributions(&self) -> Option<&RiskResult> {
        self.risk.as_ref()
    }

    /// Portfolio entry of the latest risk result, 0.0 when none exists.
    #[must_use]
    pub fn portfolio_loss(&self) -> f64 {
        self.risk.as_ref().map_or(0.0, RiskResult::portfolio_loss)
    }

    /// Run the ERC optimizer on this engine.
    pub fn solve_erc(
        &mut self,
        config: &ErcConfig,
        progress: Option<ProgressCallback>,
    ) -> Result<ErcOutcome> {
        crate::optimization::solve_erc(self, config, progress)
    }
}
