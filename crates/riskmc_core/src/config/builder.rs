//! Fluent construction of a [`SimulationEngine`]

use std::sync::Arc;

use super::EngineConfig;
use crate::error::{EngineError, Result};
use crate::model::{MarketTable, ReturnMatrix};
use crate::simulation::SimulationEngine;

/// Builder for [`SimulationEngine`] with optional seed, category and weights
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    market: Option<Arc<MarketTable>>,
    returns: Option<ReturnMatrix>,
    config: EngineConfig,
    seed: Option<u64>,
    category: Option<String>,
    weights: Option<Vec<f64>>,
}

impl EngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Market data to select categories from.
    #[must_use]
    pub fn market(mut self, market: impl Into<Arc<MarketTable>>) -> Self {
        self.market = Some(market.into());
        self
    }

    /// Use a prepared return matrix instead of market data.
    #[must_use]
    pub fn returns(mut self, returns: ReturnMatrix) -> Self {
        self.returns = Some(returns);
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn n_simulations(mut self, n: usize) -> Self {
        self.config.n_simulations = n;
        self
    }

    #[must_use]
    pub fn n_samples(mut self, n: usize) -> Self {
        self.config.n_samples = n;
        self
    }

    #[must_use]
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.config.alpha = alpha;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Category to select right after construction.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Initial weights, applied after the category is selected.
    #[must_use]
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn build(self) -> Result<SimulationEngine> {
        let mut engine = match (self.returns, self.market) {
            (Some(returns), _) => SimulationEngine::from_return_matrix(returns, self.config)?,
            (None, Some(market)) => SimulationEngine::new(market, self.config)?,
            (None, None) => return Err(EngineError::DataEmpty),
        };

        if let Some(seed) = self.seed {
            engine.set_seed(seed);
        }
        if let Some(category) = &self.category {
            engine.select_category(category)?;
        }
        if let Some(weights) = self.weights {
            engine.set_weights(weights)?;
        }
        Ok(engine)
    }
}
