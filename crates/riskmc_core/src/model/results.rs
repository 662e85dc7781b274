use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::returns::Matrix;
use crate::error::EngineError;

/// Simulated return paths, each `samples x N`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    paths: Vec<Matrix>,
}

impl ScenarioSet {
    #[must_use]
    pub fn new(paths: Vec<Matrix>) -> Self {
        Self { paths }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            paths: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, path: Matrix) {
        self.paths.push(path);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Matrix> {
        self.paths.iter()
    }

    #[must_use]
    pub fn paths(&self) -> &[Matrix] {
        &self.paths
    }
}

/// Tail risk measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskMeasure {
    /// Loss at the `1 - alpha` quantile
    #[serde(alias = "var")]
    VaR,
    /// Mean loss at and beyond the `1 - alpha` quantile
    #[serde(alias = "es")]
    ES,
}

impl RiskMeasure {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            RiskMeasure::VaR => "VaR",
            RiskMeasure::ES => "ES",
        }
    }
}

impl fmt::Display for RiskMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskMeasure {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "var" | "value-at-risk" => Ok(RiskMeasure::VaR),
            "es" | "cvar" | "expected-shortfall" => Ok(RiskMeasure::ES),
            _ => Err(EngineError::UnknownRiskMeasure(s.to_string())),
        }
    }
}

/// Per-scenario losses: one row per scenario, asset losses followed by the
/// portfolio loss in the last column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossTable {
    losses: Matrix,
}

impl LossTable {
    pub(crate) fn new(losses: Matrix) -> Self {
        Self { losses }
    }

    #[must_use]
    pub fn num_scenarios(&self) -> usize {
        self.losses.rows()
    }

    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.losses.cols().saturating_sub(1)
    }

    /// Compounded loss of each asset in scenario `i`.
    #[must_use]
    pub fn asset_losses(&self, i: usize) -> &[f64] {
        &self.losses.row(i)[..self.num_assets()]
    }

    #[must_use]
    pub fn portfolio_loss(&self, i: usize) -> f64 {
        self.losses.get(i, self.num_assets())
    }

    /// Portfolio losses of all scenarios, in scenario order.
    #[must_use]
    pub fn portfolio_losses(&self) -> Vec<f64> {
        self.losses.column(self.num_assets())
    }

    /// The raw `M x (N+1)` matrix.
    #[must_use]
    pub fn as_matrix(&self) -> &Matrix {
        &self.losses
    }
}

/// Marginal risk contributions per asset plus the portfolio-level measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub measure: RiskMeasure,
    /// Confidence level in percent (5 means the worst 5%)
    pub alpha: f64,
    contributions: Vec<f64>,
    portfolio: f64,
}

impl RiskResult {
    #[must_use]
    pub fn new(measure: RiskMeasure, alpha: f64, contributions: Vec<f64>, portfolio: f64) -> Self {
        Self {
            measure,
            alpha,
            contributions,
            portfolio,
        }
    }

    #[must_use]
    pub fn contributions(&self) -> &[f64] {
        &self.contributions
    }

    /// Portfolio-level risk measure, in loss units.
    #[must_use]
    pub fn portfolio_loss(&self) -> f64 {
        self.portfolio
    }

    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.contributions.len()
    }

    /// Contributions followed by the portfolio measure (length N+1).
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.contributions.len() + 1);
        out.extend_from_slice(&self.contributions);
        out.push(self.portfolio);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_measure_parse() {
        assert_eq!("VaR".parse::<RiskMeasure>().unwrap(), RiskMeasure::VaR);
        assert_eq!(" es ".parse::<RiskMeasure>().unwrap(), RiskMeasure::ES);
        assert!(matches!(
            "sharpe".parse::<RiskMeasure>(),
            Err(EngineError::UnknownRiskMeasure(_))
        ));
    }

    #[test]
    fn test_risk_result_layout() {
        let result = RiskResult::new(RiskMeasure::ES, 5.0, vec![0.01, 0.02], 0.03);
        assert_eq!(result.to_vec(), vec![0.01, 0.02, 0.03]);
        assert_eq!(result.num_assets(), 2);
    }

    #[test]
    fn test_loss_table_accessors() {
        let table = LossTable::new(
            Matrix::from_rows(&[vec![0.1, 0.2, 0.15], vec![-0.1, 0.0, -0.05]]).unwrap(),
        );
        assert_eq!(table.num_scenarios(), 2);
        assert_eq!(table.num_assets(), 2);
        assert_eq!(table.asset_losses(1), &[-0.1, 0.0]);
        assert_eq!(table.portfolio_losses(), vec![0.15, -0.05]);
    }
}
