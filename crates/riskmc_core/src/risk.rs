//! Tail risk measures over a scenario set
//!
//! Each scenario path is compounded into per-asset losses, combined into a
//! portfolio loss, and ranked. VaR reads the row at the `1 - alpha` quantile,
//! ES averages every row from that quantile to the worst loss. Asset columns
//! are scaled by their weights to give marginal contributions.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::{LossTable, Matrix, RiskMeasure, RiskResult, ScenarioSet};

pub const DEFAULT_HISTOGRAM_BINS: usize = 100;

/// Receives the raw `M x (N+1)` loss table before it is reduced.
pub trait LossSink {
    fn consume(&mut self, losses: &LossTable);
}

impl<F> LossSink for F
where
    F: FnMut(&LossTable),
{
    fn consume(&mut self, losses: &LossTable) {
        self(losses);
    }
}

/// Index of the `1 - alpha/100` quantile among `m` ascending values.
///
/// `alpha` is in percent. The result is clamped to `[0, m - 1]`.
#[must_use]
pub fn quantile_index(alpha: f64, m: usize) -> usize {
    if m == 0 {
        return 0;
    }
    let raw = ((100.0 - alpha) * m as f64 / 100.0).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(m - 1)
    }
}

/// Compounded loss `1 - prod(1 + r_t)` of every column of a path.
#[must_use]
pub fn scenario_losses(path: &Matrix) -> Vec<f64> {
    let mut growth = vec![1.0; path.cols()];
    for row in path.iter_rows() {
        for (g, r) in growth.iter_mut().zip(row) {
            *g *= 1.0 + r;
        }
    }
    growth.into_iter().map(|g| 1.0 - g).collect()
}

/// Per-scenario asset losses with the weighted portfolio loss appended.
pub fn loss_table(scenarios: &ScenarioSet, weights: &[f64]) -> Result<LossTable> {
    if scenarios.is_empty() {
        return Err(EngineError::EmptyScenarioSet);
    }

    let mut table = Matrix::with_capacity(weights.len() + 1, scenarios.len());
    let mut row = Vec::with_capacity(weights.len() + 1);
    for path in scenarios.iter() {
        if path.cols() != weights.len() {
            return Err(EngineError::RiskContributionSizeMismatch {
                expected: path.cols(),
                actual: weights.len(),
            });
        }
        row.clear();
        row.extend(scenario_losses(path));
        let portfolio: f64 = row.iter().zip(weights).map(|(l, w)| l * w).sum();
        row.push(portfolio);
        table.push_row(&row);
    }
    Ok(LossTable::new(table))
}

/// Marginal risk contributions and the portfolio risk measure.
pub fn compute_risk_contributions(
    scenarios: &ScenarioSet,
    weights: &[f64],
    alpha: f64,
    measure: RiskMeasure,
) -> Result<RiskResult> {
    compute_risk_contributions_with_sink(scenarios, weights, alpha, measure, None)
}

/// As [`compute_risk_contributions`], handing the loss table to `sink` first.
pub fn compute_risk_contributions_with_sink(
    scenarios: &ScenarioSet,
    weights: &[f64],
    alpha: f64,
    measure: RiskMeasure,
    sink: Option<&mut dyn LossSink>,
) -> Result<RiskResult> {
    check_alpha(alpha)?;
    let table = loss_table(scenarios, weights)?;
    if let Some(sink) = sink {
        sink.consume(&table);
    }
    Ok(reduce(&table, weights, alpha, measure))
}

fn check_alpha(alpha: f64) -> Result<()> {
    if !alpha.is_finite() || alpha <= 0.0 || alpha > 100.0 {
        return Err(EngineError::invalid_parameter(
            "alpha",
            alpha,
            "must lie in (0, 100]",
        ));
    }
    Ok(())
}

fn reduce(table: &LossTable, weights: &[f64], alpha: f64, measure: RiskMeasure) -> RiskResult {
    let m = table.num_scenarios();
    let n = table.num_assets();

    // Stable sort keeps scenario order among equal losses.
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| table.portfolio_loss(a).total_cmp(&table.portfolio_loss(b)));

    let q = quantile_index(alpha, m);
    let tail = match measure {
        RiskMeasure::VaR => &order[q..=q],
        RiskMeasure::ES => &order[q..],
    };

    let mut contributions = vec![0.0; n];
    let mut portfolio = 0.0;
    for &i in tail {
        for (c, l) in contributions.iter_mut().zip(table.asset_losses(i)) {
            *c += l;
        }
        portfolio += table.portfolio_loss(i);
    }

    let count = tail.len() as f64;
    for (c, w) in contributions.iter_mut().zip(weights) {
        *c = *c / count * w;
    }
    RiskResult::new(measure, alpha, contributions, portfolio / count)
}

/// Equal-width histogram of one loss column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub min: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    #[must_use]
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = if min.is_finite() { min } else { 0.0 };
        let mut range = max - min;
        if !range.is_finite() || range <= 0.0 {
            range = 1.0;
        }
        let bin_width = range / bins as f64;

        let mut counts = vec![0; bins];
        for v in values {
            let bin = ((v - min) / bin_width).floor();
            let bin = if bin <= 0.0 { 0 } else { (bin as usize).min(bins - 1) };
            counts[bin] += 1;
        }
        Self {
            min,
            bin_width,
            counts,
        }
    }

    /// Lower edge of each bin.
    pub fn edges(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.counts.len()).map(|i| self.min + i as f64 * self.bin_width)
    }
}

/// Loss sink that bins every column of the last table it received.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LossHistogram {
    bins: usize,
    columns: Vec<Histogram>,
}

impl LossHistogram {
    #[must_use]
    pub fn new(bins: usize) -> Self {
        Self {
            bins,
            columns: Vec::new(),
        }
    }

    /// Histograms per asset, then the portfolio.
    #[must_use]
    pub fn columns(&self) -> &[Histogram] {
        &self.columns
    }

    #[must_use]
    pub fn portfolio(&self) -> Option<&Histogram> {
        self.columns.last()
    }
}

impl LossSink for LossHistogram {
    fn consume(&mut self, losses: &LossTable) {
        let bins = if self.bins == 0 {
            DEFAULT_HISTOGRAM_BINS
        } else {
            self.bins
        };
        let matrix = losses.as_matrix();
        self.columns = (0..matrix.cols())
            .map(|j| Histogram::from_values(&matrix.column(j), bins))
            .collect();
    }
}
