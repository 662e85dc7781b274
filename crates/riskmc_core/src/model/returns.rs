//! Dense return matrices and the builder that derives them from market data.

use serde::{Deserialize, Serialize};

use super::market::MarketTable;
use crate::error::{EngineError, Result};

/// Row-major dense matrix of `f64`.
///
/// Rows are time steps (or scenarios), columns are assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// An empty matrix with room for `capacity_rows` rows.
    #[must_use]
    pub fn with_capacity(cols: usize, capacity_rows: usize) -> Self {
        Self {
            rows: 0,
            cols,
            data: Vec::with_capacity(cols * capacity_rows),
        }
    }

    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build from a flat row-major buffer. Returns `None` if the length does not match.
    #[must_use]
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    /// Build from a slice of equally sized rows. Returns `None` on ragged input.
    #[must_use]
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut matrix = Self::with_capacity(cols, rows.len());
        for row in rows {
            if row.len() != cols {
                return None;
            }
            matrix.push_row(row);
        }
        Some(matrix)
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Borrow row `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.rows()`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Append a row. The row length must equal `cols()`.
    pub fn push_row(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.cols, "row length must match column count");
        self.data.extend_from_slice(row);
        self.rows += 1;
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// Copy of column `j`.
    #[must_use]
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.iter_rows().map(|row| row[j]).collect()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Ordered ticker identifiers defining the column layout of every matrix and
/// weight vector in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetList(Vec<String>);

impl AssetList {
    #[must_use]
    pub fn new(tickers: Vec<String>) -> Self {
        Self(tickers)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Column index of a ticker.
    #[must_use]
    pub fn index_of(&self, ticker: &str) -> Option<usize> {
        self.0.iter().position(|t| t == ticker)
    }
}

impl<S: Into<String>> FromIterator<S> for AssetList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Simple returns of the selected category, `(T-1) x N`, with no NaN cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnMatrix {
    assets: AssetList,
    returns: Matrix,
    dropped_dates: usize,
}

impl ReturnMatrix {
    /// Build the return matrix for `category`.
    ///
    /// A date is kept only if every ticker of the category has a finite,
    /// strictly positive price on it; otherwise the whole date is skipped, so
    /// no return divides by zero. The asset list is fixed by
    /// the first kept date, and later dates with a different ticker set count
    /// as incomplete.
    pub fn from_market(table: &MarketTable, category: &str) -> Result<Self> {
        if table.is_empty() {
            return Err(EngineError::DataEmpty);
        }

        let mut assets: Option<Vec<String>> = None;
        let mut prices: Vec<Vec<f64>> = Vec::new();
        let mut dropped_dates = 0;

        for (_, categories) in table.iter() {
            let tickers = categories
                .get(category)
                .ok_or_else(|| EngineError::CategoryNotFound(category.to_string()))?;

            if tickers.is_empty() || tickers.values().any(|v| !v.is_finite() || *v <= 0.0) {
                dropped_dates += 1;
                continue;
            }

            let columns = assets.get_or_insert_with(|| {
                prices = vec![Vec::new(); tickers.len()];
                tickers.keys().cloned().collect()
            });

            if tickers.len() != columns.len() || !tickers.keys().eq(columns.iter()) {
                dropped_dates += 1;
                continue;
            }

            for (series, value) in prices.iter_mut().zip(tickers.values()) {
                series.push(*value);
            }
        }

        let Some(assets) = assets else {
            return Err(EngineError::EmptyCategory(category.to_string()));
        };
        let kept = prices.first().map_or(0, Vec::len);
        if kept < 2 {
            return Err(EngineError::EmptyCategory(category.to_string()));
        }

        let num_assets = assets.len();
        let mut returns = Matrix::zeros(kept - 1, num_assets);
        for (j, series) in prices.iter().enumerate() {
            for (t, pair) in series.windows(2).enumerate() {
                returns.set(t, j, (pair[1] - pair[0]) / pair[0]);
            }
        }
        check_finite(&returns)?;

        tracing::debug!(
            category,
            assets = num_assets,
            periods = kept - 1,
            dropped_dates,
            "built return matrix"
        );

        Ok(Self {
            assets: AssetList::new(assets),
            returns,
            dropped_dates,
        })
    }

    /// Wrap an existing return matrix, e.g. synthetic or externally computed returns.
    pub fn from_returns(assets: AssetList, returns: Matrix) -> Result<Self> {
        if assets.is_empty() || returns.is_empty() {
            return Err(EngineError::InvalidReturns(
                "return matrix needs at least one asset and one period".to_string(),
            ));
        }
        if returns.cols() != assets.len() {
            return Err(EngineError::InvalidReturns(format!(
                "{} columns for {} assets",
                returns.cols(),
                assets.len()
            )));
        }
        check_finite(&returns)?;
        Ok(Self {
            assets,
            returns,
            dropped_dates: 0,
        })
    }

    #[must_use]
    pub fn assets(&self) -> &AssetList {
        &self.assets
    }

    #[must_use]
    pub fn returns(&self) -> &Matrix {
        &self.returns
    }

    /// Number of return periods (T-1 for T kept dates).
    #[must_use]
    pub fn num_periods(&self) -> usize {
        self.returns.rows()
    }

    #[must_use]
    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    /// Dates skipped because of missing observations.
    #[must_use]
    pub fn dropped_dates(&self) -> usize {
        self.dropped_dates
    }

    /// One-step portfolio return for each of the first `count` periods.
    #[must_use]
    pub fn portfolio_returns(&self, weights: &[f64], count: usize) -> Vec<f64> {
        self.returns
            .iter_rows()
            .take(count)
            .map(|row| row.iter().zip(weights).map(|(r, w)| r * w).sum())
            .collect()
    }
}

fn check_finite(returns: &Matrix) -> Result<()> {
    match returns.as_slice().iter().position(|r| !r.is_finite()) {
        Some(i) => Err(EngineError::InvalidReturns(format!(
            "non-finite return at period {}, column {}",
            i / returns.cols().max(1),
            i % returns.cols().max(1)
        ))),
        None => Ok(()),
    }
}
