//! CSV ingestion into a [`MarketTable`]
//!
//! Files use the three-header-row layout written by Yahoo Finance exports:
//!
//! ```text
//! Price,Close,Close,Volume
//! Ticker,AAA,BBB,AAA
//! Date,,,
//! 2024-01-02,101.5,55.1,1200
//! ```
//!
//! Row one names the category of each column, row two its ticker. The
//! `Date` row is skipped when present. Every following row starts with a
//! date; empty cells are stored as NaN so the return builder can drop
//! the date later.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use jiff::civil::Date;
use riskmc_core::MarketTable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing {0} header row")]
    MissingHeader(&'static str),

    #[error("header rows have {categories} categories but {tickers} tickers")]
    HeaderMismatch { categories: usize, tickers: usize },

    #[error("line {line}: invalid date '{value}'")]
    InvalidDate { line: u64, value: String },

    #[error("line {line}, column {column}: invalid number '{value}'")]
    InvalidNumber {
        line: u64,
        column: usize,
        value: String,
    },

    #[error("no data rows in input")]
    NoRows,
}

/// Date window applied while loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// First date kept (inclusive)
    pub start: Option<Date>,
    /// Last date kept (inclusive)
    pub end: Option<Date>,
}

impl LoadOptions {
    fn contains(&self, date: Date) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Load a market CSV file from disk.
pub fn load_market_csv(path: &Path, options: &LoadOptions) -> Result<MarketTable, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_market(file, options)?;
    tracing::info!(
        path = %path.display(),
        dates = table.len(),
        categories = ?table.categories(),
        "market data loaded"
    );
    Ok(table)
}

/// Parse market CSV text from any reader.
pub fn read_market<R: Read>(reader: R, options: &LoadOptions) -> Result<MarketTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = rdr.records();

    let categories = records.next().ok_or(LoadError::MissingHeader("category"))??;
    let tickers = records.next().ok_or(LoadError::MissingHeader("ticker"))??;
    if categories.len() != tickers.len() {
        return Err(LoadError::HeaderMismatch {
            categories: categories.len(),
            tickers: tickers.len(),
        });
    }
    let columns: Vec<(String, String)> = categories
        .iter()
        .zip(tickers.iter())
        .skip(1)
        .map(|(c, t)| (c.to_string(), t.to_string()))
        .collect();

    let mut table = MarketTable::new();
    let mut rows = 0usize;
    for record in records {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let Some(first) = record.get(0) else {
            continue;
        };
        if first.is_empty() {
            tracing::trace!(line, "skipping row without date");
            continue;
        }
        if first.eq_ignore_ascii_case("date") {
            continue;
        }

        let date = parse_date(first).ok_or_else(|| LoadError::InvalidDate {
            line,
            value: first.to_string(),
        })?;
        rows += 1;
        if !options.contains(date) {
            continue;
        }

        let key = date.to_string();
        for (i, (category, ticker)) in columns.iter().enumerate() {
            let column = i + 1;
            let cell = record.get(column).unwrap_or("");
            let value = if cell.is_empty() {
                f64::NAN
            } else {
                cell.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
                    line,
                    column,
                    value: cell.to_string(),
                })?
            };
            table.insert(key.as_str(), category.as_str(), ticker.as_str(), value);
        }
    }

    if rows == 0 {
        return Err(LoadError::NoRows);
    }
    Ok(table)
}

/// Accepts `YYYY-MM-DD` with an optional trailing time part.
fn parse_date(cell: &str) -> Option<Date> {
    let day = cell.get(..10).unwrap_or(cell);
    day.parse::<Date>().ok()
}
