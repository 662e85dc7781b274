use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Observations for one category on one date: ticker -> value
pub type TickerValues = BTreeMap<String, f64>;

/// All categories observed on one date: category -> ticker -> value
pub type CategoryValues = BTreeMap<String, TickerValues>;

/// Market data keyed by date, then category (e.g. "Close"), then ticker.
///
/// Values may be NaN when a ticker has no observation on a date. Every level
/// is an ordered map, so iteration follows lexicographic date order, which
/// matches chronological order for ISO-8601 date strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketTable {
    dates: BTreeMap<String, CategoryValues>,
}

impl MarketTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or overwrite) a single observation.
    pub fn insert(
        &mut self,
        date: impl Into<String>,
        category: impl Into<String>,
        ticker: impl Into<String>,
        value: f64,
    ) {
        self.dates
            .entry(date.into())
            .or_default()
            .entry(category.into())
            .or_default()
            .insert(ticker.into(), value);
    }

    /// Number of dates in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Dates in iteration order.
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.dates.keys().map(String::as_str)
    }

    /// Iterate over `(date, categories)` pairs in date order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryValues)> {
        self.dates.iter().map(|(date, values)| (date.as_str(), values))
    }

    /// Categories observed on a given date.
    #[must_use]
    pub fn get(&self, date: &str) -> Option<&CategoryValues> {
        self.dates.get(date)
    }

    /// Union of all category names across dates.
    #[must_use]
    pub fn categories(&self) -> BTreeSet<&str> {
        self.dates
            .values()
            .flat_map(|categories| categories.keys().map(String::as_str))
            .collect()
    }

    /// A new table holding only the first `n` dates.
    #[must_use]
    pub fn prefix(&self, n: usize) -> Self {
        Self {
            dates: self
                .dates
                .iter()
                .take(n)
                .map(|(date, values)| (date.clone(), values.clone()))
                .collect(),
        }
    }

    /// Keep only the dates for which `keep` returns true.
    pub fn retain_dates<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.dates.retain(|date, _| keep(date));
    }
}

impl From<BTreeMap<String, CategoryValues>> for MarketTable {
    fn from(dates: BTreeMap<String, CategoryValues>) -> Self {
        Self { dates }
    }
}

impl FromIterator<(String, String, String, f64)> for MarketTable {
    fn from_iter<I: IntoIterator<Item = (String, String, String, f64)>>(iter: I) -> Self {
        let mut table = MarketTable::new();
        for (date, category, ticker, value) in iter {
            table.insert(date, category, ticker, value);
        }
        table
    }
}
