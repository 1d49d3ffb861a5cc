//! Data source contracts.
//!
//! Each source exposes its own trading-day surface where one exists: the
//! equity and benchmark calendars may diverge and are never resolved
//! through a shared helper.

use std::collections::BTreeMap;

use factorbt_primitives::{Date, IndustryId, StockId};
use polars::prelude::*;

/// Errors raised by data sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Missing required column in a source table.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// A source table did not match the expected schema.
    #[error("malformed source schema: {0}")]
    Schema(String),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),
}

/// Daily equity price history.
///
/// Tables carry at least | symbol (str) | date (str, `YYYY-MM-DD`) |
/// close (f64) | rows, one per stock per trading day.
pub trait PriceSource: Send + Sync {
    /// Price history for a stock set over a date range.
    ///
    /// # Errors
    /// Returns `SourceError` if the underlying table is malformed.
    fn price_history(
        &self,
        stocks: &[StockId],
        start: Date,
        end: Date,
    ) -> Result<DataFrame, SourceError>;

    /// Trading days of the equity calendar within a range, ascending.
    ///
    /// # Errors
    /// Returns `SourceError` if the underlying table is malformed.
    fn trading_days(&self, start: Date, end: Date) -> Result<Vec<Date>, SourceError>;
}

/// Daily benchmark index history. Kept separate from [`PriceSource`]
/// because the index trades on its own calendar.
pub trait BenchmarkSource: Send + Sync {
    /// Index history over a date range: | date (str) | close (f64) |.
    ///
    /// # Errors
    /// Returns `SourceError` if the underlying table is malformed.
    fn index_history(&self, start: Date, end: Date) -> Result<DataFrame, SourceError>;

    /// Trading days of the benchmark calendar within a range, ascending.
    ///
    /// # Errors
    /// Returns `SourceError` if the underlying table is malformed.
    fn trading_days(&self, start: Date, end: Date) -> Result<Vec<Date>, SourceError>;
}

/// Point-in-time fundamentals (valuation ratios, growth rates).
pub trait FundamentalsSource: Send + Sync {
    /// Fundamentals for a stock set as of a date: | symbol (str) | plus
    /// factor-specific value columns. Point-in-time: each symbol's most
    /// recent values on or before `as_of`, never a later report.
    ///
    /// # Errors
    /// Returns `SourceError` if the underlying table is malformed.
    fn fundamentals(&self, stocks: &[StockId], as_of: Date) -> Result<DataFrame, SourceError>;
}

/// Industry classification, static or slowly changing.
pub trait IndustrySource: Send + Sync {
    /// Industry label per stock. Stocks absent from the map are treated as
    /// unclassified by the caller.
    ///
    /// # Errors
    /// Returns `SourceError` if the underlying table is malformed.
    fn classify(&self, stocks: &[StockId]) -> Result<BTreeMap<StockId, IndustryId>, SourceError>;
}

/// Market capitalization per stock per date.
pub trait MarketCapSource: Send + Sync {
    /// Market caps for a stock set as of a date: each symbol's most
    /// recent value on or before `date`. Stocks with no value by then
    /// are absent from the map.
    ///
    /// # Errors
    /// Returns `SourceError` if the underlying table is malformed.
    fn market_caps(
        &self,
        stocks: &[StockId],
        date: Date,
    ) -> Result<BTreeMap<StockId, f64>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_display() {
        let err = SourceError::MissingColumn("close".to_string());
        assert_eq!(err.to_string(), "missing required column: close");

        let err = SourceError::Schema("date not parseable".to_string());
        assert!(err.to_string().contains("malformed"));
    }
}
