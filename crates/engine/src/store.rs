//! In-memory market data store.
//!
//! Backtests load their full data window up front and slice it per
//! period. [`MarketData`] implements the source contracts over plain
//! tables; [`PricePanel`] and [`BenchmarkPanel`] are the typed per-period
//! views the pipeline reads.

use std::collections::{BTreeMap, BTreeSet};

use factorbt_primitives::{Date, IndustryId, StockId};
use factorbt_traits::{
    BenchmarkSource, FundamentalsSource, IndustrySource, MarketCapSource, PriceSource,
    SourceError,
};
use polars::prelude::*;

use crate::TradingCalendar;
use crate::schedule::UniverseProvider;

pub(crate) fn parse_date(s: &str) -> Result<Date, SourceError> {
    Date::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| SourceError::Schema(format!("unparseable date {s:?}: {e}")))
}

fn format_date(date: Date) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn symbol_series(stocks: &[StockId]) -> Series {
    let symbols: Vec<&str> = stocks.iter().map(StockId::as_str).collect();
    Series::new("symbol".into(), symbols)
}

fn str_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, SourceError> {
    let column = df.column(name).map_err(|_| SourceError::MissingColumn(name.to_string()))?;
    Ok(column.str()?)
}

fn f64_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Float64Chunked, SourceError> {
    let column = df.column(name).map_err(|_| SourceError::MissingColumn(name.to_string()))?;
    Ok(column.f64()?)
}

fn distinct_days(df: &DataFrame, start: Date, end: Date) -> Result<Vec<Date>, SourceError> {
    let dates = str_column(df, "date")?;
    let mut days = BTreeSet::new();
    for s in dates.into_iter().flatten() {
        let day = parse_date(s)?;
        if day >= start && day <= end {
            days.insert(day);
        }
    }
    Ok(days.into_iter().collect())
}

/// Typed close-price panel for the equity universe, built once per run
/// from the price table.
#[derive(Debug, Clone)]
pub struct PricePanel {
    closes: BTreeMap<StockId, BTreeMap<Date, f64>>,
    calendar: TradingCalendar,
}

impl PricePanel {
    /// Build a panel from a | symbol | date | close | table.
    ///
    /// # Errors
    /// Returns `SourceError` if required columns are missing or dates are
    /// unparseable.
    pub fn from_frame(df: &DataFrame) -> Result<Self, SourceError> {
        let symbols = str_column(df, "symbol")?;
        let dates = str_column(df, "date")?;
        let closes = f64_column(df, "close")?;

        let mut map: BTreeMap<StockId, BTreeMap<Date, f64>> = BTreeMap::new();
        let mut days = BTreeSet::new();
        for i in 0..df.height() {
            let (Some(symbol), Some(date_str)) = (symbols.get(i), dates.get(i)) else {
                return Err(SourceError::Schema(format!("null symbol or date at row {i}")));
            };
            let day = parse_date(date_str)?;
            days.insert(day);
            if let Some(close) = closes.get(i) {
                map.entry(StockId::new(symbol)).or_default().insert(day, close);
            }
        }
        Ok(Self { closes: map, calendar: TradingCalendar::new(days.into_iter().collect()) })
    }

    /// Close price for a stock on an exact date.
    #[must_use]
    pub fn close(&self, stock: &StockId, date: Date) -> Option<f64> {
        self.closes.get(stock)?.get(&date).copied()
    }

    /// Trading days of price data a stock has on or before `as_of`.
    #[must_use]
    pub fn history_days(&self, stock: &StockId, as_of: Date) -> usize {
        self.closes.get(stock).map_or(0, |series| series.range(..=as_of).count())
    }

    /// Equity trading calendar derived from the panel.
    #[must_use]
    pub const fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }

    /// All stocks in the panel, sorted.
    #[must_use]
    pub fn stocks(&self) -> Vec<StockId> {
        self.closes.keys().cloned().collect()
    }
}

impl UniverseProvider for PricePanel {
    fn universe(&self, date: Date, min_history_days: usize) -> Vec<StockId> {
        self.closes
            .iter()
            .filter(|(_, series)| {
                series.contains_key(&date) && series.range(..=date).count() >= min_history_days
            })
            .map(|(stock, _)| stock.clone())
            .collect()
    }
}

/// Typed close-price panel for the benchmark index.
#[derive(Debug, Clone)]
pub struct BenchmarkPanel {
    closes: BTreeMap<Date, f64>,
    calendar: TradingCalendar,
}

impl BenchmarkPanel {
    /// Build a panel from a | date | close | table.
    ///
    /// # Errors
    /// Returns `SourceError` if required columns are missing or dates are
    /// unparseable.
    pub fn from_frame(df: &DataFrame) -> Result<Self, SourceError> {
        let dates = str_column(df, "date")?;
        let closes = f64_column(df, "close")?;

        let mut map = BTreeMap::new();
        for i in 0..df.height() {
            let Some(date_str) = dates.get(i) else {
                return Err(SourceError::Schema(format!("null date at row {i}")));
            };
            let day = parse_date(date_str)?;
            if let Some(close) = closes.get(i) {
                map.insert(day, close);
            }
        }
        let days: Vec<Date> = map.keys().copied().collect();
        Ok(Self { closes: map, calendar: TradingCalendar::new(days) })
    }

    /// Index close on an exact date.
    #[must_use]
    pub fn close(&self, date: Date) -> Option<f64> {
        self.closes.get(&date).copied()
    }

    /// Benchmark trading calendar derived from the panel.
    #[must_use]
    pub const fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }
}

/// In-memory implementation of all source contracts, backed by tables
/// loaded once for the whole backtest window.
///
/// Tables use string `YYYY-MM-DD` dates; ISO dates compare
/// lexicographically, so range filters work directly on the strings.
#[derive(Debug, Clone)]
pub struct MarketData {
    prices: DataFrame,
    benchmark: DataFrame,
    fundamentals: DataFrame,
    industries: DataFrame,
    market_caps: DataFrame,
}

impl MarketData {
    /// Assemble a store from the five source tables:
    /// prices | symbol, date, close |, benchmark | date, close |,
    /// fundamentals | symbol, date, ... |, industries | symbol, industry |,
    /// market caps | symbol, date, market_cap |.
    #[must_use]
    pub const fn new(
        prices: DataFrame,
        benchmark: DataFrame,
        fundamentals: DataFrame,
        industries: DataFrame,
        market_caps: DataFrame,
    ) -> Self {
        Self { prices, benchmark, fundamentals, industries, market_caps }
    }

    /// All stock ids present in the price table, sorted.
    ///
    /// # Errors
    /// Returns `SourceError` if the price table is malformed.
    pub fn stock_ids(&self) -> Result<Vec<StockId>, SourceError> {
        let symbols = str_column(&self.prices, "symbol")?;
        let set: BTreeSet<&str> = symbols.into_iter().flatten().collect();
        Ok(set.into_iter().map(StockId::new).collect())
    }
}

impl PriceSource for MarketData {
    fn price_history(
        &self,
        stocks: &[StockId],
        start: Date,
        end: Date,
    ) -> Result<DataFrame, SourceError> {
        let lf = self
            .prices
            .clone()
            .lazy()
            .filter(
                col("date")
                    .gt_eq(lit(format_date(start)))
                    .and(col("date").lt_eq(lit(format_date(end)))),
            );
        let lf = if stocks.is_empty() {
            lf
        } else {
            lf.filter(col("symbol").is_in(lit(symbol_series(stocks))))
        };
        Ok(lf.collect()?)
    }

    fn trading_days(&self, start: Date, end: Date) -> Result<Vec<Date>, SourceError> {
        distinct_days(&self.prices, start, end)
    }
}

impl BenchmarkSource for MarketData {
    fn index_history(&self, start: Date, end: Date) -> Result<DataFrame, SourceError> {
        let lf = self.benchmark.clone().lazy().filter(
            col("date")
                .gt_eq(lit(format_date(start)))
                .and(col("date").lt_eq(lit(format_date(end)))),
        );
        Ok(lf.collect()?)
    }

    fn trading_days(&self, start: Date, end: Date) -> Result<Vec<Date>, SourceError> {
        distinct_days(&self.benchmark, start, end)
    }
}

impl FundamentalsSource for MarketData {
    /// Point-in-time lookup: each symbol's most recent report row with
    /// `date <= as_of`. Fundamentals tables are typically sparser than
    /// the trading calendar (quarterly or monthly reports), so an exact
    /// date match would miss every rebalance date in between.
    fn fundamentals(&self, stocks: &[StockId], as_of: Date) -> Result<DataFrame, SourceError> {
        let lf = self
            .fundamentals
            .clone()
            .lazy()
            .filter(col("date").lt_eq(lit(format_date(as_of))))
            .filter(col("date").eq(col("date").max().over([col("symbol")])));
        let lf = if stocks.is_empty() {
            lf
        } else {
            lf.filter(col("symbol").is_in(lit(symbol_series(stocks))))
        };
        Ok(lf.collect()?)
    }
}

impl IndustrySource for MarketData {
    fn classify(&self, stocks: &[StockId]) -> Result<BTreeMap<StockId, IndustryId>, SourceError> {
        let symbols = str_column(&self.industries, "symbol")?;
        let industries = str_column(&self.industries, "industry")?;
        let wanted: BTreeSet<&str> = stocks.iter().map(StockId::as_str).collect();

        let mut map = BTreeMap::new();
        for i in 0..self.industries.height() {
            if let (Some(symbol), Some(industry)) = (symbols.get(i), industries.get(i)) {
                if wanted.is_empty() || wanted.contains(symbol) {
                    map.insert(StockId::new(symbol), IndustryId::new(industry));
                }
            }
        }
        Ok(map)
    }
}

impl MarketCapSource for MarketData {
    fn market_caps(
        &self,
        stocks: &[StockId],
        date: Date,
    ) -> Result<BTreeMap<StockId, f64>, SourceError> {
        let df = self
            .market_caps
            .clone()
            .lazy()
            .filter(col("date").lt_eq(lit(format_date(date))))
            .filter(col("date").eq(col("date").max().over([col("symbol")])))
            .collect()?;
        let symbols = str_column(&df, "symbol")?;
        let caps = f64_column(&df, "market_cap")?;
        let wanted: BTreeSet<&str> = stocks.iter().map(StockId::as_str).collect();

        let mut map = BTreeMap::new();
        for i in 0..df.height() {
            if let (Some(symbol), Some(cap)) = (symbols.get(i), caps.get(i)) {
                if wanted.is_empty() || wanted.contains(symbol) {
                    map.insert(StockId::new(symbol), cap);
                }
            }
        }
        Ok(map)
    }
}
