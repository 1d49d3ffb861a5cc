//! Forward-return measurement over resolved period windows.

use std::collections::BTreeMap;

use factorbt_primitives::{Date, StockId};
use tracing::debug;

use crate::{BenchmarkPanel, PricePanel};

/// Computes net forward returns between two resolved trading days.
///
/// Stock returns carry the configured round-trip cost; the benchmark is a
/// reference series and trades nothing, so its return is gross.
#[derive(Debug, Clone, Copy)]
pub struct ReturnCalculator {
    round_trip_cost: f64,
}

impl ReturnCalculator {
    /// Create a calculator with a fixed round-trip cost per stock trade.
    #[must_use]
    pub const fn new(round_trip_cost: f64) -> Self {
        Self { round_trip_cost }
    }

    /// Net simple return for one entry/exit price pair.
    #[must_use]
    pub fn stock_return(&self, entry: f64, exit: f64) -> f64 {
        exit / entry - 1.0 - self.round_trip_cost
    }

    /// Net forward returns for a universe over `[entry_date, exit_date]`.
    ///
    /// Stocks with a missing or non-positive price at either end are
    /// omitted from the map; the caller records them as unmeasurable
    /// rather than inventing a fill.
    #[must_use]
    pub fn stock_returns(
        &self,
        prices: &PricePanel,
        universe: &[StockId],
        entry_date: Date,
        exit_date: Date,
    ) -> BTreeMap<StockId, f64> {
        let mut returns = BTreeMap::new();
        for stock in universe {
            let (Some(entry), Some(exit)) =
                (prices.close(stock, entry_date), prices.close(stock, exit_date))
            else {
                debug!(%stock, %entry_date, %exit_date, "missing price, return unmeasured");
                continue;
            };
            if entry <= 0.0 {
                debug!(%stock, entry, "non-positive entry price, return unmeasured");
                continue;
            }
            returns.insert(stock.clone(), self.stock_return(entry, exit));
        }
        returns
    }

    /// Gross benchmark return over `[entry_date, exit_date]` in the
    /// benchmark's own calendar, if both closes exist.
    #[must_use]
    pub fn benchmark_return(
        &self,
        benchmark: &BenchmarkPanel,
        entry_date: Date,
        exit_date: Date,
    ) -> Option<f64> {
        let entry = benchmark.close(entry_date)?;
        let exit = benchmark.close(exit_date)?;
        if entry <= 0.0 {
            return None;
        }
        Some(exit / entry - 1.0)
    }
}
