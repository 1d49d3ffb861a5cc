//! Earnings yield factor implementation.

use factorbt_primitives::{Date, FactorRecord, StockId};
use factorbt_traits::{FactorError, FactorModel};
use polars::prelude::*;

/// Earnings yield factor: the inverse of the P/E ratio.
///
/// Stocks with a missing or non-positive P/E get the degenerate sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarningsYieldFactor;

impl EarningsYieldFactor {
    /// Create the factor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FactorModel for EarningsYieldFactor {
    fn name(&self) -> &str {
        "earnings_yield"
    }

    fn required_columns(&self) -> &[&str] {
        &["symbol", "pe"]
    }

    fn compute(
        &self,
        date: Date,
        fundamentals: &DataFrame,
    ) -> Result<Vec<FactorRecord>, FactorError> {
        let symbols = fundamentals
            .column("symbol")
            .map_err(|_| FactorError::MissingColumn("symbol".to_string()))?
            .str()?;
        let pes = fundamentals
            .column("pe")
            .map_err(|_| FactorError::MissingColumn("pe".to_string()))?
            .f64()?;

        let mut records = Vec::with_capacity(fundamentals.height());
        for i in 0..fundamentals.height() {
            let symbol = symbols
                .get(i)
                .ok_or_else(|| FactorError::Schema(format!("null symbol at row {i}")))?;
            let raw = match pes.get(i) {
                Some(pe) if pe > 0.0 => Some(1.0 / pe),
                _ => None,
            };
            records.push(FactorRecord::new(StockId::new(symbol), date, raw));
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn date() -> Date {
        Date::from_ymd_opt(2024, 3, 29).unwrap()
    }

    #[test]
    fn inverse_pe() {
        let df = df! {
            "symbol" => &["A", "B", "C"],
            "pe" => &[Some(20.0), Some(-5.0), None],
        }
        .unwrap();

        let records = EarningsYieldFactor::new().compute(date(), &df).unwrap();
        assert_relative_eq!(records[0].raw.unwrap(), 0.05, epsilon = 1e-12);
        assert!(records[1].is_degenerate());
        assert!(records[2].is_degenerate());
    }

    #[test]
    fn factor_name() {
        assert_eq!(EarningsYieldFactor::new().name(), "earnings_yield");
    }
}
