//! Valuation/growth factor implementation.

use factorbt_primitives::{Date, FactorRecord, StockId};
use factorbt_traits::{FactorError, FactorModel};
use polars::prelude::*;

/// Configuration for the valuation/growth factor.
#[derive(Debug, Clone)]
pub struct ValueGrowthConfig {
    /// Fundamentals column holding the valuation ratio (e.g. P/E).
    pub valuation_column: String,
    /// Fundamentals column holding the growth rate, as a fraction.
    pub growth_column: String,
}

impl Default for ValueGrowthConfig {
    fn default() -> Self {
        Self { valuation_column: "pe".to_string(), growth_column: "growth".to_string() }
    }
}

/// Valuation-per-growth factor (PEG style): valuation ratio divided by
/// growth rate, one value per stock per trade date.
///
/// Input policy is exact: a stock whose valuation or growth input is
/// missing, or whose growth rate is negative or zero, gets the degenerate
/// sentinel rather than a null or an undefined ratio. The sentinel routes
/// the stock to the excluded bucket downstream.
#[derive(Debug, Clone)]
pub struct ValueGrowthFactor {
    config: ValueGrowthConfig,
}

impl ValueGrowthFactor {
    /// Create the factor with default column names.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ValueGrowthConfig::default())
    }

    /// Create the factor with custom column names.
    #[must_use]
    pub const fn with_config(config: ValueGrowthConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ValueGrowthConfig {
        &self.config
    }

    fn raw_value(valuation: Option<f64>, growth: Option<f64>) -> Option<f64> {
        match (valuation, growth) {
            (Some(v), Some(g)) if g > 0.0 => {
                let ratio = v / g;
                ratio.is_finite().then_some(ratio)
            }
            _ => None,
        }
    }
}

impl Default for ValueGrowthFactor {
    fn default() -> Self {
        Self::new()
    }
}

impl FactorModel for ValueGrowthFactor {
    fn name(&self) -> &str {
        "value_growth"
    }

    fn required_columns(&self) -> &[&str] {
        &["symbol", "pe", "growth"]
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
        let valuations = fundamentals
            .column(&self.config.valuation_column)
            .map_err(|_| FactorError::MissingColumn(self.config.valuation_column.clone()))?
            .f64()?;
        let growths = fundamentals
            .column(&self.config.growth_column)
            .map_err(|_| FactorError::MissingColumn(self.config.growth_column.clone()))?
            .f64()?;

        let mut records = Vec::with_capacity(fundamentals.height());
        for i in 0..fundamentals.height() {
            let symbol = symbols
                .get(i)
                .ok_or_else(|| FactorError::Schema(format!("null symbol at row {i}")))?;
            let raw = Self::raw_value(valuations.get(i), growths.get(i));
            records.push(FactorRecord::new(StockId::new(symbol), date, raw));
        }
        Ok(records)
    }
}
