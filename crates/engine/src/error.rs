//! Error types for the backtest engine.
//!
//! Recoverable per-period conditions (insufficient lookback, calendar
//! mismatches, degenerate inputs, zero variance) never surface here: they
//! are recorded as [`factorbt_primitives::SkipReason`] gaps or defined
//! fallbacks and the backtest continues. `EngineError` covers structural
//! failures only.

use factorbt_math::MathError;
use factorbt_primitives::ConfigError;
use factorbt_traits::{FactorError, SourceError};

/// Errors that abort a backtest run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Data source error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Factor computation error.
    #[error("factor error: {0}")]
    Factor(#[from] FactorError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// A source exposed no trading days in the requested range.
    #[error("no trading days in {calendar} calendar for the requested range")]
    NoTradingDays {
        /// Which source's calendar was empty.
        calendar: String,
    },

    /// Every scheduled period was skipped: the universe was effectively
    /// empty for the whole date range.
    #[error("no rebalance period completed over the requested range")]
    NoCompletedPeriods,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EngineError::NoTradingDays { calendar: "benchmark".to_string() };
        assert!(err.to_string().contains("benchmark"));

        let err = EngineError::NoCompletedPeriods;
        assert!(err.to_string().contains("no rebalance period"));
    }
}
