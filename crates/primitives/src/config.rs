//! Backtest configuration.

use serde::{Deserialize, Serialize};

/// Ranking direction for bucket assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Bucket 1 holds the lowest standardized values.
    Ascending,
    /// Bucket 1 holds the highest standardized values.
    Descending,
}

/// Correlation method for the information coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IcMethod {
    /// Rank correlation (default).
    Spearman,
    /// Linear correlation.
    Pearson,
}

/// Invalid configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A count-like parameter was zero.
    #[error("{name} must be at least 1")]
    ZeroCount {
        /// Parameter name.
        name: &'static str,
    },
    /// A cost or threshold was out of range.
    #[error("{name} out of range: {value}")]
    OutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// Immutable configuration for a full backtest run.
///
/// One instance is passed into the pipeline entry point; no stage carries
/// its own mutable tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Number of ranked factor buckets (K). The excluded bucket is K+1.
    pub n_buckets: u32,
    /// Number of equal-population size buckets for size neutralization.
    pub size_buckets: u32,
    /// Ranking direction for bucket assignment.
    pub direction: Direction,
    /// Nominal calendar days between scheduled rebalance dates.
    pub rebalance_every: u32,
    /// Minimum trading days of lookback history a period requires.
    pub min_lookback_days: u32,
    /// Initial calendar-day buffer when assembling lookback history.
    pub lookback_buffer_days: u32,
    /// Calendar days added per lookback expansion attempt.
    pub lookback_expand_step: u32,
    /// Maximum number of lookback expansion attempts before skipping.
    pub max_lookback_expansions: u32,
    /// Bounded search window (calendar days) for nearest-trading-day resolution.
    pub calendar_search_days: u32,
    /// Round-trip commission, as a fraction of traded value.
    pub commission: f64,
    /// Round-trip slippage assumption, as a fraction.
    pub slippage: f64,
    /// Round-trip transaction tax, as a fraction.
    pub tax: f64,
    /// Clip size-adjusted values at mean ± this many sigmas before
    /// standardization (`None` to disable).
    pub sigma_clip: Option<f64>,
    /// Correlation method for the IC series.
    pub ic_method: IcMethod,
}

impl BacktestConfig {
    /// Total round-trip trading cost deducted from each stock return.
    #[must_use]
    pub fn round_trip_cost(&self) -> f64 {
        self.commission + self.slippage + self.tax
    }

    /// Check the configuration for structurally impossible values.
    ///
    /// # Errors
    /// Returns `ConfigError` for zero counts or negative costs/thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_buckets == 0 {
            return Err(ConfigError::ZeroCount { name: "n_buckets" });
        }
        if self.size_buckets == 0 {
            return Err(ConfigError::ZeroCount { name: "size_buckets" });
        }
        if self.rebalance_every == 0 {
            return Err(ConfigError::ZeroCount { name: "rebalance_every" });
        }
        if self.calendar_search_days == 0 {
            return Err(ConfigError::ZeroCount { name: "calendar_search_days" });
        }
        for (name, value) in
            [("commission", self.commission), ("slippage", self.slippage), ("tax", self.tax)]
        {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }
        if let Some(sigma) = self.sigma_clip {
            if sigma <= 0.0 {
                return Err(ConfigError::OutOfRange { name: "sigma_clip", value: sigma });
            }
        }
        Ok(())
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            n_buckets: 5,
            size_buckets: 3,
            direction: Direction::Descending,
            rebalance_every: 30,
            min_lookback_days: 60,
            lookback_buffer_days: 120,
            lookback_expand_step: 30,
            max_lookback_expansions: 3,
            calendar_search_days: 10,
            commission: 0.0005,
            slippage: 0.001,
            tax: 0.001,
            sigma_clip: Some(3.0),
            ic_method: IcMethod::Spearman,
        }
    }
}
