//! Backtest report types.

use serde::{Deserialize, Serialize};

use crate::{Date, PeriodGap};

/// Aggregated statistics for one completed rebalance period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// Position in the scheduled sequence.
    pub period_index: usize,
    /// Resolved equity rebalance date.
    pub date: Date,
    /// Mean realized return per ranked bucket, index 0 = bucket 1.
    /// `None` when no stock in the bucket had a measurable return.
    pub bucket_mean_returns: Vec<Option<f64>>,
    /// Cross-sectional information coefficient; `None` when undefined
    /// (fewer than two non-degenerate stocks with realized returns, or
    /// zero variance).
    pub ic: Option<f64>,
    /// Universe size for the period.
    pub stock_count: usize,
    /// Stocks in the excluded bucket.
    pub degenerate_count: usize,
    /// Fraction of the universe whose bucket changed vs. the prior period.
    pub turnover: f64,
    /// Benchmark return over the same window, in its own calendar.
    pub benchmark_return: Option<f64>,
}

/// Summary statistics over the IC series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcSummary {
    /// Mean of the defined ICs.
    pub mean: Option<f64>,
    /// Sample standard deviation of the defined ICs.
    pub std: Option<f64>,
    /// Mean / std (the IC information ratio).
    pub ratio: Option<f64>,
    /// Number of periods with a defined IC.
    pub observations: usize,
}

impl IcSummary {
    /// Summarize an IC series, ignoring undefined entries.
    #[must_use]
    pub fn from_series(series: &[Option<f64>]) -> Self {
        let values: Vec<f64> = series.iter().filter_map(|ic| *ic).collect();
        let n = values.len();
        if n == 0 {
            return Self { mean: None, std: None, ratio: None, observations: 0 };
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        if n < 2 {
            return Self { mean: Some(mean), std: None, ratio: None, observations: n };
        }
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
        let std = variance.sqrt();
        let ratio = if std > 0.0 { Some(mean / std) } else { None };
        Self { mean: Some(mean), std: Some(std), ratio, observations: n }
    }
}

/// Full backtest result: ordered per-period snapshots plus summary
/// statistics and compounded cumulative-return curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Per-period statistics, in period order. Skipped periods are absent.
    pub snapshots: Vec<PerformanceSnapshot>,
    /// Skipped periods, recorded as gaps.
    pub gaps: Vec<PeriodGap>,
    /// IC series summary.
    pub ic_summary: IcSummary,
    /// Compounded cumulative return per ranked bucket; outer index 0 =
    /// bucket 1, inner index aligned with `snapshots`.
    pub cumulative_returns: Vec<Vec<f64>>,
    /// Compounded benchmark cumulative return, aligned with `snapshots`.
    pub benchmark_cumulative: Vec<f64>,
}

impl BacktestReport {
    /// Number of completed (non-skipped) periods.
    #[must_use]
    pub const fn n_periods(&self) -> usize {
        self.snapshots.len()
    }

    /// Final cumulative return for a ranked bucket (1-based), if any
    /// period completed.
    #[must_use]
    pub fn final_cumulative(&self, bucket: u32) -> Option<f64> {
        self.cumulative_returns.get(bucket as usize - 1)?.last().copied()
    }
}
