//! Cross-period performance aggregation.
//!
//! Periods arrive in order; the aggregator folds each completed snapshot
//! into the IC series, per-bucket mean returns, turnover, and compounded
//! cumulative curves, then seals everything into a [`BacktestReport`].
//! Skipped periods are recorded as gaps and leave every running statistic
//! untouched.

use std::collections::BTreeMap;

use factorbt_primitives::{
    BacktestConfig, BacktestReport, BucketLabel, IcMethod, IcSummary, PerformanceSnapshot,
    PeriodGap, PeriodSnapshot, StockId,
};
use polars::prelude::*;
use tracing::debug;

/// Folds per-period snapshots into the final report.
#[derive(Debug)]
pub struct PerformanceAggregator {
    n_buckets: u32,
    ic_method: IcMethod,
    prev_buckets: Option<BTreeMap<StockId, BucketLabel>>,
    ic_series: Vec<Option<f64>>,
    snapshots: Vec<PerformanceSnapshot>,
    gaps: Vec<PeriodGap>,
    // Running compounding factor and curve per ranked bucket.
    bucket_factors: Vec<f64>,
    bucket_curves: Vec<Vec<f64>>,
    benchmark_factor: f64,
    benchmark_curve: Vec<f64>,
}

impl PerformanceAggregator {
    /// Create an aggregator for a run with the given configuration.
    #[must_use]
    pub fn new(config: &BacktestConfig) -> Self {
        let k = config.n_buckets as usize;
        Self {
            n_buckets: config.n_buckets,
            ic_method: config.ic_method,
            prev_buckets: None,
            ic_series: Vec::new(),
            snapshots: Vec::new(),
            gaps: Vec::new(),
            bucket_factors: vec![1.0; k],
            bucket_curves: vec![Vec::new(); k],
            benchmark_factor: 1.0,
            benchmark_curve: Vec::new(),
        }
    }

    /// Fold one completed period into the running statistics.
    pub fn ingest(&mut self, snapshot: &PeriodSnapshot) {
        let ic = self.period_ic(snapshot);
        let bucket_means = self.bucket_means(snapshot);
        let turnover = self.turnover(snapshot);

        for (k, mean) in bucket_means.iter().enumerate() {
            // A bucket with no measurable return holds flat for the period.
            self.bucket_factors[k] *= 1.0 + mean.unwrap_or(0.0);
            self.bucket_curves[k].push(self.bucket_factors[k] - 1.0);
        }
        self.benchmark_factor *= 1.0 + snapshot.benchmark_return.unwrap_or(0.0);
        self.benchmark_curve.push(self.benchmark_factor - 1.0);

        self.prev_buckets = Some(
            snapshot.records.iter().map(|r| (r.stock.clone(), r.bucket)).collect(),
        );
        self.ic_series.push(ic);

        debug!(
            period = snapshot.period_index,
            date = %snapshot.date,
            ic = ?ic,
            turnover,
            stocks = snapshot.universe_size(),
            "period aggregated"
        );
        self.snapshots.push(PerformanceSnapshot {
            period_index: snapshot.period_index,
            date: snapshot.date,
            bucket_mean_returns: bucket_means,
            ic,
            stock_count: snapshot.universe_size(),
            degenerate_count: snapshot.degenerate_count(),
            turnover,
            benchmark_return: snapshot.benchmark_return,
        });
    }

    /// Record a skipped period. Gaps never touch the running statistics.
    pub fn record_gap(&mut self, gap: PeriodGap) {
        self.gaps.push(gap);
    }

    /// Seal the run into a report.
    #[must_use]
    pub fn finish(self) -> BacktestReport {
        BacktestReport {
            ic_summary: IcSummary::from_series(&self.ic_series),
            snapshots: self.snapshots,
            gaps: self.gaps,
            cumulative_returns: self.bucket_curves,
            benchmark_cumulative: self.benchmark_curve,
        }
    }

    /// IC over ranked stocks that have both a standardized value and a
    /// realized return. Degenerate and unmeasured stocks never enter.
    fn period_ic(&self, snapshot: &PeriodSnapshot) -> Option<f64> {
        let mut factor = Vec::new();
        let mut forward = Vec::new();
        for record in snapshot.ranked() {
            if let (Some(neutralized), Some(ret)) = (&record.neutralized, record.forward_return)
            {
                factor.push(neutralized.standardized);
                forward.push(ret);
            }
        }
        match self.ic_method {
            IcMethod::Spearman => factorbt_math::spearman(&factor, &forward),
            IcMethod::Pearson => factorbt_math::pearson(&factor, &forward),
        }
    }

    /// Mean realized return per ranked bucket; `None` for empty buckets.
    fn bucket_means(&self, snapshot: &PeriodSnapshot) -> Vec<Option<f64>> {
        let k = self.n_buckets as usize;
        let mut sums = vec![0.0_f64; k];
        let mut counts = vec![0_usize; k];
        for record in &snapshot.records {
            if let (BucketLabel::Ranked(rank), Some(ret)) = (record.bucket, record.forward_return)
            {
                let idx = rank as usize - 1;
                sums[idx] += ret;
                counts[idx] += 1;
            }
        }
        sums.iter()
            .zip(&counts)
            .map(|(&sum, &count)| (count > 0).then(|| sum / count as f64))
            .collect()
    }

    /// Fraction of the current universe whose bucket changed since the
    /// prior period. The first period has nothing to trade against and
    /// reports 0; stocks absent from the prior period count as changed.
    fn turnover(&self, snapshot: &PeriodSnapshot) -> f64 {
        let Some(prev) = &self.prev_buckets else {
            return 0.0;
        };
        if snapshot.records.is_empty() {
            return 0.0;
        }
        let changed = snapshot
            .records
            .iter()
            .filter(|r| prev.get(&r.stock) != Some(&r.bucket))
            .count();
        changed as f64 / snapshot.records.len() as f64
    }
}

/// Flatten a report into a tabular frame: one row per completed period,
/// one column per ranked bucket's mean return.
///
/// # Errors
/// Returns `PolarsError` if the columns cannot be assembled.
pub fn report_frame(report: &BacktestReport, n_buckets: u32) -> Result<DataFrame, PolarsError> {
    let n = report.snapshots.len();
    let mut period_index = Vec::with_capacity(n);
    let mut dates = Vec::with_capacity(n);
    let mut ics = Vec::with_capacity(n);
    let mut turnovers = Vec::with_capacity(n);
    let mut stock_counts = Vec::with_capacity(n);
    let mut degenerate_counts = Vec::with_capacity(n);
    let mut benchmark_returns = Vec::with_capacity(n);
    for snapshot in &report.snapshots {
        period_index.push(snapshot.period_index as u32);
        dates.push(snapshot.date.format("%Y-%m-%d").to_string());
        ics.push(snapshot.ic);
        turnovers.push(snapshot.turnover);
        stock_counts.push(snapshot.stock_count as u32);
        degenerate_counts.push(snapshot.degenerate_count as u32);
        benchmark_returns.push(snapshot.benchmark_return);
    }

    let mut columns = vec![
        Column::new("period".into(), period_index),
        Column::new("date".into(), dates),
        Column::new("ic".into(), ics),
        Column::new("turnover".into(), turnovers),
        Column::new("stocks".into(), stock_counts),
        Column::new("degenerate".into(), degenerate_counts),
        Column::new("benchmark_return".into(), benchmark_returns),
    ];
    for k in 0..n_buckets as usize {
        let means: Vec<Option<f64>> = report
            .snapshots
            .iter()
            .map(|s| s.bucket_mean_returns.get(k).copied().flatten())
            .collect();
        columns.push(Column::new(format!("bucket_{}", k + 1).into(), means));
    }
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use factorbt_primitives::{Date, NeutralizedFactor, SkipReason, SnapshotRecord};

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn ranked_record(id: &str, z: f64, rank: u32, ret: Option<f64>) -> SnapshotRecord {
        SnapshotRecord {
            stock: StockId::new(id),
            raw: Some(z),
            neutralized: Some(NeutralizedFactor {
                industry_residual: z,
                size_adjusted: z,
                standardized: z,
            }),
            bucket: BucketLabel::Ranked(rank),
            forward_return: ret,
        }
    }

    fn degenerate_record(id: &str) -> SnapshotRecord {
        SnapshotRecord {
            stock: StockId::new(id),
            raw: None,
            neutralized: None,
            bucket: BucketLabel::Excluded,
            forward_return: None,
        }
    }

    fn config() -> BacktestConfig {
        BacktestConfig { n_buckets: 2, ..Default::default() }
    }

    fn snapshot(period_index: usize, records: Vec<SnapshotRecord>) -> PeriodSnapshot {
        PeriodSnapshot {
            period_index,
            date: ymd(2024, 1, 2 + period_index as u32),
            records,
            benchmark_return: Some(0.01),
        }
    }

    #[test]
    fn first_period_turnover_is_zero() {
        let mut agg = PerformanceAggregator::new(&config());
        agg.ingest(&snapshot(0, vec![ranked_record("A", 1.0, 1, Some(0.02))]));
        let report = agg.finish();
        assert_relative_eq!(report.snapshots[0].turnover, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn turnover_counts_changed_and_new_stocks() {
        let mut agg = PerformanceAggregator::new(&config());
        agg.ingest(&snapshot(
            0,
            vec![
                ranked_record("A", 1.0, 1, Some(0.02)),
                ranked_record("B", -1.0, 2, Some(-0.01)),
            ],
        ));
        // A keeps bucket 1, B moves to bucket 1, C is new: 2 of 3 changed.
        agg.ingest(&snapshot(
            1,
            vec![
                ranked_record("A", 1.0, 1, Some(0.02)),
                ranked_record("B", 0.9, 1, Some(0.01)),
                ranked_record("C", -1.0, 2, Some(0.0)),
            ],
        ));
        let report = agg.finish();
        assert_relative_eq!(report.snapshots[1].turnover, 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn bucket_means_exclude_unmeasured_and_degenerate() {
        let mut agg = PerformanceAggregator::new(&config());
        agg.ingest(&snapshot(
            0,
            vec![
                ranked_record("A", 1.0, 1, Some(0.04)),
                ranked_record("B", 0.8, 1, Some(0.02)),
                ranked_record("C", -0.5, 2, None),
                degenerate_record("D"),
            ],
        ));
        let report = agg.finish();
        let means = &report.snapshots[0].bucket_mean_returns;
        assert_relative_eq!(means[0].unwrap(), 0.03, epsilon = 1e-12);
        // Bucket 2's only stock had no measurable return.
        assert_eq!(means[1], None);
        assert_eq!(report.snapshots[0].degenerate_count, 1);
    }

    #[test]
    fn empty_bucket_compounds_flat() {
        let mut agg = PerformanceAggregator::new(&config());
        agg.ingest(&snapshot(
            0,
            vec![ranked_record("A", 1.0, 1, Some(0.10)), ranked_record("B", -1.0, 2, None)],
        ));
        agg.ingest(&snapshot(
            1,
            vec![
                ranked_record("A", 1.0, 1, Some(0.10)),
                ranked_record("B", -1.0, 2, Some(0.05)),
            ],
        ));
        let report = agg.finish();
        assert_relative_eq!(report.cumulative_returns[0][1], 0.21, epsilon = 1e-12);
        // Bucket 2 held flat in period 0, then compounded period 1 alone.
        assert_relative_eq!(report.cumulative_returns[1][0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(report.cumulative_returns[1][1], 0.05, epsilon = 1e-12);
    }

    #[test]
    fn ic_undefined_below_two_observations() {
        let mut agg = PerformanceAggregator::new(&config());
        agg.ingest(&snapshot(
            0,
            vec![ranked_record("A", 1.0, 1, Some(0.02)), degenerate_record("B")],
        ));
        let report = agg.finish();
        assert_eq!(report.snapshots[0].ic, None);
        assert_eq!(report.ic_summary.observations, 0);
    }

    #[test]
    fn spearman_ic_is_rank_based() {
        let mut agg = PerformanceAggregator::new(&config());
        // Monotone but non-linear relation: rank correlation is exactly 1.
        agg.ingest(&snapshot(
            0,
            vec![
                ranked_record("A", 1.0, 1, Some(0.001)),
                ranked_record("B", 2.0, 1, Some(0.002)),
                ranked_record("C", 3.0, 2, Some(0.5)),
            ],
        ));
        let report = agg.finish();
        assert_relative_eq!(report.snapshots[0].ic.unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn gaps_do_not_touch_curves() {
        let mut agg = PerformanceAggregator::new(&config());
        agg.ingest(&snapshot(0, vec![ranked_record("A", 1.0, 1, Some(0.10))]));
        agg.record_gap(PeriodGap {
            index: 1,
            nominal_date: ymd(2024, 2, 1),
            reason: SkipReason::EmptyUniverse,
        });
        agg.ingest(&snapshot(2, vec![ranked_record("A", 1.0, 1, Some(0.10))]));
        let report = agg.finish();
        assert_eq!(report.n_periods(), 2);
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.cumulative_returns[0].len(), 2);
        assert_relative_eq!(report.final_cumulative(1).unwrap(), 0.21, epsilon = 1e-12);
    }

    #[test]
    fn benchmark_curve_compounds_in_its_own_series() {
        let mut agg = PerformanceAggregator::new(&config());
        agg.ingest(&snapshot(0, vec![ranked_record("A", 1.0, 1, Some(0.0))]));
        agg.ingest(&snapshot(1, vec![ranked_record("A", 1.0, 1, Some(0.0))]));
        let report = agg.finish();
        assert_relative_eq!(report.benchmark_cumulative[1], 0.0201, epsilon = 1e-12);
    }

    #[test]
    fn report_frame_shape() {
        let mut agg = PerformanceAggregator::new(&config());
        agg.ingest(&snapshot(
            0,
            vec![ranked_record("A", 1.0, 1, Some(0.02)), ranked_record("B", -1.0, 2, Some(0.01))],
        ));
        let report = agg.finish();
        let frame = report_frame(&report, 2).unwrap();
        assert_eq!(frame.height(), 1);
        assert!(frame.column("bucket_1").is_ok());
        assert!(frame.column("bucket_2").is_ok());
        assert!(frame.column("ic").is_ok());
    }
}
