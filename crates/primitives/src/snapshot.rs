//! Per-period cross-sectional snapshot types.

use serde::{Deserialize, Serialize};

use crate::{BucketLabel, Date, StockId};

/// Neutralized factor values for one non-degenerate stock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeutralizedFactor {
    /// Raw value minus the industry mean (current cross-section only).
    pub industry_residual: f64,
    /// Industry residual minus its size-bucket mean.
    pub size_adjusted: f64,
    /// Z-scored size-adjusted value.
    pub standardized: f64,
}

/// One stock's row in a period snapshot.
///
/// Degenerate stocks carry `neutralized: None` and the excluded bucket;
/// stocks missing a price at either end of the measurement window carry
/// `forward_return: None` but still count toward the universe and turnover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Stock identifier.
    pub stock: StockId,
    /// Raw factor value (`None` = degenerate sentinel).
    pub raw: Option<f64>,
    /// Neutralization outputs, absent for degenerate stocks.
    pub neutralized: Option<NeutralizedFactor>,
    /// Assigned bucket.
    pub bucket: BucketLabel,
    /// Realized forward return over the period window, net of costs.
    pub forward_return: Option<f64>,
}

/// The full cross-section for one completed rebalance period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    /// Position in the scheduled sequence.
    pub period_index: usize,
    /// Resolved equity rebalance date.
    pub date: Date,
    /// One row per universe stock, sorted by stock id.
    pub records: Vec<SnapshotRecord>,
    /// Benchmark return over the same period, resolved in its own calendar.
    pub benchmark_return: Option<f64>,
}

impl PeriodSnapshot {
    /// Number of stocks in the snapshot.
    #[must_use]
    pub const fn universe_size(&self) -> usize {
        self.records.len()
    }

    /// Number of degenerate (excluded-bucket) stocks.
    #[must_use]
    pub fn degenerate_count(&self) -> usize {
        self.records.iter().filter(|r| r.bucket.is_excluded()).count()
    }

    /// Iterator over non-degenerate rows.
    pub fn ranked(&self) -> impl Iterator<Item = &SnapshotRecord> {
        self.records.iter().filter(|r| !r.bucket.is_excluded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_count() {
        let snapshot = PeriodSnapshot {
            period_index: 0,
            date: Date::from_ymd_opt(2024, 1, 2).unwrap(),
            records: vec![
                SnapshotRecord {
                    stock: StockId::new("A"),
                    raw: Some(1.0),
                    neutralized: None,
                    bucket: BucketLabel::Ranked(1),
                    forward_return: Some(0.02),
                },
                SnapshotRecord {
                    stock: StockId::new("B"),
                    raw: None,
                    neutralized: None,
                    bucket: BucketLabel::Excluded,
                    forward_return: None,
                },
            ],
            benchmark_return: Some(0.01),
        };
        assert_eq!(snapshot.universe_size(), 2);
        assert_eq!(snapshot.degenerate_count(), 1);
        assert_eq!(snapshot.ranked().count(), 1);
    }
}
