//! Bucket label type for ranked cross-sections.

use serde::{Deserialize, Serialize};

/// Bucket assignment for one stock in one period.
///
/// Ranked labels run `1..=K`. `Excluded` is the reserved bucket for stocks
/// whose factor record carried the degenerate sentinel; it reports as index
/// `K + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BucketLabel {
    /// Ranked bucket, `1..=K`.
    Ranked(u32),
    /// Reserved bucket for degenerate (excluded-from-ranking) stocks.
    Excluded,
}

impl BucketLabel {
    /// Numeric label: the rank for ranked buckets, `n_buckets + 1` for the
    /// excluded bucket.
    #[must_use]
    pub const fn index(self, n_buckets: u32) -> u32 {
        match self {
            Self::Ranked(k) => k,
            Self::Excluded => n_buckets + 1,
        }
    }

    /// Whether this is the reserved excluded bucket.
    #[must_use]
    pub const fn is_excluded(self) -> bool {
        matches!(self, Self::Excluded)
    }
}
