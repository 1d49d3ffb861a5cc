//! Rebalance period lifecycle types.

use serde::{Deserialize, Serialize};

use crate::{Date, StockId};

/// Lifecycle state of a rebalance period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodState {
    /// Nominal calendar date is scheduled but not yet resolved.
    Scheduled,
    /// Resolving the nominal date against each source's trading calendar.
    Resolving,
    /// Dates resolved and a sufficient universe found; ready to process.
    Ready,
    /// Period could not be resolved or lacked history; produces no snapshot.
    Skipped,
    /// All downstream stages completed for this period.
    Done,
}

impl PeriodState {
    /// Whether `next` is a legal transition from this state.
    #[must_use]
    pub const fn can_transition(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Scheduled, Self::Resolving)
                | (Self::Resolving, Self::Ready)
                | (Self::Resolving, Self::Skipped)
                | (Self::Ready, Self::Done)
        )
    }
}

/// Why a period was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Insufficient lookback history even after bounded window expansion.
    DataInsufficiency {
        /// Trading days required.
        required: u32,
        /// Trading days available after the final expansion.
        available: u32,
    },
    /// No resolvable trading day near the nominal date in a source.
    CalendarMismatch {
        /// Which source's calendar failed to resolve.
        source: String,
    },
    /// No stock had sufficient price history at the resolved date.
    EmptyUniverse,
    /// No stock in the universe produced a valid factor input.
    EmptyCrossSection,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataInsufficiency { required, available } => {
                write!(f, "insufficient lookback: need {required} trading days, have {available}")
            }
            Self::CalendarMismatch { source } => {
                write!(f, "no resolvable trading day in {source} calendar")
            }
            Self::EmptyUniverse => write!(f, "no stock with sufficient history"),
            Self::EmptyCrossSection => write!(f, "no valid factor inputs in cross-section"),
        }
    }
}

/// A skipped period recorded as a gap in the backtest sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodGap {
    /// Position in the scheduled sequence.
    pub index: usize,
    /// The nominal calendar date that was due.
    pub nominal_date: Date,
    /// Why the period produced no snapshot.
    pub reason: SkipReason,
}

/// One resolved rebalance period.
///
/// The equity and benchmark dates are resolved independently against each
/// source's own trading calendar; the two calendars are never assumed to
/// agree. The forward-return window for the period spans the resolved
/// rebalance date to the next period's resolved date, per source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalancePeriod {
    /// Position in the scheduled sequence.
    pub index: usize,
    /// The nominal calendar date that was due.
    pub nominal_date: Date,
    /// Rebalance date resolved in the equity calendar.
    pub equity_date: Date,
    /// Next period's rebalance date resolved in the equity calendar.
    pub next_equity_date: Date,
    /// Rebalance date resolved in the benchmark calendar.
    pub benchmark_date: Date,
    /// Next period's rebalance date resolved in the benchmark calendar.
    pub next_benchmark_date: Date,
    /// Stocks in the investable universe for this period, sorted.
    pub universe: Vec<StockId>,
    /// Lifecycle state.
    pub state: PeriodState,
}

impl RebalancePeriod {
    /// Number of stocks in the period universe.
    #[must_use]
    pub const fn universe_size(&self) -> usize {
        self.universe.len()
    }
}
