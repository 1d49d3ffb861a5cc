//! Rebalance scheduling.
//!
//! Drives the period lifecycle: nominal calendar dates are generated at a
//! fixed spacing, each is resolved independently against the equity and
//! benchmark calendars, lookback sufficiency is checked with bounded
//! window expansion, and the investable universe is attached. Periods that
//! cannot be resolved become recorded gaps, never fabricated data.

use chrono::Duration;
use factorbt_primitives::{
    BacktestConfig, Date, PeriodGap, PeriodState, RebalancePeriod, SkipReason, StockId,
};
use tracing::{debug, warn};

use crate::TradingCalendar;

/// Resolves the investable universe at a rebalance date: stocks with a
/// price on that date and at least `min_history_days` trading days of
/// backing data.
pub trait UniverseProvider {
    /// Stocks eligible at `date`, sorted deterministically.
    fn universe(&self, date: Date, min_history_days: usize) -> Vec<StockId>;
}

/// Outcome of resolving one scheduled period.
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodResolution {
    /// Period resolved with a sufficient universe; ready for the pipeline.
    Ready(RebalancePeriod),
    /// Period skipped; recorded as a gap.
    Skipped(PeriodGap),
}

/// Produces the ordered sequence of rebalance periods for a date range.
#[derive(Debug)]
pub struct RebalanceScheduler<'a> {
    config: &'a BacktestConfig,
    equity: &'a TradingCalendar,
    benchmark: &'a TradingCalendar,
}

impl<'a> RebalanceScheduler<'a> {
    /// Create a scheduler over the two independent source calendars.
    #[must_use]
    pub const fn new(
        config: &'a BacktestConfig,
        equity: &'a TradingCalendar,
        benchmark: &'a TradingCalendar,
    ) -> Self {
        Self { config, equity, benchmark }
    }

    /// Resolve every scheduled period in `[start, end]`, in order.
    ///
    /// The forward-return window of each period runs to the *next*
    /// scheduled period's resolved date; the final period measures
    /// against one extra nominal date past `end`.
    #[must_use]
    pub fn schedule(
        &self,
        start: Date,
        end: Date,
        universe: &dyn UniverseProvider,
    ) -> Vec<PeriodResolution> {
        let step = Duration::days(i64::from(self.config.rebalance_every));
        let mut nominals = Vec::new();
        let mut day = start;
        while day <= end {
            nominals.push(day);
            day += step;
        }
        let terminal = day;

        nominals
            .iter()
            .enumerate()
            .map(|(index, &nominal)| {
                let next_nominal = nominals.get(index + 1).copied().unwrap_or(terminal);
                self.resolve_period(index, nominal, next_nominal, universe)
            })
            .collect()
    }

    fn resolve_period(
        &self,
        index: usize,
        nominal: Date,
        next_nominal: Date,
        universe: &dyn UniverseProvider,
    ) -> PeriodResolution {
        let state = advance(PeriodState::Scheduled, PeriodState::Resolving);

        let skip = |reason: SkipReason| {
            let _ = advance(state, PeriodState::Skipped);
            warn!(period = index, %nominal, %reason, "skipping period");
            PeriodResolution::Skipped(PeriodGap { index, nominal_date: nominal, reason })
        };

        let window = self.config.calendar_search_days;
        let Some(equity_date) = self.equity.resolve(nominal, window) else {
            return skip(SkipReason::CalendarMismatch { source: "equity".to_string() });
        };
        let Some(next_equity_date) = self.equity.resolve(next_nominal, window) else {
            return skip(SkipReason::CalendarMismatch { source: "equity".to_string() });
        };
        let Some(benchmark_date) = self.benchmark.resolve(nominal, window) else {
            return skip(SkipReason::CalendarMismatch { source: "benchmark".to_string() });
        };
        let Some(next_benchmark_date) = self.benchmark.resolve(next_nominal, window) else {
            return skip(SkipReason::CalendarMismatch { source: "benchmark".to_string() });
        };
        // A collapsed forward window (both nominals resolving to the same
        // trading day) cannot produce a return measurement.
        if next_equity_date <= equity_date {
            return skip(SkipReason::CalendarMismatch { source: "equity".to_string() });
        }

        let required = self.config.min_lookback_days;
        let available = self.lookback_days(equity_date);
        if available < required {
            return skip(SkipReason::DataInsufficiency { required, available });
        }

        let members = universe.universe(equity_date, required as usize);
        if members.is_empty() {
            return skip(SkipReason::EmptyUniverse);
        }

        let state = advance(state, PeriodState::Ready);
        debug!(
            period = index,
            %nominal,
            %equity_date,
            %benchmark_date,
            universe = members.len(),
            "period ready"
        );
        PeriodResolution::Ready(RebalancePeriod {
            index,
            nominal_date: nominal,
            equity_date,
            next_equity_date,
            benchmark_date,
            next_benchmark_date,
            universe: members,
            state,
        })
    }

    /// Trading days of lookback available before `date`, expanding the
    /// calendar window by bounded increments until the requirement is met
    /// or the expansion limit is reached.
    fn lookback_days(&self, date: Date) -> u32 {
        let required = self.config.min_lookback_days;
        let mut window = i64::from(self.config.lookback_buffer_days);
        let mut expansions = 0;
        loop {
            let start = date - Duration::days(window);
            let available = self.equity.count_in(start, date) as u32;
            if available >= required || expansions >= self.config.max_lookback_expansions {
                return available;
            }
            window += i64::from(self.config.lookback_expand_step);
            expansions += 1;
            debug!(%date, window, expansions, "expanding lookback window");
        }
    }
}

/// Step the period state machine, asserting the transition is legal.
pub(crate) fn advance(state: PeriodState, next: PeriodState) -> PeriodState {
    debug_assert!(state.can_transition(next), "illegal transition {state:?} -> {next:?}");
    next
}
