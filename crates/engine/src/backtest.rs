//! Backtest orchestration.
//!
//! One pass: load the full data window, schedule and resolve periods,
//! run each ready period through neutralization, bucketing, and return
//! measurement, and fold the results into a report. Period-level problems
//! become recorded gaps; only structural failures abort the run.

use std::collections::BTreeMap;

use chrono::Duration;
use factorbt_primitives::{
    BacktestConfig, BacktestReport, Date, FactorRecord, PeriodGap, PeriodSnapshot, PeriodState,
    RebalancePeriod, SkipReason, SnapshotRecord, StockId,
};
use factorbt_traits::{
    BenchmarkSource, FactorModel, FundamentalsSource, IndustrySource, MarketCapSource,
    PriceSource,
};
use tracing::{info, warn};

use crate::schedule::advance;
use crate::{
    BenchmarkPanel, EngineError, PerformanceAggregator, PeriodResolution, PricePanel,
    RebalanceScheduler, ReturnCalculator, TradingCalendar, assign_buckets,
    neutralize_cross_section,
};

/// The set of data sources a backtest reads from.
#[derive(Clone, Copy)]
pub struct DataSources<'a> {
    /// Daily equity prices.
    pub prices: &'a dyn PriceSource,
    /// Daily benchmark index levels.
    pub benchmark: &'a dyn BenchmarkSource,
    /// Point-in-time fundamentals.
    pub fundamentals: &'a dyn FundamentalsSource,
    /// Industry classification.
    pub industries: &'a dyn IndustrySource,
    /// Market capitalizations.
    pub market_caps: &'a dyn MarketCapSource,
}

impl std::fmt::Debug for DataSources<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSources").finish_non_exhaustive()
    }
}

/// Runs a full cross-sectional factor backtest.
pub struct Backtester<'a> {
    config: &'a BacktestConfig,
    factor: &'a dyn FactorModel,
    sources: DataSources<'a>,
}

impl std::fmt::Debug for Backtester<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backtester").field("config", &self.config).finish_non_exhaustive()
    }
}

impl<'a> Backtester<'a> {
    /// Create a backtester over a factor and a set of sources.
    #[must_use]
    pub const fn new(
        config: &'a BacktestConfig,
        factor: &'a dyn FactorModel,
        sources: DataSources<'a>,
    ) -> Self {
        Self { config, factor, sources }
    }

    /// Run the backtest over `[start, end]` for a candidate stock set
    /// (empty slice means every stock the price source knows).
    ///
    /// # Errors
    /// Returns `EngineError` for invalid configuration, malformed source
    /// data, empty source calendars, or when every scheduled period was
    /// skipped. Individual period problems are recorded as gaps in the
    /// report, not errors.
    pub fn run(
        &self,
        candidates: &[StockId],
        start: Date,
        end: Date,
    ) -> Result<BacktestReport, EngineError> {
        self.config.validate()?;

        // The data window covers the deepest possible lookback before the
        // first period and one forward-return window past the last.
        let max_lookback = i64::from(self.config.lookback_buffer_days)
            + i64::from(self.config.lookback_expand_step)
                * i64::from(self.config.max_lookback_expansions)
            + i64::from(self.config.calendar_search_days);
        let data_start = start - Duration::days(max_lookback);
        let data_end = end
            + Duration::days(i64::from(
                self.config.rebalance_every + self.config.calendar_search_days,
            ));
        info!(%start, %end, %data_start, %data_end, factor = self.factor.name(), "loading data window");

        let equity_days = self.sources.prices.trading_days(data_start, data_end)?;
        if equity_days.is_empty() {
            return Err(EngineError::NoTradingDays { calendar: "equity".to_string() });
        }
        let benchmark_days = self.sources.benchmark.trading_days(data_start, data_end)?;
        if benchmark_days.is_empty() {
            return Err(EngineError::NoTradingDays { calendar: "benchmark".to_string() });
        }
        let equity_calendar = TradingCalendar::new(equity_days);
        let benchmark_calendar = TradingCalendar::new(benchmark_days);

        let price_frame = self.sources.prices.price_history(candidates, data_start, data_end)?;
        let prices = PricePanel::from_frame(&price_frame)?;
        let benchmark_frame = self.sources.benchmark.index_history(data_start, data_end)?;
        let benchmark = BenchmarkPanel::from_frame(&benchmark_frame)?;

        let scheduler =
            RebalanceScheduler::new(self.config, &equity_calendar, &benchmark_calendar);
        let resolutions = scheduler.schedule(start, end, &prices);

        let calculator = ReturnCalculator::new(self.config.round_trip_cost());
        let mut aggregator = PerformanceAggregator::new(self.config);
        let mut completed = 0_usize;
        for resolution in resolutions {
            match resolution {
                PeriodResolution::Skipped(gap) => aggregator.record_gap(gap),
                PeriodResolution::Ready(period) => {
                    if self.run_period(period, &prices, &benchmark, &calculator, &mut aggregator)?
                    {
                        completed += 1;
                    }
                }
            }
        }

        if completed == 0 {
            return Err(EngineError::NoCompletedPeriods);
        }
        info!(completed, factor = self.factor.name(), "backtest finished");
        Ok(aggregator.finish())
    }

    /// Run one ready period through the pipeline. Returns whether the
    /// period completed (an empty cross-section becomes a gap instead).
    fn run_period(
        &self,
        mut period: RebalancePeriod,
        prices: &PricePanel,
        benchmark: &BenchmarkPanel,
        calculator: &ReturnCalculator,
        aggregator: &mut PerformanceAggregator,
    ) -> Result<bool, EngineError> {
        let date = period.equity_date;
        let caps = self.sources.market_caps.market_caps(&period.universe, date)?;
        let industries = self.sources.industries.classify(&period.universe)?;
        let fundamentals = self.sources.fundamentals.fundamentals(&period.universe, date)?;

        let records = self.align_records(&period.universe, date, &fundamentals)?;
        if records.iter().all(FactorRecord::is_degenerate) {
            warn!(period = period.index, %date, "no usable factor values, recording gap");
            aggregator.record_gap(PeriodGap {
                index: period.index,
                nominal_date: period.nominal_date,
                reason: SkipReason::EmptyCrossSection,
            });
            return Ok(false);
        }

        let rows = neutralize_cross_section(
            &records,
            &industries,
            &caps,
            self.config.size_buckets,
            self.config.sigma_clip,
        )?;
        let buckets = assign_buckets(&rows, self.config.n_buckets, self.config.direction)?;

        let returns = calculator.stock_returns(
            prices,
            &period.universe,
            period.equity_date,
            period.next_equity_date,
        );
        let benchmark_return = calculator.benchmark_return(
            benchmark,
            period.benchmark_date,
            period.next_benchmark_date,
        );

        let snapshot_records: Vec<SnapshotRecord> = rows
            .into_iter()
            .zip(buckets)
            .map(|(row, bucket)| SnapshotRecord {
                forward_return: returns.get(&row.stock).copied(),
                stock: row.stock,
                raw: row.raw,
                neutralized: row.neutralized,
                bucket,
            })
            .collect();

        aggregator.ingest(&PeriodSnapshot {
            period_index: period.index,
            date,
            records: snapshot_records,
            benchmark_return,
        });
        period.state = advance(period.state, PeriodState::Done);
        Ok(true)
    }

    /// Align factor records to the universe, in universe order: one record
    /// per universe stock. Stocks the factor did not cover get the
    /// degenerate sentinel; records for stocks outside the universe drop.
    fn align_records(
        &self,
        universe: &[StockId],
        date: Date,
        fundamentals: &polars::frame::DataFrame,
    ) -> Result<Vec<FactorRecord>, EngineError> {
        let computed = self.factor.compute(date, fundamentals)?;
        let mut by_stock: BTreeMap<StockId, FactorRecord> =
            computed.into_iter().map(|r| (r.stock.clone(), r)).collect();
        Ok(universe
            .iter()
            .map(|stock| {
                by_stock
                    .remove(stock)
                    .unwrap_or_else(|| FactorRecord::degenerate(stock.clone(), date))
            })
            .collect())
    }
}
