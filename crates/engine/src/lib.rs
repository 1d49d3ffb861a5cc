#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorbt/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod calendar;
pub use calendar::TradingCalendar;

mod store;
pub use store::{BenchmarkPanel, MarketData, PricePanel};

mod schedule;
pub use schedule::{PeriodResolution, RebalanceScheduler, UniverseProvider};

mod neutralize;
pub use neutralize::{NeutralizedRow, neutralize_cross_section};

mod bucketize;
pub use bucketize::assign_buckets;

mod returns;
pub use returns::ReturnCalculator;

mod aggregate;
pub use aggregate::{PerformanceAggregator, report_frame};

mod backtest;
pub use backtest::{Backtester, DataSources};

mod error;
pub use error::EngineError;
