#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorbt/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod asset;
pub use asset::{IndustryId, StockId};

mod factor;
pub use factor::FactorRecord;

mod bucket;
pub use bucket::BucketLabel;

mod period;
pub use period::{PeriodGap, PeriodState, RebalancePeriod, SkipReason};

mod snapshot;
pub use snapshot::{NeutralizedFactor, PeriodSnapshot, SnapshotRecord};

mod config;
pub use config::{BacktestConfig, ConfigError, Direction, IcMethod};

mod report;
pub use report::{BacktestReport, IcSummary, PerformanceSnapshot};

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
