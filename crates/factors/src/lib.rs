#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorbt/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod value_growth;
pub use value_growth::{ValueGrowthConfig, ValueGrowthFactor};

mod earnings_yield;
pub use earnings_yield::EarningsYieldFactor;

mod registry;
pub use registry::FactorRegistry;
