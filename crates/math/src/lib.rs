#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorbt/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod cross_section;
pub use cross_section::{ZScore, demean, demean_by_group, sample_std};

mod clip;
pub use clip::sigma_clip;

mod quantile;
pub use quantile::{average_ranks, quantile_buckets};

mod correlation;
pub use correlation::{pearson, spearman};

mod error;
pub use error::MathError;
