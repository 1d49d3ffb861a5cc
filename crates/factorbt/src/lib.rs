#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/factorbt/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use factorbt_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use factorbt_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use factorbt_math as math;
#[cfg(feature = "factors")]
#[doc(inline)]
pub use factorbt_factors as factors;
#[cfg(feature = "engine")]
#[doc(inline)]
pub use factorbt_engine as engine;
