//! Factor model trait definitions.

use factorbt_primitives::{Date, FactorRecord};
use polars::prelude::*;

/// Errors that can occur during factor computation.
#[derive(Debug, thiserror::Error)]
pub enum FactorError {
    /// Missing required column in the fundamentals table.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Invalid factor configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The fundamentals table did not match the expected schema.
    #[error("malformed fundamentals table: {0}")]
    Schema(String),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),
}

/// A factor calculator: one raw value per stock for a single trade date.
///
/// Implementations are pure functions of the fundamentals table. Stocks
/// with missing or invalid inputs must be emitted with the degenerate
/// sentinel (`raw: None`), never dropped: every stock in the input table
/// gets exactly one record, so buckets can partition the universe.
pub trait FactorModel: Send + Sync {
    /// Identifier used to select this factor from the registry.
    fn name(&self) -> &str;

    /// Columns the fundamentals table must carry.
    fn required_columns(&self) -> &[&str];

    /// Compute one [`FactorRecord`] per input row for the given date.
    ///
    /// # Errors
    /// Returns `FactorError` if required columns are missing or malformed.
    fn compute(&self, date: Date, fundamentals: &DataFrame)
    -> Result<Vec<FactorRecord>, FactorError>;
}
