//! Factor record type definitions.

use serde::{Deserialize, Serialize};

use crate::{Date, StockId};

/// One raw factor observation for a single stock on a single date.
///
/// `raw` is `None` when the stock's inputs were missing or invalid. That
/// sentinel means "excluded from ranking" and is structurally distinct from
/// a genuinely computed value of `Some(0.0)`: downstream stages route
/// sentinel records to the reserved excluded bucket and leave all other
/// values, zero included, in the ranked population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRecord {
    /// Stock the observation belongs to.
    pub stock: StockId,
    /// Trade date of the cross-section.
    pub date: Date,
    /// Raw factor value, or `None` for the degenerate sentinel.
    pub raw: Option<f64>,
}

impl FactorRecord {
    /// Create a new factor record.
    #[must_use]
    pub const fn new(stock: StockId, date: Date, raw: Option<f64>) -> Self {
        Self { stock, date, raw }
    }

    /// Create a degenerate (excluded-from-ranking) record.
    #[must_use]
    pub const fn degenerate(stock: StockId, date: Date) -> Self {
        Self { stock, date, raw: None }
    }

    /// Whether this record carries the degenerate sentinel.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.raw.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> Date {
        Date::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn degenerate_record() {
        let rec = FactorRecord::degenerate(StockId::new("000001"), date());
        assert!(rec.is_degenerate());
        assert_eq!(rec.raw, None);
    }

    #[test]
    fn computed_zero_is_not_degenerate() {
        let rec = FactorRecord::new(StockId::new("000001"), date(), Some(0.0));
        assert!(!rec.is_degenerate());
    }
}
