//! Stock and industry identifier types.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Unique identifier for a stock (exchange ticker or internal code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub struct StockId(pub String);

impl StockId {
    /// Create a new stock identifier.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Industry classification label for a stock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub struct IndustryId(pub String);

impl IndustryId {
    /// Create a new industry identifier.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shared label for stocks without an industry classification.
    #[must_use]
    pub fn unclassified() -> Self {
        Self("unclassified".to_string())
    }
}

impl From<&str> for IndustryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for IndustryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_id_from_str() {
        let id: StockId = "600519".into();
        assert_eq!(id.as_str(), "600519");
    }

    #[test]
    fn industry_ordering_is_lexicographic() {
        let a = IndustryId::new("banks");
        let b = IndustryId::new("utilities");
        assert!(a < b);
    }
}
