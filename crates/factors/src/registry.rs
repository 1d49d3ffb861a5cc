//! Factor registry: strategy identifier to model resolution.

use std::collections::BTreeMap;

use factorbt_traits::FactorModel;

use crate::{EarningsYieldFactor, ValueGrowthFactor};

/// Registry of available factor models, keyed by name.
///
/// Backed by a `BTreeMap` so listing order is deterministic.
pub struct FactorRegistry {
    models: BTreeMap<String, Box<dyn FactorModel>>,
}

impl FactorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self { models: BTreeMap::new() }
    }

    /// Create a registry with the built-in factors registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ValueGrowthFactor::new()));
        registry.register(Box::new(EarningsYieldFactor::new()));
        registry
    }

    /// Register a model under its own name, replacing any previous entry.
    pub fn register(&mut self, model: Box<dyn FactorModel>) {
        self.models.insert(model.name().to_string(), model);
    }

    /// Look up a model by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn FactorModel> {
        self.models.get(name).map(AsRef::as_ref)
    }

    /// Registered factor names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }
}

impl Default for FactorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for FactorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactorRegistry").field("names", &self.names()).finish()
    }
}
