//! Engine configuration and the builder entry point.

use serde::{Deserialize, Serialize};

use crate::Bridge;

/// Policy for registering an edge over an already-registered route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Duplicate registration is a programming fault and panics.
    #[default]
    Fail,
    /// The existing edge stays active; the new one is dropped.
    Ignore,
    /// The new edge replaces the existing one.
    Override,
}

/// Built-in mapper bundles that can be pre-registered on a new [`Bridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultBundle {
    /// Exact numeric widenings, all lossless.
    WideningNumeric,
    /// Range-checked numeric narrowings; out-of-range values fail.
    NarrowingNumeric,
    /// String/number parsing and formatting, `String` ↔ `Vec<char>`.
    Strings,
}

impl DefaultBundle {
    pub const ALL: [DefaultBundle; 3] = [
        DefaultBundle::WideningNumeric,
        DefaultBundle::NarrowingNumeric,
        DefaultBundle::Strings,
    ];
}

/// Declarative engine configuration, loadable from any serde format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Capacity of the LRU path cache.
    pub cache_size: usize,
    /// Strategy applied by plain `register` calls.
    pub conflict_strategy: ConflictStrategy,
    /// Mapper bundles registered up front.
    pub bundles: Vec<DefaultBundle>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            cache_size: 1000,
            conflict_strategy: ConflictStrategy::Fail,
            bundles: DefaultBundle::ALL.to_vec(),
        }
    }
}

/// Fluent construction of a [`Bridge`].
#[derive(Debug, Clone, Default)]
pub struct BridgeBuilder {
    config: BridgeConfig,
}

impl BridgeBuilder {
    pub fn cache_size(mut self, cache_size: usize) -> Self {
        self.config.cache_size = cache_size;
        self
    }

    pub fn conflict_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.config.conflict_strategy = strategy;
        self
    }

    /// Replaces the set of pre-registered bundles.
    pub fn default_bundles(mut self, bundles: impl IntoIterator<Item = DefaultBundle>) -> Self {
        self.config.bundles = bundles.into_iter().collect();
        self
    }

    /// Starts from an empty graph.
    pub fn no_default_bundles(mut self) -> Self {
        self.config.bundles.clear();
        self
    }

    pub fn build(self) -> Bridge {
        Bridge::with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.cache_size, 1000);
        assert_eq!(config.conflict_strategy, ConflictStrategy::Fail);
        assert_eq!(config.bundles, DefaultBundle::ALL.to_vec());
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = BridgeConfig {
            cache_size: 32,
            conflict_strategy: ConflictStrategy::Override,
            bundles: vec![DefaultBundle::WideningNumeric],
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<BridgeConfig>(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: BridgeConfig = serde_json::from_str(r#"{"cache_size": 8}"#).unwrap();
        assert_eq!(config.cache_size, 8);
        assert_eq!(config.conflict_strategy, ConflictStrategy::Fail);
    }
}
