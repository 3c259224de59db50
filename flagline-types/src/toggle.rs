//! Toggle listings and strategy declarations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A toggle known to the engine, as reported by `list_known_toggles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDef {
    pub name: String,
    #[serde(rename = "type")]
    pub feature_type: Option<String>,
    pub project: String,
    pub enabled: bool,
}

/// A strategy as declared by one toggle in the loaded state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDefinition {
    pub name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl StrategyDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}
