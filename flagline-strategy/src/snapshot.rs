//! Per-toggle custom strategy slots derived from one state load.

use crate::registry::{ResolvedStrategy, StrategyRegistry};
use flagline_codec::messages::{StrategyFeature, TakeStateResponse};
use flagline_types::StrategyDefinition;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Prefix of every result slot name.
pub const SLOT_PREFIX: &str = "customStrategy";

/// One custom strategy declaration bound to its result slot.
#[derive(Debug, Clone)]
pub struct MappedStrategy {
    slot: String,
    resolved: ResolvedStrategy,
    definition: StrategyDefinition,
}

impl MappedStrategy {
    pub fn new(slot: String, resolved: ResolvedStrategy, definition: StrategyDefinition) -> Self {
        Self {
            slot,
            resolved,
            definition,
        }
    }

    /// Result slot name, e.g. `customStrategy2`.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn resolved(&self) -> &ResolvedStrategy {
        &self.resolved
    }

    pub fn definition(&self) -> &StrategyDefinition {
        &self.definition
    }
}

/// Toggle name to its custom strategy slots, in declaration order.
///
/// Toggles without any custom strategy are not stored.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    toggles: HashMap<String, Vec<MappedStrategy>>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a snapshot from the strategy topology the engine reported.
    ///
    /// Built-in strategies are skipped and do not consume a slot number.
    pub fn build(
        response: &TakeStateResponse,
        registry: &StrategyRegistry,
        builtins: &HashSet<String>,
    ) -> Self {
        let toggles = response
            .features
            .iter()
            .filter_map(|feature| {
                let mapped = map_feature(feature, registry, builtins);
                (!mapped.is_empty()).then(|| (feature.feature_name.clone(), mapped))
            })
            .collect();
        Self { toggles }
    }

    /// Slots for `toggle`. Empty if the toggle has none or is unknown.
    pub fn get(&self, toggle: &str) -> &[MappedStrategy] {
        self.toggles.get(toggle).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, toggle: &str) -> bool {
        self.toggles.contains_key(toggle)
    }

    pub fn toggles(&self) -> impl Iterator<Item = &str> {
        self.toggles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.toggles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty()
    }
}

fn map_feature(
    feature: &StrategyFeature,
    registry: &StrategyRegistry,
    builtins: &HashSet<String>,
) -> Vec<MappedStrategy> {
    feature
        .strategies
        .iter()
        .filter(|declared| !builtins.contains(&declared.name))
        .enumerate()
        .map(|(index, declared)| {
            let resolved = registry.resolve(&declared.name);
            if let ResolvedStrategy::Unknown { fallback, .. } = &resolved {
                warn!(
                    toggle = %feature.feature_name,
                    strategy = %declared.name,
                    fallback = fallback.is_some(),
                    "custom strategy not registered"
                );
            }
            MappedStrategy::new(
                format!("{SLOT_PREFIX}{}", index + 1),
                resolved,
                StrategyDefinition::from(declared.clone()),
            )
        })
        .collect()
}
