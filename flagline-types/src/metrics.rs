//! Usage counters accumulated by the engine between metric collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-toggle evaluation counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCount {
    pub yes: u32,
    pub no: u32,
    #[serde(default)]
    pub variants: BTreeMap<String, u32>,
}

impl FeatureCount {
    pub fn total(&self) -> u64 {
        u64::from(self.yes) + u64::from(self.no)
    }
}

/// One metrics window: counts observed between `start` and `stop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsBucket {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub toggles: BTreeMap<String, FeatureCount>,
}

impl MetricsBucket {
    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty()
    }

    pub fn toggle(&self, name: &str) -> Option<&FeatureCount> {
        self.toggles.get(name)
    }
}
