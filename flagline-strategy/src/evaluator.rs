//! Loading snapshots and evaluating custom strategy slots.

use crate::registry::{ResolvedStrategy, StrategyRegistry};
use crate::snapshot::{MappedStrategy, Snapshot};
use crate::strategy::Strategy;
use flagline_codec::messages::TakeStateResponse;
use flagline_types::{Context, StrategyDefinition};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// How one slot evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Enabled,
    Disabled,
    /// No implementation and no fallback.
    Unresolved,
    /// The implementation returned an error or panicked.
    Failed(String),
}

impl StrategyOutcome {
    /// The boolean sent to the engine. Only `Enabled` counts.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }
}

/// Evaluates custom strategies against the most recently loaded snapshot.
///
/// The snapshot is swapped atomically on every load; an evaluation sees
/// either the previous snapshot or the new one, never a mix.
#[derive(Debug)]
pub struct StrategyEvaluator {
    registry: StrategyRegistry,
    builtins: HashSet<String>,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl StrategyEvaluator {
    pub fn new(registry: StrategyRegistry, builtins: impl IntoIterator<Item = String>) -> Self {
        Self {
            registry,
            builtins: builtins.into_iter().collect(),
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn builtins(&self) -> &HashSet<String> {
        &self.builtins
    }

    /// Replaces the snapshot with one built from `response`.
    ///
    /// Does nothing when no custom strategy and no fallback were registered.
    pub fn load_snapshot(&self, response: &TakeStateResponse) {
        if !self.registry.has_custom() {
            return;
        }
        let snapshot = Snapshot::build(response, &self.registry, &self.builtins);
        debug!(toggles = snapshot.len(), "custom strategy snapshot loaded");
        *self.snapshot.write().unwrap_or_else(|p| p.into_inner()) = Arc::new(snapshot);
    }

    /// Drops every custom strategy mapping. Until the next load, toggles
    /// evaluate with no custom results.
    pub fn clear_snapshot(&self) {
        *self.snapshot.write().unwrap_or_else(|p| p.into_inner()) = Arc::new(Snapshot::empty());
        debug!("custom strategy snapshot cleared");
    }

    /// The snapshot currently in effect.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(|p| p.into_inner()))
    }

    /// Slot name to outcome for every custom strategy `toggle` declares.
    pub fn outcomes(&self, toggle: &str, context: &Context) -> Vec<(String, StrategyOutcome)> {
        let snapshot = self.snapshot();
        snapshot
            .get(toggle)
            .iter()
            .map(|mapped| (mapped.slot().to_string(), evaluate(toggle, mapped, context)))
            .collect()
    }

    /// Slot name to result for every custom strategy `toggle` declares.
    ///
    /// Empty when the toggle declares none.
    pub fn eval(&self, toggle: &str, context: &Context) -> HashMap<String, bool> {
        self.outcomes(toggle, context)
            .into_iter()
            .map(|(slot, outcome)| (slot, outcome.is_enabled()))
            .collect()
    }
}

fn evaluate(toggle: &str, mapped: &MappedStrategy, context: &Context) -> StrategyOutcome {
    let definition = mapped.definition();
    let outcome = match mapped.resolved() {
        ResolvedStrategy::Registered(strategy) => run(strategy.as_ref(), definition, context),
        ResolvedStrategy::Unknown {
            fallback: Some(fallback),
            ..
        } => run(fallback.as_ref(), definition, context),
        ResolvedStrategy::Unknown { fallback: None, .. } => StrategyOutcome::Unresolved,
    };

    if let StrategyOutcome::Failed(reason) = &outcome {
        warn!(
            toggle = %toggle,
            slot = %mapped.slot(),
            strategy = %definition.name,
            reason = %reason,
            "custom strategy failed, treating as disabled"
        );
    }
    outcome
}

fn run(
    strategy: &dyn Strategy,
    definition: &StrategyDefinition,
    context: &Context,
) -> StrategyOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        strategy.is_enabled(&definition.parameters, context)
    }));
    match result {
        Ok(Ok(true)) => StrategyOutcome::Enabled,
        Ok(Ok(false)) => StrategyOutcome::Disabled,
        Ok(Err(e)) => StrategyOutcome::Failed(format!("{e:#}")),
        Err(payload) => StrategyOutcome::Failed(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
