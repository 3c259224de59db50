//! Registered strategy implementations.

use crate::strategy::Strategy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Strategy implementations keyed by name, plus an optional fallback.
///
/// The first registration of a name wins; later ones are ignored.
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn Strategy>>,
    fallback: Option<Arc<dyn Strategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `strategy`. Returns `false` if the name was already taken.
    pub fn register(&mut self, strategy: impl Strategy + 'static) -> bool {
        self.register_arc(Arc::new(strategy))
    }

    pub fn register_arc(&mut self, strategy: Arc<dyn Strategy>) -> bool {
        let name = strategy.name().to_string();
        if self.strategies.contains_key(&name) {
            debug!(strategy = %name, "duplicate strategy registration ignored");
            return false;
        }
        self.strategies.insert(name, strategy);
        true
    }

    /// Sets the strategy consulted for declared names nobody registered.
    pub fn set_fallback(&mut self, fallback: impl Strategy + 'static) {
        self.fallback = Some(Arc::new(fallback));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Strategy>> {
        self.strategies.get(name)
    }

    pub fn fallback(&self) -> Option<&Arc<dyn Strategy>> {
        self.fallback.as_ref()
    }

    /// True when anything could ever be evaluated locally.
    pub fn has_custom(&self) -> bool {
        !self.strategies.is_empty() || self.fallback.is_some()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolves a declared strategy name once, at snapshot build time.
    pub fn resolve(&self, name: &str) -> ResolvedStrategy {
        match self.strategies.get(name) {
            Some(strategy) => ResolvedStrategy::Registered(Arc::clone(strategy)),
            None => ResolvedStrategy::Unknown {
                name: name.to_string(),
                fallback: self.fallback.clone(),
            },
        }
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .field("fallback", &self.fallback.as_ref().map(|s| s.name()))
            .finish()
    }
}

/// What a declared strategy name resolved to.
#[derive(Clone)]
pub enum ResolvedStrategy {
    Registered(Arc<dyn Strategy>),
    /// No implementation was registered under `name`. Evaluates to `false`
    /// unless a fallback is present.
    Unknown {
        name: String,
        fallback: Option<Arc<dyn Strategy>>,
    },
}

impl ResolvedStrategy {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }
}

impl fmt::Debug for ResolvedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered(strategy) => {
                f.debug_tuple("Registered").field(&strategy.name()).finish()
            }
            Self::Unknown { name, fallback } => f
                .debug_struct("Unknown")
                .field("name", name)
                .field("fallback", &fallback.as_ref().map(|s| s.name()))
                .finish(),
        }
    }
}
