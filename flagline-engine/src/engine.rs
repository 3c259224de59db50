//! The toggle engine facade.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::handle::EngineHandle;
use flagline_buffer::EngineBinding;
use flagline_codec::messages::{
    CounterIncrement, HistogramDefinition, ImpactMetrics, MetricDefinition, MetricObservation,
};
use flagline_codec::{ContextEncoder, encode_message, label_entries};
use flagline_strategy::{Strategy, StrategyEvaluator, StrategyRegistry};
use flagline_types::{
    Context, EvaluationResult, FeatureDef, ImpactMetric, Labels, MetricsBucket, VariantDef,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Evaluates toggles through a native engine, feeding it the results of the
/// host application's custom strategies.
///
/// Loading state and evaluating are mutually consistent: an evaluation never
/// pairs the engine's new state with the previous strategy snapshot, or the
/// other way round.
pub struct ToggleEngine {
    handle: EngineHandle,
    evaluator: StrategyEvaluator,
    encoder: ContextEncoder,
    gate: RwLock<()>,
}

impl ToggleEngine {
    pub fn builder(binding: Arc<dyn EngineBinding>) -> ToggleEngineBuilder {
        ToggleEngineBuilder {
            binding,
            registry: StrategyRegistry::new(),
            config: EngineConfig::default(),
        }
    }

    /// An engine without custom strategies.
    pub fn new(binding: Arc<dyn EngineBinding>) -> Result<Self> {
        Self::builder(binding).build()
    }

    // ================================================================
    // State
    // ================================================================

    /// Replaces the toggle state with `toggles_json`.
    ///
    /// On rejection the previous state, and the custom strategy mapping
    /// derived from it, stay in effect. If the engine's answer cannot be
    /// read, the engine may already hold the new state, so the mapping is
    /// cleared and custom strategies evaluate as disabled until the next
    /// successful load.
    pub fn take_state(&self, toggles_json: &str) -> Result<()> {
        let _gate = self.write_gate();
        let response = match self.handle.take_state(toggles_json) {
            Ok(response) => response,
            Err(EngineError::Parse(error)) => {
                self.evaluator.clear_snapshot();
                warn!(error = %error, "unreadable take-state response, custom strategies cleared");
                return Err(EngineError::Parse(error));
            }
            Err(e) => return Err(e),
        };
        for warning in &response.warnings {
            warn!(warning = %warning, "engine reported a problem with the toggle state");
        }
        self.evaluator.load_snapshot(&response);
        info!(toggles = response.features.len(), "toggle state loaded");
        Ok(())
    }

    /// The currently loaded state, as JSON.
    pub fn get_state(&self) -> Result<String> {
        let _gate = self.read_gate();
        Ok(self.handle.get_state()?.json)
    }

    // ================================================================
    // Evaluation
    // ================================================================

    /// Checks whether `toggle_name` is enabled for `context`.
    ///
    /// `value` is `None` when the engine does not know the toggle.
    pub fn is_enabled(
        &self,
        toggle_name: &str,
        context: &Context,
    ) -> Result<EvaluationResult<bool>> {
        let _gate = self.read_gate();
        let message = self.context_message(toggle_name, context)?;
        let result = EvaluationResult::from(self.handle.check_enabled(&message)?);
        into_checked(result)
    }

    /// Selects the variant of `toggle_name` for `context`.
    pub fn get_variant(
        &self,
        toggle_name: &str,
        context: &Context,
    ) -> Result<EvaluationResult<VariantDef>> {
        let _gate = self.read_gate();
        let message = self.context_message(toggle_name, context)?;
        let result = EvaluationResult::from(self.handle.check_variant(&message)?);
        into_checked(result)
    }

    /// Evaluates only the custom strategies `toggle_name` declares.
    pub fn custom_strategy_results(
        &self,
        toggle_name: &str,
        context: &Context,
    ) -> HashMap<String, bool> {
        let _gate = self.read_gate();
        self.evaluator.eval(toggle_name, context)
    }

    // ================================================================
    // Introspection
    // ================================================================

    pub fn list_known_toggles(&self) -> Result<Vec<FeatureDef>> {
        let _gate = self.read_gate();
        Ok(self.handle.list_known_toggles()?.into())
    }

    /// Drains the engine's usage counters. `None` if nothing was counted.
    pub fn get_metrics(&self) -> Result<Option<MetricsBucket>> {
        let _gate = self.read_gate();
        Ok(self.handle.get_metrics()?.into_bucket()?)
    }

    /// Names of the strategies the engine evaluates itself. Available
    /// after release.
    pub fn built_in_strategies(&self) -> Result<Vec<String>> {
        Ok(self.handle.built_in_strategies()?.values)
    }

    /// Available after release.
    pub fn core_version(&self) -> Result<String> {
        Ok(self.handle.core_version()?.version)
    }

    // ================================================================
    // Impact metrics
    // ================================================================

    pub fn define_counter(&self, name: &str, help: &str) -> Result<()> {
        let _gate = self.read_gate();
        self.handle.define_counter(&definition(name, help)?)?;
        debug!(metric = %name, "counter defined");
        Ok(())
    }

    /// Adds `value` to the counter series selected by `labels`.
    pub fn inc_counter(&self, name: &str, value: i64, labels: Option<&Labels>) -> Result<()> {
        let _gate = self.read_gate();
        let message = encode_message(&CounterIncrement {
            name: name.to_string(),
            value,
            labels: label_entries(labels),
        })?;
        self.handle.inc_counter(&message)
    }

    pub fn define_gauge(&self, name: &str, help: &str) -> Result<()> {
        let _gate = self.read_gate();
        self.handle.define_gauge(&definition(name, help)?)?;
        debug!(metric = %name, "gauge defined");
        Ok(())
    }

    pub fn set_gauge(&self, name: &str, value: f64, labels: Option<&Labels>) -> Result<()> {
        let _gate = self.read_gate();
        self.handle.set_gauge(&observation(name, value, labels)?)
    }

    /// Defines a histogram. `None` or an empty slice selects the engine's
    /// default bucket bounds.
    pub fn define_histogram(&self, name: &str, help: &str, buckets: Option<&[f64]>) -> Result<()> {
        let _gate = self.read_gate();
        let message = encode_message(&HistogramDefinition {
            name: name.to_string(),
            help: help.to_string(),
            buckets: buckets.map(<[f64]>::to_vec).unwrap_or_default(),
        })?;
        self.handle.define_histogram(&message)?;
        debug!(metric = %name, "histogram defined");
        Ok(())
    }

    pub fn observe_histogram(&self, name: &str, value: f64, labels: Option<&Labels>) -> Result<()> {
        let _gate = self.read_gate();
        self.handle.observe_histogram(&observation(name, value, labels)?)
    }

    /// Drains every recorded sample. Empty when nothing was recorded.
    pub fn collect_impact_metrics(&self) -> Result<Vec<ImpactMetric>> {
        let _gate = self.read_gate();
        Ok(self.handle.collect_impact_metrics()?.into())
    }

    /// Hands collected samples back, typically after a failed delivery, so
    /// the next collection includes them.
    pub fn restore_impact_metrics(&self, metrics: &[ImpactMetric]) -> Result<()> {
        let _gate = self.read_gate();
        let message = encode_message(&metrics.iter().collect::<ImpactMetrics>())?;
        self.handle.restore_impact_metrics(&message)?;
        debug!(metrics = metrics.len(), "impact metrics restored");
        Ok(())
    }

    /// Destroys the native engine. Every later call returns
    /// [`EngineError::Released`]. Calling this again does nothing.
    pub fn release(&self) {
        let _gate = self.write_gate();
        self.handle.release();
    }

    pub fn is_released(&self) -> bool {
        !self.handle.is_live()
    }

    fn context_message(&self, toggle_name: &str, context: &Context) -> Result<Vec<u8>> {
        let results = self.evaluator.eval(toggle_name, context);
        Ok(self.encoder.encode(toggle_name, context, &results)?)
    }

    fn read_gate(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write_gate(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().unwrap_or_else(|p| p.into_inner())
    }
}

fn definition(name: &str, help: &str) -> Result<Vec<u8>> {
    Ok(encode_message(&MetricDefinition {
        name: name.to_string(),
        help: help.to_string(),
    })?)
}

fn observation(name: &str, value: f64, labels: Option<&Labels>) -> Result<Vec<u8>> {
    Ok(encode_message(&MetricObservation {
        name: name.to_string(),
        value,
        labels: label_entries(labels),
    })?)
}

fn into_checked<T>(result: EvaluationResult<T>) -> Result<EvaluationResult<T>> {
    match result.error {
        Some(error) => Err(EngineError::InvalidInput(error)),
        None => Ok(result),
    }
}

impl fmt::Debug for ToggleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleEngine")
            .field("handle", &self.handle)
            .field("registry", self.evaluator.registry())
            .field("hostname", &self.encoder.runtime_hostname())
            .finish()
    }
}

/// Configures and creates a [`ToggleEngine`].
pub struct ToggleEngineBuilder {
    binding: Arc<dyn EngineBinding>,
    registry: StrategyRegistry,
    config: EngineConfig,
}

impl ToggleEngineBuilder {
    /// Registers a custom strategy. The first strategy registered under a
    /// name wins.
    #[must_use]
    pub fn strategy(mut self, strategy: impl Strategy + 'static) -> Self {
        self.registry.register(strategy);
        self
    }

    #[must_use]
    pub fn strategies(mut self, strategies: impl IntoIterator<Item = Arc<dyn Strategy>>) -> Self {
        for strategy in strategies {
            self.registry.register_arc(strategy);
        }
        self
    }

    /// Strategy consulted for declared names nobody registered.
    #[must_use]
    pub fn fallback(mut self, fallback: impl Strategy + 'static) -> Self {
        self.registry.set_fallback(fallback);
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ToggleEngine> {
        let handle = EngineHandle::new(self.binding)?;

        // Built-ins only matter for routing custom strategies.
        let builtins = if self.registry.has_custom() {
            handle.built_in_strategies()?.values
        } else {
            Vec::new()
        };
        debug!(builtins = ?builtins, "built-in strategies");

        let encoder = match self.config.engine.runtime_hostname {
            Some(hostname) => ContextEncoder::with_hostname(hostname),
            None => ContextEncoder::detect(),
        };

        info!(
            custom_strategies = self.registry.len(),
            fallback = self.registry.fallback().is_some(),
            hostname = %encoder.runtime_hostname(),
            "toggle engine ready"
        );

        Ok(ToggleEngine {
            handle,
            evaluator: StrategyEvaluator::new(self.registry, builtins),
            encoder,
            gate: RwLock::new(()),
        })
    }
}

impl fmt::Debug for ToggleEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleEngineBuilder")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
