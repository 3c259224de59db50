//! Payload schemas for every message exchanged with the engine.
//!
//! Field order is part of the wire format; append new fields at the end and
//! bump [`SCHEMA_VERSION`](crate::SCHEMA_VERSION).

use crate::frame::{MessageKind, WireMessage};
use serde::{Deserialize, Serialize};

macro_rules! wire_message {
    ($ty:ty, $kind:ident, $name:literal) => {
        impl WireMessage for $ty {
            const KIND: MessageKind = MessageKind::$kind;
            const NAME: &'static str = $name;
        }
    };
}

// ── Requests ─────────────────────────────────────────────────────

/// Everything the engine needs to evaluate one toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub toggle_name: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub app_name: Option<String>,
    pub environment: Option<String>,
    pub remote_address: Option<String>,
    pub current_time: String,
    pub runtime_hostname: String,
    pub properties: Vec<PropertyEntry>,
    pub custom_strategies_results: Vec<StrategyResultEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyResultEntry {
    pub key: String,
    pub value: bool,
}

wire_message!(ContextMessage, Context, "context");

// ── Evaluation responses ─────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledResponse {
    pub error: Option<String>,
    pub has_enabled: bool,
    pub enabled: bool,
    pub impression_data: bool,
}

wire_message!(EnabledResponse, Enabled, "enabled response");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantResponse {
    pub name: Option<String>,
    pub enabled: bool,
    pub feature_enabled: bool,
    pub impression_data: bool,
    pub payload: Option<VariantPayload>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPayload {
    pub payload_type: String,
    pub value: String,
}

wire_message!(VariantResponse, Variant, "variant response");

// ── Engine introspection ─────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDefs {
    pub items: Vec<FeatureDefEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDefEntry {
    pub name: String,
    pub feature_type: Option<String>,
    pub project: String,
    pub enabled: bool,
}

wire_message!(FeatureDefs, FeatureDefs, "feature definitions");

/// A metrics window. `toggles` is `None` when nothing was counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub start: i64,
    pub stop: i64,
    pub toggles: Option<Vec<ToggleEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleEntry {
    pub key: String,
    pub value: ToggleStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleStats {
    pub yes: u32,
    pub no: u32,
    pub variants: Vec<VariantCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantCount {
    pub key: String,
    pub value: u32,
}

wire_message!(MetricsResponse, Metrics, "metrics");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltInStrategies {
    pub values: Vec<String>,
}

wire_message!(BuiltInStrategies, BuiltInStrategies, "built-in strategies");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreVersion {
    pub version: String,
}

wire_message!(CoreVersion, CoreVersion, "core version");

/// The engine's loaded state, serialized back to JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub json: String,
}

wire_message!(EngineState, State, "engine state");

// ── State loading ────────────────────────────────────────────────

/// Outcome of replacing the engine's toggle state.
///
/// `features` mirrors the strategy topology of the accepted state so the
/// client can map custom strategies without parsing the JSON itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeStateResponse {
    pub features: Vec<StrategyFeature>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyFeature {
    pub feature_name: String,
    pub strategies: Vec<StrategyDefinitionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDefinitionEntry {
    pub name: String,
    pub parameters: Vec<StrategyParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyParameter {
    pub key: String,
    pub value: String,
}

wire_message!(TakeStateResponse, TakeState, "take-state response");

// ── Impact metrics ───────────────────────────────────────────────

/// Declares a counter or a gauge, depending on the call it is sent with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub name: String,
    pub help: String,
}

wire_message!(MetricDefinition, MetricDefinition, "metric definition");

/// Declares a histogram. Empty `buckets` selects the engine's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramDefinition {
    pub name: String,
    pub help: String,
    pub buckets: Vec<f64>,
}

wire_message!(HistogramDefinition, HistogramDefinition, "histogram definition");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterIncrement {
    pub name: String,
    pub value: i64,
    pub labels: Vec<LabelEntry>,
}

wire_message!(CounterIncrement, CounterIncrement, "counter increment");

/// A gauge setting or a histogram observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricObservation {
    pub name: String,
    pub value: f64,
    pub labels: Vec<LabelEntry>,
}

wire_message!(MetricObservation, MetricObservation, "metric observation");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub key: String,
    pub value: String,
}

/// Collected samples, or samples handed back for restoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetrics {
    pub metrics: Vec<ImpactMetricEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetricEntry {
    pub name: String,
    pub help: String,
    pub kind: MetricKindEntry,
    pub samples: Vec<MetricSampleEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKindEntry {
    Counter,
    Gauge,
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSampleEntry {
    pub labels: Vec<LabelEntry>,
    pub value: SampleValueEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SampleValueEntry {
    Number(f64),
    Histogram {
        count: u64,
        sum: f64,
        buckets: Vec<BucketEntry>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketEntry {
    pub le: f64,
    pub count: u64,
}

wire_message!(ImpactMetrics, ImpactMetrics, "impact metrics");

/// Reply to a call that produces nothing but may fail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    pub error: Option<String>,
}

wire_message!(AckResponse, Ack, "acknowledgement");
