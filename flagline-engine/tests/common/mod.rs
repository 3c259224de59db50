#![allow(dead_code)]

//! An in-process stand-in for the native engine.
//!
//! It understands a small subset of the toggle JSON format (`default`,
//! `userWithId` and custom strategies), speaks the real wire codec, and keeps
//! a ledger of every buffer and engine instance it hands out.

use chrono::Utc;
use flagline_buffer::{Buf, CallStatus, EngineBinding, NativeCallError, RawEngine};
use flagline_codec::messages::{
    AckResponse, BucketEntry, BuiltInStrategies, ContextMessage, CoreVersion, CounterIncrement,
    EnabledResponse, EngineState, FeatureDefEntry, FeatureDefs, HistogramDefinition,
    ImpactMetricEntry, ImpactMetrics, LabelEntry, MetricDefinition, MetricKindEntry,
    MetricObservation, MetricSampleEntry, MetricsResponse, SampleValueEntry,
    StrategyDefinitionEntry, StrategyFeature, StrategyParameter, TakeStateResponse, ToggleEntry,
    ToggleStats, VariantCount, VariantPayload, VariantResponse,
};
use flagline_codec::{WireMessage, decode_message, encode_message};
use serde::Deserialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::ffi::{CStr, c_void};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const BUILTINS: &[&str] = &["default", "userWithId", "flexibleRollout"];

// ── Toggle JSON ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct ToggleFile {
    #[serde(default)]
    features: Vec<ToggleDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToggleDef {
    name: String,
    #[serde(default)]
    enabled: bool,
    #[serde(default = "default_project")]
    project: String,
    #[serde(rename = "type")]
    feature_type: Option<String>,
    #[serde(default)]
    impression_data: bool,
    #[serde(default)]
    strategies: Vec<StrategyDef>,
    #[serde(default)]
    variants: Vec<VariantDefJson>,
}

fn default_project() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Deserialize)]
struct StrategyDef {
    name: String,
    #[serde(default)]
    parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
struct VariantDefJson {
    name: String,
    payload: Option<PayloadJson>,
}

#[derive(Debug, Clone, Deserialize)]
struct PayloadJson {
    #[serde(rename = "type")]
    payload_type: String,
    value: String,
}

#[derive(Default)]
struct Counts {
    yes: u32,
    no: u32,
    variants: BTreeMap<String, u32>,
}

/// Default histogram bounds when a definition names none.
pub const DEFAULT_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

type SeriesKey = Vec<(String, String)>;

enum Series {
    Number(f64),
    Histogram { count: u64, sum: f64, counts: Vec<u64> },
}

impl Series {
    fn from_entry(value: SampleValueEntry) -> Self {
        match value {
            SampleValueEntry::Number(value) => Series::Number(value),
            SampleValueEntry::Histogram { count, sum, buckets } => Series::Histogram {
                count,
                sum,
                counts: buckets
                    .iter()
                    .filter(|b| b.le.is_finite())
                    .map(|b| b.count)
                    .collect(),
            },
        }
    }

    /// Counters and histograms add up; a gauge keeps its newer value.
    fn merge(&mut self, kind: MetricKindEntry, value: SampleValueEntry) {
        match (self, value) {
            (Series::Number(current), SampleValueEntry::Number(value)) => {
                if kind == MetricKindEntry::Counter {
                    *current += value;
                }
            }
            (
                Series::Histogram { count, sum, counts },
                SampleValueEntry::Histogram {
                    count: restored_count,
                    sum: restored_sum,
                    buckets,
                },
            ) => {
                *count += restored_count;
                *sum += restored_sum;
                for (slot, bucket) in counts.iter_mut().zip(&buckets) {
                    *slot += bucket.count;
                }
            }
            _ => {}
        }
    }
}

struct FakeMetric {
    help: String,
    kind: MetricKindEntry,
    bounds: Vec<f64>,
    series: BTreeMap<SeriesKey, Series>,
}

struct FakeInstance {
    json: String,
    toggles: Vec<ToggleDef>,
    metrics: BTreeMap<String, Counts>,
    window_start: i64,
    impact: BTreeMap<String, FakeMetric>,
}

impl FakeInstance {
    fn new() -> Self {
        Self {
            json: "{}".to_string(),
            toggles: Vec::new(),
            metrics: BTreeMap::new(),
            window_start: Utc::now().timestamp_millis(),
            impact: BTreeMap::new(),
        }
    }

    fn define(
        &mut self,
        name: &str,
        help: &str,
        kind: MetricKindEntry,
        bounds: Vec<f64>,
    ) -> Result<(), String> {
        if name.is_empty() || help.is_empty() {
            return Err("metric name and help must not be empty".to_string());
        }
        self.impact.entry(name.to_string()).or_insert(FakeMetric {
            help: help.to_string(),
            kind,
            bounds,
            series: BTreeMap::new(),
        });
        Ok(())
    }

    fn metric(&mut self, name: &str, kind: MetricKindEntry) -> Result<&mut FakeMetric, String> {
        match self.impact.get_mut(name) {
            Some(metric) if metric.kind == kind => Ok(metric),
            Some(_) => Err(format!("metric {name} has a different type")),
            None => Err(format!("unknown metric {name}")),
        }
    }

    fn collect(&mut self) -> Vec<ImpactMetricEntry> {
        self.impact
            .iter_mut()
            .filter(|(_, metric)| !metric.series.is_empty())
            .map(|(name, metric)| {
                let bounds = metric.bounds.clone();
                let samples = std::mem::take(&mut metric.series)
                    .into_iter()
                    .map(|(key, series)| MetricSampleEntry {
                        labels: key
                            .into_iter()
                            .map(|(key, value)| LabelEntry { key, value })
                            .collect(),
                        value: match series {
                            Series::Number(value) => SampleValueEntry::Number(value),
                            Series::Histogram { count, sum, counts } => {
                                let mut buckets: Vec<BucketEntry> = bounds
                                    .iter()
                                    .zip(counts)
                                    .map(|(le, count)| BucketEntry { le: *le, count })
                                    .collect();
                                buckets.push(BucketEntry {
                                    le: f64::INFINITY,
                                    count,
                                });
                                SampleValueEntry::Histogram {
                                    count,
                                    sum,
                                    buckets,
                                }
                            }
                        },
                    })
                    .collect();
                ImpactMetricEntry {
                    name: name.clone(),
                    help: metric.help.clone(),
                    kind: metric.kind,
                    samples,
                }
            })
            .collect()
    }

    fn restore(&mut self, entries: Vec<ImpactMetricEntry>) {
        for entry in entries {
            let bounds = entry
                .samples
                .iter()
                .find_map(|s| match &s.value {
                    SampleValueEntry::Histogram { buckets, .. } => Some(
                        buckets
                            .iter()
                            .map(|b| b.le)
                            .filter(|le| le.is_finite())
                            .collect(),
                    ),
                    SampleValueEntry::Number(_) => None,
                })
                .unwrap_or_default();
            if self.define(&entry.name, &entry.help, entry.kind, bounds).is_err() {
                continue;
            }
            let Some(metric) = self.impact.get_mut(&entry.name) else {
                continue;
            };
            for sample in entry.samples {
                let kind = metric.kind;
                match metric.series.entry(series_key(&sample.labels)) {
                    Entry::Vacant(slot) => {
                        slot.insert(Series::from_entry(sample.value));
                    }
                    Entry::Occupied(mut slot) => slot.get_mut().merge(kind, sample.value),
                }
            }
        }
    }

    fn toggle(&self, name: &str) -> Option<&ToggleDef> {
        self.toggles.iter().find(|t| t.name == name)
    }
}

fn series_key(labels: &[LabelEntry]) -> SeriesKey {
    let mut key: SeriesKey = labels
        .iter()
        .map(|l| (l.key.clone(), l.value.clone()))
        .collect();
    key.sort();
    key
}

// ── Fake engine ──────────────────────────────────────────────────

/// Knobs and counters for the fake engine.
#[derive(Default)]
pub struct FakeEngine {
    engines: Mutex<HashMap<usize, FakeInstance>>,
    pub engines_created: AtomicUsize,
    pub engines_freed: AtomicUsize,
    pub engine_double_frees: AtomicUsize,

    live_bufs: Mutex<HashMap<usize, usize>>,
    pub bufs_allocated: AtomicUsize,
    pub bufs_freed: AtomicUsize,
    pub buf_double_frees: AtomicUsize,

    pub builtins_calls: AtomicUsize,
    in_call: AtomicBool,
    pub overlapping_calls: AtomicUsize,

    /// Next evaluation call fails at the native layer.
    pub fail_next_call: AtomicBool,
    /// Next response is garbage that will not decode.
    pub corrupt_next_response: AtomicBool,
    /// Every response is a null buffer until cleared.
    pub respond_empty: AtomicBool,
    /// Next evaluation response carries this engine-reported error.
    pub next_error: Mutex<Option<String>>,
    /// Last context message received, decoded.
    pub last_context: Mutex<Option<ContextMessage>>,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn live_buffers(&self) -> usize {
        self.bufs_allocated.load(Ordering::SeqCst) - self.bufs_freed.load(Ordering::SeqCst)
    }

    pub fn live_engines(&self) -> usize {
        self.engines_created.load(Ordering::SeqCst) - self.engines_freed.load(Ordering::SeqCst)
    }

    /// Every buffer handed out was freed exactly once.
    pub fn assert_balanced(&self) {
        assert_eq!(self.live_buffers(), 0, "leaked buffers");
        assert_eq!(self.buf_double_frees.load(Ordering::SeqCst), 0, "double-freed buffers");
        assert_eq!(self.engine_double_frees.load(Ordering::SeqCst), 0, "double-freed engines");
    }

    pub fn last_context(&self) -> Option<ContextMessage> {
        self.last_context.lock().unwrap().clone()
    }

    fn alloc(&self, bytes: Vec<u8>) -> Buf {
        self.track(Buf::from_vec(bytes))
    }

    fn track(&self, buf: Buf) -> Buf {
        self.bufs_allocated.fetch_add(1, Ordering::SeqCst);
        *self.live_bufs.lock().unwrap().entry(buf.ptr as usize).or_default() += 1;
        buf
    }

    fn respond<M: WireMessage>(&self, message: &M) -> Result<Buf, NativeCallError> {
        if self.respond_empty.load(Ordering::SeqCst) {
            return Ok(self.track(Buf::empty()));
        }
        if self.corrupt_next_response.swap(false, Ordering::SeqCst) {
            return Ok(self.alloc(b"garbage!".to_vec()));
        }
        Ok(self.alloc(encode_message(message).unwrap()))
    }

    fn check_failure(&self, operation: &'static str) -> Result<(), NativeCallError> {
        if self.fail_next_call.swap(false, Ordering::SeqCst) {
            return Err(NativeCallError::new(
                operation,
                CallStatus::INVALID_INPUT,
                "injected failure",
            ));
        }
        Ok(())
    }

    /// Runs `f` against the engine's state, flagging reentrant use.
    fn with_engine<T>(&self, engine: RawEngine, f: impl FnOnce(&mut FakeInstance) -> T) -> T {
        if self.in_call.swap(true, Ordering::SeqCst) {
            self.overlapping_calls.fetch_add(1, Ordering::SeqCst);
        }
        std::thread::yield_now();
        let out = {
            let mut engines = self.engines.lock().unwrap();
            let state = engines
                .get_mut(&(engine.as_ptr() as usize))
                .expect("call on an engine that was freed");
            f(state)
        };
        self.in_call.store(false, Ordering::SeqCst);
        out
    }

    fn evaluate(toggle: &ToggleDef, ctx: &ContextMessage) -> bool {
        if !toggle.enabled {
            return false;
        }
        if toggle.strategies.is_empty() {
            return true;
        }
        let results: HashMap<&str, bool> = ctx
            .custom_strategies_results
            .iter()
            .map(|r| (r.key.as_str(), r.value))
            .collect();
        let mut custom_index = 0;
        toggle.strategies.iter().any(|strategy| match strategy.name.as_str() {
            "default" => true,
            "userWithId" => {
                let ids = strategy.parameters.get("userIds").map(String::as_str).unwrap_or("");
                ctx.user_id
                    .as_deref()
                    .is_some_and(|id| ids.split(',').map(str::trim).any(|x| x == id))
            }
            "flexibleRollout" => strategy
                .parameters
                .get("rollout")
                .is_some_and(|r| r == "100"),
            _ => {
                custom_index += 1;
                let slot = format!("customStrategy{custom_index}");
                results.get(slot.as_str()).copied().unwrap_or(false)
            }
        })
    }

    fn record(state: &mut FakeInstance, name: &str, enabled: bool, variant: Option<&str>) {
        let counts = state.metrics.entry(name.to_string()).or_default();
        if enabled {
            counts.yes += 1;
        } else {
            counts.no += 1;
        }
        if let Some(variant) = variant {
            *counts.variants.entry(variant.to_string()).or_default() += 1;
        }
    }

    fn acknowledge(&self, outcome: Result<(), String>) -> Result<Buf, NativeCallError> {
        self.respond(&AckResponse {
            error: outcome.err(),
        })
    }

    fn decode_context(&self, message: &[u8]) -> ContextMessage {
        let ctx: ContextMessage = decode_message(message).expect("client sent a bad context");
        *self.last_context.lock().unwrap() = Some(ctx.clone());
        ctx
    }
}

impl EngineBinding for FakeEngine {
    fn new_engine(&self) -> Result<RawEngine, NativeCallError> {
        let token = Box::into_raw(Box::new(0u64)) as *mut c_void;
        self.engines
            .lock()
            .unwrap()
            .insert(token as usize, FakeInstance::new());
        self.engines_created.fetch_add(1, Ordering::SeqCst);
        RawEngine::from_ptr(token)
            .ok_or_else(|| NativeCallError::new("new_engine", CallStatus::NULL_ENGINE, "null"))
    }

    unsafe fn free_engine(&self, engine: RawEngine) {
        let removed = self
            .engines
            .lock()
            .unwrap()
            .remove(&(engine.as_ptr() as usize));
        if removed.is_some() {
            self.engines_freed.fetch_add(1, Ordering::SeqCst);
            drop(unsafe { Box::from_raw(engine.as_ptr() as *mut u64) });
        } else {
            self.engine_double_frees.fetch_add(1, Ordering::SeqCst);
        }
    }

    unsafe fn take_state(
        &self,
        engine: RawEngine,
        toggles_json: &CStr,
    ) -> Result<Buf, NativeCallError> {
        self.check_failure("take_state")?;
        let json = toggles_json.to_string_lossy().into_owned();
        let response = self.with_engine(engine, |state| {
            let file: ToggleFile = match serde_json::from_str(&json) {
                Ok(file) => file,
                Err(e) => {
                    return TakeStateResponse {
                        error: Some(format!("failed to parse toggle state: {e}")),
                        ..TakeStateResponse::default()
                    };
                }
            };

            let mut warnings = Vec::new();
            let mut seen = std::collections::HashSet::new();
            for toggle in &file.features {
                if !seen.insert(toggle.name.clone()) {
                    warnings.push(format!("duplicate toggle {}", toggle.name));
                }
            }

            let features = file
                .features
                .iter()
                .map(|toggle| StrategyFeature {
                    feature_name: toggle.name.clone(),
                    strategies: toggle
                        .strategies
                        .iter()
                        .map(|s| StrategyDefinitionEntry {
                            name: s.name.clone(),
                            parameters: s
                                .parameters
                                .iter()
                                .map(|(k, v)| StrategyParameter {
                                    key: k.clone(),
                                    value: v.clone(),
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect();

            state.json = json.clone();
            state.toggles = file.features;
            TakeStateResponse {
                features,
                warnings,
                error: None,
            }
        });
        self.respond(&response)
    }

    unsafe fn get_state(&self, engine: RawEngine) -> Result<Buf, NativeCallError> {
        self.check_failure("get_state")?;
        let json = self.with_engine(engine, |state| state.json.clone());
        self.respond(&EngineState { json })
    }

    unsafe fn check_enabled(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        self.check_failure("check_enabled")?;
        let ctx = self.decode_context(message);
        let error = self.next_error.lock().unwrap().take();
        let response = self.with_engine(engine, |state| {
            if let Some(error) = error {
                return EnabledResponse {
                    error: Some(error),
                    ..EnabledResponse::default()
                };
            }
            let Some(toggle) = state.toggle(&ctx.toggle_name).cloned() else {
                return EnabledResponse::default();
            };
            let enabled = Self::evaluate(&toggle, &ctx);
            Self::record(state, &toggle.name, enabled, None);
            EnabledResponse {
                error: None,
                has_enabled: true,
                enabled,
                impression_data: toggle.impression_data,
            }
        });
        self.respond(&response)
    }

    unsafe fn check_variant(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        self.check_failure("check_variant")?;
        let ctx = self.decode_context(message);
        let error = self.next_error.lock().unwrap().take();
        let response = self.with_engine(engine, |state| {
            if let Some(error) = error {
                return VariantResponse {
                    error: Some(error),
                    ..VariantResponse::default()
                };
            }
            let Some(toggle) = state.toggle(&ctx.toggle_name).cloned() else {
                return VariantResponse::default();
            };
            let enabled = Self::evaluate(&toggle, &ctx);
            let chosen = enabled.then(|| toggle.variants.first().cloned()).flatten();
            Self::record(state, &toggle.name, enabled, chosen.as_ref().map(|v| v.name.as_str()));
            match chosen {
                Some(variant) => VariantResponse {
                    name: Some(variant.name),
                    enabled: true,
                    feature_enabled: true,
                    impression_data: toggle.impression_data,
                    payload: variant.payload.map(|p| VariantPayload {
                        payload_type: p.payload_type,
                        value: p.value,
                    }),
                    error: None,
                },
                None => VariantResponse {
                    name: Some("disabled".to_string()),
                    enabled: false,
                    feature_enabled: enabled,
                    impression_data: toggle.impression_data,
                    payload: None,
                    error: None,
                },
            }
        });
        self.respond(&response)
    }

    unsafe fn list_known_toggles(&self, engine: RawEngine) -> Result<Buf, NativeCallError> {
        self.check_failure("list_known_toggles")?;
        let items: Vec<FeatureDefEntry> = self.with_engine(engine, |state| {
            state
                .toggles
                .iter()
                .map(|t| FeatureDefEntry {
                    name: t.name.clone(),
                    feature_type: t.feature_type.clone(),
                    project: t.project.clone(),
                    enabled: t.enabled,
                })
                .collect()
        });
        self.respond(&FeatureDefs { items })
    }

    unsafe fn get_metrics(&self, engine: RawEngine) -> Result<Buf, NativeCallError> {
        self.check_failure("get_metrics")?;
        let response = self.with_engine(engine, |state| {
            let now = Utc::now().timestamp_millis();
            let start = std::mem::replace(&mut state.window_start, now);
            if state.metrics.is_empty() {
                return MetricsResponse {
                    start,
                    stop: now,
                    toggles: None,
                };
            }
            let toggles: Vec<ToggleEntry> = std::mem::take(&mut state.metrics)
                .into_iter()
                .map(|(key, counts)| ToggleEntry {
                    key,
                    value: ToggleStats {
                        yes: counts.yes,
                        no: counts.no,
                        variants: counts
                            .variants
                            .into_iter()
                            .map(|(key, value)| VariantCount { key, value })
                            .collect(),
                    },
                })
                .collect();
            MetricsResponse {
                start,
                stop: now,
                toggles: Some(toggles),
            }
        });
        self.respond(&response)
    }

    unsafe fn define_counter(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        self.check_failure("define_counter")?;
        let def: MetricDefinition = decode_message(message).expect("bad counter definition");
        let outcome = self.with_engine(engine, |state| {
            state.define(&def.name, &def.help, MetricKindEntry::Counter, Vec::new())
        });
        self.acknowledge(outcome)
    }

    unsafe fn inc_counter(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        self.check_failure("inc_counter")?;
        let inc: CounterIncrement = decode_message(message).expect("bad counter increment");
        let outcome = self.with_engine(engine, |state| -> Result<(), String> {
            let metric = state.metric(&inc.name, MetricKindEntry::Counter)?;
            let series = metric
                .series
                .entry(series_key(&inc.labels))
                .or_insert(Series::Number(0.0));
            if let Series::Number(total) = series {
                *total += inc.value as f64;
            }
            Ok(())
        });
        self.acknowledge(outcome)
    }

    unsafe fn define_gauge(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        self.check_failure("define_gauge")?;
        let def: MetricDefinition = decode_message(message).expect("bad gauge definition");
        let outcome = self.with_engine(engine, |state| {
            state.define(&def.name, &def.help, MetricKindEntry::Gauge, Vec::new())
        });
        self.acknowledge(outcome)
    }

    unsafe fn set_gauge(&self, engine: RawEngine, message: &[u8]) -> Result<Buf, NativeCallError> {
        self.check_failure("set_gauge")?;
        let obs: MetricObservation = decode_message(message).expect("bad gauge setting");
        let outcome = self.with_engine(engine, |state| -> Result<(), String> {
            let metric = state.metric(&obs.name, MetricKindEntry::Gauge)?;
            metric
                .series
                .insert(series_key(&obs.labels), Series::Number(obs.value));
            Ok(())
        });
        self.acknowledge(outcome)
    }

    unsafe fn define_histogram(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        self.check_failure("define_histogram")?;
        let def: HistogramDefinition = decode_message(message).expect("bad histogram definition");
        let bounds = if def.buckets.is_empty() {
            DEFAULT_BUCKETS.to_vec()
        } else {
            def.buckets
        };
        let outcome = self.with_engine(engine, |state| {
            state.define(&def.name, &def.help, MetricKindEntry::Histogram, bounds)
        });
        self.acknowledge(outcome)
    }

    unsafe fn observe_histogram(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        self.check_failure("observe_histogram")?;
        let obs: MetricObservation = decode_message(message).expect("bad observation");
        let outcome = self.with_engine(engine, |state| -> Result<(), String> {
            let metric = state.metric(&obs.name, MetricKindEntry::Histogram)?;
            let slots = metric.bounds.len();
            let series = metric
                .series
                .entry(series_key(&obs.labels))
                .or_insert_with(|| Series::Histogram {
                    count: 0,
                    sum: 0.0,
                    counts: vec![0; slots],
                });
            if let Series::Histogram { count, sum, counts } = series {
                *count += 1;
                *sum += obs.value;
                for (le, slot) in metric.bounds.iter().zip(counts.iter_mut()) {
                    if obs.value <= *le {
                        *slot += 1;
                    }
                }
            }
            Ok(())
        });
        self.acknowledge(outcome)
    }

    unsafe fn collect_impact_metrics(&self, engine: RawEngine) -> Result<Buf, NativeCallError> {
        self.check_failure("collect_impact_metrics")?;
        let metrics = self.with_engine(engine, FakeInstance::collect);
        self.respond(&ImpactMetrics { metrics })
    }

    unsafe fn restore_impact_metrics(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        self.check_failure("restore_impact_metrics")?;
        let restored: ImpactMetrics = decode_message(message).expect("bad restored metrics");
        self.with_engine(engine, |state| state.restore(restored.metrics));
        self.acknowledge(Ok(()))
    }

    fn built_in_strategies(&self) -> Result<Buf, NativeCallError> {
        self.builtins_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(&BuiltInStrategies {
            values: BUILTINS.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn core_version(&self) -> Result<Buf, NativeCallError> {
        self.respond(&CoreVersion {
            version: "0.17.0-fake".to_string(),
        })
    }

    unsafe fn free_buf(&self, buf: Buf) {
        let key = buf.ptr as usize;
        let mut live = self.live_bufs.lock().unwrap();
        match live.get_mut(&key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    live.remove(&key);
                }
                self.bufs_freed.fetch_add(1, Ordering::SeqCst);
                drop(unsafe { buf.into_vec() });
            }
            _ => {
                self.buf_double_frees.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

// ── Fixtures ─────────────────────────────────────────────────────

/// Toggle state exercising built-in, custom and variant paths.
pub const TOGGLES: &str = r##"{
  "version": 1,
  "features": [
    {
      "name": "always-on",
      "enabled": true,
      "type": "release",
      "strategies": [{ "name": "default" }]
    },
    {
      "name": "switched-off",
      "enabled": false,
      "strategies": [{ "name": "default" }]
    },
    {
      "name": "vip-only",
      "enabled": true,
      "impressionData": true,
      "strategies": [{ "name": "userWithId", "parameters": { "userIds": "7, 42" } }]
    },
    {
      "name": "Feature.Custom.Strategies",
      "enabled": true,
      "strategies": [
        { "name": "custom", "parameters": {} },
        { "name": "cus-tom", "parameters": {} }
      ]
    },
    {
      "name": "region-gated",
      "enabled": true,
      "strategies": [
        { "name": "default-off", "parameters": {} },
        { "name": "region", "parameters": { "regions": "eu" } }
      ]
    },
    {
      "name": "colors",
      "enabled": true,
      "strategies": [{ "name": "default" }],
      "variants": [
        { "name": "blue", "payload": { "type": "string", "value": "#00f" } }
      ]
    }
  ]
}"##;

/// Ten toggles: custom-1 ... custom-10, each gated by the `custom` strategy.
pub fn many_custom_toggles() -> String {
    let features: Vec<String> = (1..=10)
        .map(|i| {
            format!(r#"{{"name":"custom-{i}","enabled":true,"strategies":[{{"name":"custom"}}]}}"#)
        })
        .collect();
    format!(r#"{{"version":1,"features":[{}]}}"#, features.join(","))
}
