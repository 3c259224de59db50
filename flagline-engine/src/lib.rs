//! Safe client for a native feature toggle engine.
//!
//! [`ToggleEngine`] owns one engine instance and routes every evaluation
//! through it. Host applications can register custom [`Strategy`]
//! implementations; their verdicts are computed locally and passed to the
//! engine alongside each evaluation context.
//!
//! ```ignore
//! use flagline_engine::{Context, ToggleEngine, strategy_fn};
//!
//! let engine = ToggleEngine::builder(binding)
//!     .strategy(strategy_fn("beta-users", |_, ctx| Ok(ctx.property("beta") == Some("yes"))))
//!     .build()?;
//! engine.take_state(&toggles_json)?;
//!
//! let result = engine.is_enabled("new-checkout", &Context::new().with_user_id("42"))?;
//! if result.enabled_or(false) {
//!     // ...
//! }
//! ```
//!
//! The engine also keeps host-defined impact metrics (counters, gauges and
//! histograms), drained with [`ToggleEngine::collect_impact_metrics`].

mod config;
mod engine;
mod error;
mod handle;
pub mod logging;

pub use config::{EngineConfig, EngineSection, LoggingConfig};
pub use engine::{ToggleEngine, ToggleEngineBuilder};
pub use error::{EngineError, Result};
pub use handle::EngineHandle;
pub use logging::init_tracing;

pub use flagline_buffer::{EngineBinding, NativeSymbols};
pub use flagline_strategy::{Strategy, StrategyOutcome, strategy_fn};
pub use flagline_types::{
    Context, EvaluationResult, FeatureCount, FeatureDef, HistogramBucket, HistogramSample,
    ImpactMetric, Labels, MetricKind, MetricSample, MetricsBucket, Payload, SampleValue,
    VariantDef,
};
