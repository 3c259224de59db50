//! Core type definitions for flagline.
//!
//! This crate defines the plain value types that cross crate boundaries:
//! - The evaluation [`Context`] supplied by the host application
//! - Evaluation outcomes ([`EvaluationResult`], [`VariantDef`])
//! - Toggle listings and strategy declarations ([`FeatureDef`], [`StrategyDefinition`])
//! - Usage metrics ([`MetricsBucket`])
//! - Host-defined impact metrics ([`ImpactMetric`])
//!
//! None of these types know about the native engine or the wire format;
//! conversion lives in `flagline-codec`.

mod context;
mod impact;
mod metrics;
mod result;
mod toggle;

pub use context::Context;
pub use impact::{
    HistogramBucket, HistogramSample, ImpactMetric, Labels, MetricKind, MetricSample, SampleValue,
};
pub use metrics::{FeatureCount, MetricsBucket};
pub use result::{EvaluationResult, Payload, VariantDef};
pub use toggle::{FeatureDef, StrategyDefinition};
