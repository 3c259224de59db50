//! Application-defined impact metrics held by the engine.
//!
//! The host declares counters, gauges and histograms, records samples into
//! them, and periodically collects (drains) what was recorded. A collection
//! that could not be delivered can be restored into the engine so the next
//! collection includes it again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label set identifying one sample series of a metric.
pub type Labels = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared metric and every sample series recorded for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactMetric {
    pub name: String,
    pub help: String,
    #[serde(rename = "type")]
    pub kind: MetricKind,
    #[serde(default)]
    pub samples: Vec<MetricSample>,
}

impl ImpactMetric {
    /// The series recorded under exactly `labels`.
    pub fn sample(&self, labels: &Labels) -> Option<&MetricSample> {
        self.samples.iter().find(|s| &s.labels == labels)
    }

    /// The series recorded without labels.
    pub fn unlabelled(&self) -> Option<&MetricSample> {
        self.sample(&Labels::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    #[serde(default)]
    pub labels: Labels,
    pub value: SampleValue,
}

/// Counters and gauges carry a number; histograms carry bucket counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Number(f64),
    Histogram(HistogramSample),
}

impl SampleValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Histogram(_) => None,
        }
    }

    pub fn as_histogram(&self) -> Option<&HistogramSample> {
        match self {
            Self::Number(_) => None,
            Self::Histogram(histogram) => Some(histogram),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramSample {
    pub count: u64,
    pub sum: f64,
    /// Cumulative counts, ordered by upper bound.
    pub buckets: Vec<HistogramBucket>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Inclusive upper bound; `f64::INFINITY` for the overflow bucket.
    pub le: f64,
    pub count: u64,
}
