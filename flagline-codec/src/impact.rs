//! Impact metric values to and from their wire entries.

use crate::messages::{
    BucketEntry, ImpactMetricEntry, ImpactMetrics, LabelEntry, MetricKindEntry, MetricSampleEntry,
    SampleValueEntry,
};
use flagline_types::{
    HistogramBucket, HistogramSample, ImpactMetric, Labels, MetricKind, MetricSample, SampleValue,
};

/// Wire form of an optional label set. Entries are ordered by key.
pub fn label_entries(labels: Option<&Labels>) -> Vec<LabelEntry> {
    labels
        .into_iter()
        .flatten()
        .map(|(key, value)| LabelEntry {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

fn labels_from(entries: Vec<LabelEntry>) -> Labels {
    entries.into_iter().map(|l| (l.key, l.value)).collect()
}

impl From<MetricKind> for MetricKindEntry {
    fn from(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Counter => Self::Counter,
            MetricKind::Gauge => Self::Gauge,
            MetricKind::Histogram => Self::Histogram,
        }
    }
}

impl From<MetricKindEntry> for MetricKind {
    fn from(kind: MetricKindEntry) -> Self {
        match kind {
            MetricKindEntry::Counter => Self::Counter,
            MetricKindEntry::Gauge => Self::Gauge,
            MetricKindEntry::Histogram => Self::Histogram,
        }
    }
}

impl From<ImpactMetricEntry> for ImpactMetric {
    fn from(entry: ImpactMetricEntry) -> Self {
        let samples = entry
            .samples
            .into_iter()
            .map(|sample| MetricSample {
                labels: labels_from(sample.labels),
                value: match sample.value {
                    SampleValueEntry::Number(value) => SampleValue::Number(value),
                    SampleValueEntry::Histogram {
                        count,
                        sum,
                        buckets,
                    } => SampleValue::Histogram(HistogramSample {
                        count,
                        sum,
                        buckets: buckets
                            .into_iter()
                            .map(|b| HistogramBucket {
                                le: b.le,
                                count: b.count,
                            })
                            .collect(),
                    }),
                },
            })
            .collect();

        ImpactMetric {
            name: entry.name,
            help: entry.help,
            kind: entry.kind.into(),
            samples,
        }
    }
}

impl From<&ImpactMetric> for ImpactMetricEntry {
    fn from(metric: &ImpactMetric) -> Self {
        let samples = metric
            .samples
            .iter()
            .map(|sample| MetricSampleEntry {
                labels: label_entries(Some(&sample.labels)),
                value: match &sample.value {
                    SampleValue::Number(value) => SampleValueEntry::Number(*value),
                    SampleValue::Histogram(h) => SampleValueEntry::Histogram {
                        count: h.count,
                        sum: h.sum,
                        buckets: h
                            .buckets
                            .iter()
                            .map(|b| BucketEntry {
                                le: b.le,
                                count: b.count,
                            })
                            .collect(),
                    },
                },
            })
            .collect();

        ImpactMetricEntry {
            name: metric.name.clone(),
            help: metric.help.clone(),
            kind: metric.kind.into(),
            samples,
        }
    }
}

impl From<ImpactMetrics> for Vec<ImpactMetric> {
    fn from(metrics: ImpactMetrics) -> Self {
        metrics.metrics.into_iter().map(ImpactMetric::from).collect()
    }
}

impl<'a> FromIterator<&'a ImpactMetric> for ImpactMetrics {
    fn from_iter<I: IntoIterator<Item = &'a ImpactMetric>>(iter: I) -> Self {
        ImpactMetrics {
            metrics: iter.into_iter().map(ImpactMetricEntry::from).collect(),
        }
    }
}
