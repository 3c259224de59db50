//! Decoding engine responses into typed values.

use crate::error::CodecError;
use crate::frame::{WireMessage, decode_message};
use crate::messages::{
    EnabledResponse, FeatureDefEntry, FeatureDefs, MetricsResponse, StrategyDefinitionEntry,
    VariantResponse,
};
use chrono::{DateTime, Utc};
use flagline_buffer::OwnedBuf;
use flagline_types::{
    EvaluationResult, FeatureCount, FeatureDef, MetricsBucket, Payload, StrategyDefinition,
    VariantDef,
};

/// Decodes an engine response and releases its buffer.
///
/// The buffer is freed exactly once whether or not decoding succeeds.
pub fn read_message<M: WireMessage>(buf: OwnedBuf<'_>) -> Result<M, CodecError> {
    let decoded = decode_message(buf.as_bytes());
    buf.release();
    decoded
}

/// Like [`read_message`], but a null or zero-length buffer means the engine
/// had no data and yields `Ok(None)`. The buffer is still released.
pub fn read_optional_message<M: WireMessage>(buf: OwnedBuf<'_>) -> Result<Option<M>, CodecError> {
    if buf.is_empty() {
        buf.release();
        return Ok(None);
    }
    read_message(buf).map(Some)
}

impl From<EnabledResponse> for EvaluationResult<bool> {
    fn from(response: EnabledResponse) -> Self {
        if let Some(error) = response.error {
            return EvaluationResult::failed(error);
        }
        let value = response.has_enabled.then_some(response.enabled);
        EvaluationResult::new(response.impression_data, value)
    }
}

impl From<VariantResponse> for EvaluationResult<VariantDef> {
    fn from(response: VariantResponse) -> Self {
        if let Some(error) = response.error {
            return EvaluationResult::failed(error);
        }
        let Some(name) = response.name else {
            return EvaluationResult::new(response.impression_data, None);
        };
        let variant = VariantDef {
            name,
            payload: response.payload.map(|p| Payload {
                payload_type: p.payload_type,
                value: p.value,
            }),
            enabled: response.enabled,
            feature_enabled: response.feature_enabled,
        };
        EvaluationResult::new(response.impression_data, Some(variant))
    }
}

impl From<FeatureDefEntry> for FeatureDef {
    fn from(entry: FeatureDefEntry) -> Self {
        FeatureDef {
            name: entry.name,
            feature_type: entry.feature_type,
            project: entry.project,
            enabled: entry.enabled,
        }
    }
}

impl From<FeatureDefs> for Vec<FeatureDef> {
    fn from(defs: FeatureDefs) -> Self {
        defs.items.into_iter().map(FeatureDef::from).collect()
    }
}

impl From<StrategyDefinitionEntry> for StrategyDefinition {
    fn from(entry: StrategyDefinitionEntry) -> Self {
        StrategyDefinition {
            name: entry.name,
            parameters: entry
                .parameters
                .into_iter()
                .map(|p| (p.key, p.value))
                .collect(),
        }
    }
}

impl MetricsResponse {
    /// Converts to a bucket. `None` when the engine counted nothing.
    pub fn into_bucket(self) -> Result<Option<MetricsBucket>, CodecError> {
        let Some(toggles) = self.toggles else {
            return Ok(None);
        };
        let start = millis("start", self.start)?;
        let stop = millis("stop", self.stop)?;

        let toggles = toggles
            .into_iter()
            .map(|entry| {
                let stats = entry.value;
                let count = FeatureCount {
                    yes: stats.yes,
                    no: stats.no,
                    variants: stats
                        .variants
                        .into_iter()
                        .map(|v| (v.key, v.value))
                        .collect(),
                };
                (entry.key, count)
            })
            .collect();

        Ok(Some(MetricsBucket {
            start,
            stop,
            toggles,
        }))
    }
}

fn millis(field: &'static str, value: i64) -> Result<DateTime<Utc>, CodecError> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| CodecError::InvalidField {
        what: MetricsResponse::NAME,
        field,
        detail: format!("{value} is not a representable epoch millisecond"),
    })
}
