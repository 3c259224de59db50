//! Evaluation outcomes returned to the host application.

use serde::{Deserialize, Serialize};

/// Result of evaluating one toggle.
///
/// `value` is `None` when the engine has no opinion (unknown toggle, no
/// variant). `error` carries an engine-reported problem; the facade turns a
/// populated error into a typed failure before handing results to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult<T> {
    pub impression_data: bool,
    pub value: Option<T>,
    pub error: Option<String>,
}

impl<T> EvaluationResult<T> {
    /// A successful evaluation.
    pub fn new(impression_data: bool, value: Option<T>) -> Self {
        Self {
            impression_data,
            value,
            error: None,
        }
    }

    /// An evaluation with no value and no impression.
    pub fn empty() -> Self {
        Self::new(false, None)
    }

    /// An evaluation the engine flagged as failed.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            impression_data: false,
            value: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl EvaluationResult<bool> {
    /// Collapses the result to a boolean, treating "no opinion" as `default`.
    pub fn enabled_or(&self, default: bool) -> bool {
        self.value.unwrap_or(default)
    }
}

/// Payload attached to a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "type")]
    pub payload_type: String,
    pub value: String,
}

/// The variant selected for a toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDef {
    pub name: String,
    pub payload: Option<Payload>,
    pub enabled: bool,
    pub feature_enabled: bool,
}

impl VariantDef {
    /// The conventional variant returned when nothing matched.
    pub fn disabled() -> Self {
        Self {
            name: "disabled".to_string(),
            payload: None,
            enabled: false,
            feature_enabled: false,
        }
    }
}
