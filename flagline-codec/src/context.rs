//! Context encoding.

use crate::error::CodecError;
use crate::frame::encode_message;
use crate::messages::{ContextMessage, PropertyEntry, StrategyResultEntry};
use chrono::{SecondsFormat, Utc};
use flagline_types::Context;
use std::collections::HashMap;
use tracing::debug;

/// Hostname sent when the local lookup fails.
pub const UNKNOWN_HOSTNAME: &str = "undefined";

/// Builds context messages for one engine.
///
/// The runtime hostname is resolved once, at construction, and attached to
/// every message afterwards.
#[derive(Debug, Clone)]
pub struct ContextEncoder {
    runtime_hostname: String,
}

impl ContextEncoder {
    /// Resolves the hostname from the operating system.
    pub fn detect() -> Self {
        let runtime_hostname = match hostname::get() {
            Ok(name) => name.to_string_lossy().into_owned(),
            Err(e) => {
                debug!(error = %e, "hostname lookup failed");
                UNKNOWN_HOSTNAME.to_string()
            }
        };
        Self { runtime_hostname }
    }

    pub fn with_hostname(runtime_hostname: impl Into<String>) -> Self {
        Self {
            runtime_hostname: runtime_hostname.into(),
        }
    }

    pub fn runtime_hostname(&self) -> &str {
        &self.runtime_hostname
    }

    /// Assembles the message for evaluating `toggle_name` under `context`.
    ///
    /// Properties without a value are left out. Strategy results are sorted
    /// by slot name so identical inputs encode identically.
    pub fn message(
        &self,
        toggle_name: &str,
        context: &Context,
        strategy_results: &HashMap<String, bool>,
    ) -> ContextMessage {
        let current_time = context
            .current_time
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));

        let properties = context
            .present_properties()
            .map(|(key, value)| PropertyEntry {
                key: key.to_string(),
                value: value.to_string(),
            })
            .collect();

        let mut custom_strategies_results: Vec<StrategyResultEntry> = strategy_results
            .iter()
            .map(|(key, value)| StrategyResultEntry {
                key: key.clone(),
                value: *value,
            })
            .collect();
        custom_strategies_results.sort_by(|a, b| a.key.cmp(&b.key));

        ContextMessage {
            toggle_name: toggle_name.to_string(),
            user_id: context.user_id.clone(),
            session_id: context.session_id.clone(),
            app_name: context.app_name.clone(),
            environment: context.environment.clone(),
            remote_address: context.remote_address.clone(),
            current_time,
            runtime_hostname: self.runtime_hostname.clone(),
            properties,
            custom_strategies_results,
        }
    }

    /// Encodes a complete context frame.
    pub fn encode(
        &self,
        toggle_name: &str,
        context: &Context,
        strategy_results: &HashMap<String, bool>,
    ) -> Result<Vec<u8>, CodecError> {
        encode_message(&self.message(toggle_name, context, strategy_results))
    }
}

impl Default for ContextEncoder {
    fn default() -> Self {
        Self::detect()
    }
}
