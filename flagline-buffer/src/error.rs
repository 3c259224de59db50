//! Error type for failed native calls.

use thiserror::Error;

/// The engine reported that a call failed outright.
///
/// Distinct from a call that succeeded and returned an empty buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("native call `{operation}` failed (code {code}): {message}")]
pub struct NativeCallError {
    pub operation: &'static str,
    pub code: i32,
    pub message: String,
}

impl NativeCallError {
    pub fn new(operation: &'static str, code: i32, message: impl Into<String>) -> Self {
        Self {
            operation,
            code,
            message: message.into(),
        }
    }
}
