//! Error types for the message codec.

use thiserror::Error;

/// Errors raised while encoding or decoding boundary messages.
///
/// Every variant names the message involved so failures can be traced back
/// to the engine call that produced them.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: bincode::Error,
    },

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: bincode::Error,
    },

    #[error("{what} message truncated: {len} bytes")]
    Truncated { what: &'static str, len: usize },

    #[error("{what} message does not start with the frame magic")]
    BadMagic { what: &'static str },

    #[error("{what} message uses unsupported schema version {found}")]
    UnsupportedVersion { what: &'static str, found: u8 },

    #[error("expected {what} message, found kind {found}")]
    UnexpectedKind { what: &'static str, found: u8 },

    #[error("{what} message has invalid {field}: {detail}")]
    InvalidField {
        what: &'static str,
        field: &'static str,
        detail: String,
    },
}

impl CodecError {
    /// The message being processed when the error occurred.
    pub fn what(&self) -> &'static str {
        match self {
            Self::Encode { what, .. }
            | Self::Decode { what, .. }
            | Self::Truncated { what, .. }
            | Self::BadMagic { what }
            | Self::UnsupportedVersion { what, .. }
            | Self::UnexpectedKind { what, .. }
            | Self::InvalidField { what, .. } => *what,
        }
    }
}
