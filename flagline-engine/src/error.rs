//! Error types for the engine client.

use flagline_buffer::NativeCallError;
use flagline_codec::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine rejected the call or reported an error in its response.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to parse engine message: {0}")]
    Parse(#[from] CodecError),

    #[error("engine has been released")]
    Released,

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<NativeCallError> for EngineError {
    fn from(e: NativeCallError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
