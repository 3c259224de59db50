//! Frame header and generic encode/decode.

use crate::error::CodecError;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// First two bytes of every frame.
pub const MAGIC: [u8; 2] = *b"FL";

/// Current payload schema version.
pub const SCHEMA_VERSION: u8 = 1;

/// Magic + version + kind.
pub const HEADER_LEN: usize = 4;

/// Identifies the payload schema carried by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Context = 1,
    Enabled = 2,
    Variant = 3,
    FeatureDefs = 4,
    Metrics = 5,
    BuiltInStrategies = 6,
    TakeState = 7,
    CoreVersion = 8,
    State = 9,
    MetricDefinition = 10,
    HistogramDefinition = 11,
    CounterIncrement = 12,
    MetricObservation = 13,
    ImpactMetrics = 14,
    Ack = 15,
}

impl MessageKind {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A payload type with a fixed slot in the frame format.
pub trait WireMessage: Serialize + DeserializeOwned {
    const KIND: MessageKind;
    /// Human-readable name used in errors and logs.
    const NAME: &'static str;
}

/// Encodes a message into a complete frame.
pub fn encode_message<M: WireMessage>(message: &M) -> Result<Vec<u8>, CodecError> {
    let size = bincode::serialized_size(message).map_err(|source| CodecError::Encode {
        what: M::NAME,
        source,
    })?;

    let mut out = Vec::with_capacity(HEADER_LEN + size as usize);
    out.extend_from_slice(&MAGIC);
    out.push(SCHEMA_VERSION);
    out.push(M::KIND.as_u8());

    bincode::serialize_into(&mut out, message).map_err(|source| CodecError::Encode {
        what: M::NAME,
        source,
    })?;
    Ok(out)
}

/// Decodes a complete frame. Never mutates `bytes`.
pub fn decode_message<M: WireMessage>(bytes: &[u8]) -> Result<M, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::Truncated {
            what: M::NAME,
            len: bytes.len(),
        });
    }
    if bytes[..2] != MAGIC {
        return Err(CodecError::BadMagic { what: M::NAME });
    }
    if bytes[2] != SCHEMA_VERSION {
        return Err(CodecError::UnsupportedVersion {
            what: M::NAME,
            found: bytes[2],
        });
    }
    if bytes[3] != M::KIND.as_u8() {
        return Err(CodecError::UnexpectedKind {
            what: M::NAME,
            found: bytes[3],
        });
    }

    bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|source| CodecError::Decode {
        what: M::NAME,
        source,
    })
}
