//! Binary message codec for the native toggle engine.
//!
//! Every message crossing the boundary is a small frame:
//!
//! ```text
//! +------+---------+------+-------------------+
//! | "FL" | version | kind | bincode payload   |
//! +------+---------+------+-------------------+
//! ```
//!
//! Payload schemas live in [`messages`]. Optional fields are `Option`s, so the
//! encoded form always distinguishes "absent" from "present but empty".
//!
//! Responses produced by the engine arrive as [`OwnedBuf`](flagline_buffer::OwnedBuf)s;
//! [`read_message`] decodes one and releases it whatever the outcome, and
//! [`read_optional_message`] also accepts the empty buffer the engine uses
//! for "no data".

mod context;
mod error;
mod frame;
mod impact;
pub mod messages;
mod response;

pub use context::{ContextEncoder, UNKNOWN_HOSTNAME};
pub use error::CodecError;
pub use frame::{
    HEADER_LEN, MAGIC, MessageKind, SCHEMA_VERSION, WireMessage, decode_message, encode_message,
};
pub use impact::label_entries;
pub use response::{read_message, read_optional_message};
