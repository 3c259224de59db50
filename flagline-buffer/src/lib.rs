//! Buffer and handle ownership protocol for the native toggle engine.
//!
//! Every call into the engine that produces variable-length data hands back
//! a [`Buf`] by value. The caller owns that buffer from then on and must give
//! it back exactly once through [`EngineBinding::free_buf`]. [`OwnedBuf`] does
//! this automatically on drop, so release happens on every exit path.
//!
//! Data flowing *into* the engine (encoded contexts, toggle JSON) is borrowed
//! for the duration of the call and never freed by the engine.
//!
//! Call failures travel through a side channel: `Err(NativeCallError)` at the
//! Rust boundary, a [`CallStatus`] out-parameter at the C boundary. A failed
//! call owns no buffer.

mod binding;
mod buf;
mod error;
mod native;
mod owned;

pub use binding::{EngineBinding, RawEngine};
pub use buf::Buf;
pub use error::NativeCallError;
pub use native::{CallStatus, MessageCall, NativeSymbols};
pub use owned::OwnedBuf;
