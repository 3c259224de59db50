//! Scoped ownership of an engine-produced buffer.

use crate::binding::EngineBinding;
use crate::buf::Buf;
use std::fmt;

/// An engine buffer that is released when dropped.
///
/// Holding the producing binding alongside the buffer guarantees the free
/// call goes back to the allocator that made it.
pub struct OwnedBuf<'a> {
    buf: Option<Buf>,
    binding: &'a dyn EngineBinding,
}

impl<'a> OwnedBuf<'a> {
    /// Takes ownership of `buf`.
    ///
    /// # Safety
    /// `buf` must have been returned by `binding` and not yet freed.
    pub unsafe fn new(buf: Buf, binding: &'a dyn EngineBinding) -> Self {
        Self {
            buf: Some(buf),
            binding,
        }
    }

    /// The buffer contents. Empty for a null buffer.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.buf {
            // SAFETY: the buffer stays live until `self` is dropped.
            Some(buf) => unsafe { buf.as_slice() },
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Releases the buffer now instead of at scope end.
    pub fn release(mut self) {
        self.free();
    }

    fn free(&mut self) {
        if let Some(buf) = self.buf.take() {
            // SAFETY: constructed from a live buffer of this binding; `take`
            // guarantees this runs once.
            unsafe { self.binding.free_buf(buf) };
        }
    }
}

impl Drop for OwnedBuf<'_> {
    fn drop(&mut self) {
        self.free();
    }
}

impl fmt::Debug for OwnedBuf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedBuf")
            .field("len", &self.len())
            .field("released", &self.buf.is_none())
            .finish()
    }
}
