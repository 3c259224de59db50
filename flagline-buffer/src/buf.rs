//! The transferable buffer type.

use std::mem::ManuallyDrop;
use std::ptr;

/// A heap allocation handed across the engine boundary by value.
///
/// `ptr`, `len` and `cap` always travel together; a buffer must never be
/// rebuilt from a bare pointer. Not `Clone`, `Copy` or `Send`.
#[repr(C)]
#[derive(Debug)]
pub struct Buf {
    /// Start of the allocation, or null for "no data".
    pub ptr: *mut u8,
    /// Initialized bytes.
    pub len: usize,
    /// Allocated bytes. `len <= cap`.
    pub cap: usize,
}

impl Buf {
    /// The null buffer.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
            cap: 0,
        }
    }

    /// Hands a vector's allocation over as a buffer. Producer side.
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let mut bytes = ManuallyDrop::new(bytes);
        Self {
            ptr: bytes.as_mut_ptr(),
            len: bytes.len(),
            cap: bytes.capacity(),
        }
    }

    /// Reclaims the allocation produced by [`Buf::from_vec`].
    ///
    /// Returns `None` for the null buffer.
    ///
    /// # Safety
    /// The buffer must come from `Buf::from_vec` in the same allocator and
    /// must not have been reclaimed before.
    pub unsafe fn into_vec(self) -> Option<Vec<u8>> {
        if self.ptr.is_null() {
            return None;
        }
        Some(unsafe { Vec::from_raw_parts(self.ptr, self.len, self.cap) })
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.ptr.is_null() || self.len == 0
    }

    /// Views the initialized bytes.
    ///
    /// # Safety
    /// The buffer must still be live: produced by the engine and not yet
    /// freed.
    pub unsafe fn as_slice(&self) -> &[u8] {
        if self.is_empty() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

impl Default for Buf {
    fn default() -> Self {
        Self::empty()
    }
}
