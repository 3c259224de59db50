//! The narrow request/response boundary to the external engine.

use crate::buf::Buf;
use crate::error::NativeCallError;
use std::ffi::{CStr, c_void};
use std::ptr::NonNull;

/// Opaque token naming one live engine instance.
///
/// Never dereferenced on this side of the boundary.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawEngine(NonNull<c_void>);

// SAFETY: the token is only ever passed back to the binding that created it,
// and the engine handle serializes those calls behind a mutex.
unsafe impl Send for RawEngine {}
unsafe impl Sync for RawEngine {}

impl RawEngine {
    /// Wraps a pointer returned by the engine. `None` for null.
    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Calls exposed by the external toggle engine.
///
/// Every method returning `Ok(Buf)` transfers ownership of that buffer to the
/// caller, who must pass it to [`EngineBinding::free_buf`] exactly once.
/// `Err` means no buffer was produced.
///
/// Implementations are not assumed to be reentrant; callers must serialize
/// calls that share one [`RawEngine`].
pub trait EngineBinding: Send + Sync {
    /// Allocates a new engine instance.
    fn new_engine(&self) -> Result<RawEngine, NativeCallError>;

    /// Destroys an engine instance.
    ///
    /// # Safety
    /// `engine` must be live and must not be used afterwards.
    unsafe fn free_engine(&self, engine: RawEngine);

    /// Replaces the engine's toggle definitions with `toggles_json`.
    ///
    /// # Safety
    /// `engine` must be live.
    unsafe fn take_state(
        &self,
        engine: RawEngine,
        toggles_json: &CStr,
    ) -> Result<Buf, NativeCallError>;

    /// Returns the currently loaded state as JSON.
    ///
    /// # Safety
    /// `engine` must be live.
    unsafe fn get_state(&self, engine: RawEngine) -> Result<Buf, NativeCallError>;

    /// Evaluates an encoded context message for its toggle.
    ///
    /// # Safety
    /// `engine` must be live.
    unsafe fn check_enabled(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError>;

    /// Selects a variant for an encoded context message.
    ///
    /// # Safety
    /// `engine` must be live.
    unsafe fn check_variant(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError>;

    /// # Safety
    /// `engine` must be live.
    unsafe fn list_known_toggles(&self, engine: RawEngine) -> Result<Buf, NativeCallError>;

    /// Drains the current metrics bucket.
    ///
    /// # Safety
    /// `engine` must be live.
    unsafe fn get_metrics(&self, engine: RawEngine) -> Result<Buf, NativeCallError>;

    // Impact metrics. Each call takes one encoded request and answers with
    // an acknowledgement, except `collect_impact_metrics`.

    /// # Safety
    /// `engine` must be live.
    unsafe fn define_counter(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError>;

    /// # Safety
    /// `engine` must be live.
    unsafe fn inc_counter(&self, engine: RawEngine, message: &[u8]) -> Result<Buf, NativeCallError>;

    /// # Safety
    /// `engine` must be live.
    unsafe fn define_gauge(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError>;

    /// # Safety
    /// `engine` must be live.
    unsafe fn set_gauge(&self, engine: RawEngine, message: &[u8]) -> Result<Buf, NativeCallError>;

    /// # Safety
    /// `engine` must be live.
    unsafe fn define_histogram(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError>;

    /// # Safety
    /// `engine` must be live.
    unsafe fn observe_histogram(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError>;

    /// Drains every recorded impact metric sample.
    ///
    /// # Safety
    /// `engine` must be live.
    unsafe fn collect_impact_metrics(&self, engine: RawEngine) -> Result<Buf, NativeCallError>;

    /// Merges previously collected samples back into the engine.
    ///
    /// # Safety
    /// `engine` must be live.
    unsafe fn restore_impact_metrics(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError>;

    /// Names of the strategies the engine implements itself.
    fn built_in_strategies(&self) -> Result<Buf, NativeCallError>;

    fn core_version(&self) -> Result<Buf, NativeCallError>;

    /// Releases a buffer previously returned by this binding.
    ///
    /// # Safety
    /// `buf` must come from this binding and must not have been freed.
    unsafe fn free_buf(&self, buf: Buf);
}
