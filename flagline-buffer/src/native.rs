//! C ABI rendition of [`EngineBinding`].
//!
//! The engine library exports plain `extern "C"` functions. Whoever loads the
//! library resolves them into a [`NativeSymbols`] table; this module turns the
//! status out-parameter convention into `Result`s.

use crate::binding::{EngineBinding, RawEngine};
use crate::buf::Buf;
use crate::error::NativeCallError;
use std::ffi::{CStr, c_char, c_void};
use tracing::warn;

/// Out-parameter written by every fallible native call.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallStatus {
    pub code: i32,
}

impl CallStatus {
    pub const OK: i32 = 0;
    pub const INVALID_INPUT: i32 = 1;
    pub const PANIC: i32 = 2;
    pub const NULL_ENGINE: i32 = 3;

    pub fn is_ok(&self) -> bool {
        self.code == Self::OK
    }

    pub fn describe(code: i32) -> &'static str {
        match code {
            Self::OK => "ok",
            Self::INVALID_INPUT => "engine rejected the input",
            Self::PANIC => "engine panicked while processing the request",
            Self::NULL_ENGINE => "engine pointer was null",
            _ => "unrecognized engine status",
        }
    }
}

type EnginePtr = *mut c_void;

/// Signature shared by every call that takes one encoded request.
pub type MessageCall = unsafe extern "C" fn(EnginePtr, *const u8, usize, *mut CallStatus) -> Buf;

/// Resolved entry points of the engine library.
#[derive(Clone, Copy)]
pub struct NativeSymbols {
    pub new_engine: unsafe extern "C" fn() -> EnginePtr,
    pub free_engine: unsafe extern "C" fn(EnginePtr),
    pub take_state: unsafe extern "C" fn(EnginePtr, *const c_char, *mut CallStatus) -> Buf,
    pub get_state: unsafe extern "C" fn(EnginePtr, *mut CallStatus) -> Buf,
    pub check_enabled: MessageCall,
    pub check_variant: MessageCall,
    pub list_known_toggles: unsafe extern "C" fn(EnginePtr, *mut CallStatus) -> Buf,
    pub get_metrics: unsafe extern "C" fn(EnginePtr, *mut CallStatus) -> Buf,
    pub define_counter: MessageCall,
    pub inc_counter: MessageCall,
    pub define_gauge: MessageCall,
    pub set_gauge: MessageCall,
    pub define_histogram: MessageCall,
    pub observe_histogram: MessageCall,
    pub collect_impact_metrics: unsafe extern "C" fn(EnginePtr, *mut CallStatus) -> Buf,
    pub restore_impact_metrics: MessageCall,
    pub built_in_strategies: unsafe extern "C" fn(*mut CallStatus) -> Buf,
    pub core_version: unsafe extern "C" fn(*mut CallStatus) -> Buf,
    pub buf_free: unsafe extern "C" fn(Buf),
}

impl NativeSymbols {
    /// Converts a status/buffer pair into a `Result`.
    fn finish(
        &self,
        operation: &'static str,
        status: CallStatus,
        buf: Buf,
    ) -> Result<Buf, NativeCallError> {
        if status.is_ok() {
            return Ok(buf);
        }
        // A failed call owns no buffer; anything returned anyway goes straight back.
        if !buf.is_null() {
            warn!(operation, "native call failed but returned a buffer, releasing it");
            unsafe { (self.buf_free)(buf) };
        }
        Err(NativeCallError::new(
            operation,
            status.code,
            CallStatus::describe(status.code),
        ))
    }

    /// # Safety
    /// `engine` must be live and `call` must be one of this table's entries.
    unsafe fn send(
        &self,
        operation: &'static str,
        call: MessageCall,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        let mut status = CallStatus::default();
        let buf = unsafe { call(engine.as_ptr(), message.as_ptr(), message.len(), &mut status) };
        self.finish(operation, status, buf)
    }
}

impl EngineBinding for NativeSymbols {
    fn new_engine(&self) -> Result<RawEngine, NativeCallError> {
        let ptr = unsafe { (self.new_engine)() };
        RawEngine::from_ptr(ptr).ok_or_else(|| {
            NativeCallError::new(
                "new_engine",
                CallStatus::NULL_ENGINE,
                "engine allocation returned null",
            )
        })
    }

    unsafe fn free_engine(&self, engine: RawEngine) {
        unsafe { (self.free_engine)(engine.as_ptr()) }
    }

    unsafe fn take_state(
        &self,
        engine: RawEngine,
        toggles_json: &CStr,
    ) -> Result<Buf, NativeCallError> {
        let mut status = CallStatus::default();
        let buf = unsafe { (self.take_state)(engine.as_ptr(), toggles_json.as_ptr(), &mut status) };
        self.finish("take_state", status, buf)
    }

    unsafe fn get_state(&self, engine: RawEngine) -> Result<Buf, NativeCallError> {
        let mut status = CallStatus::default();
        let buf = unsafe { (self.get_state)(engine.as_ptr(), &mut status) };
        self.finish("get_state", status, buf)
    }

    unsafe fn check_enabled(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        unsafe { self.send("check_enabled", self.check_enabled, engine, message) }
    }

    unsafe fn check_variant(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        unsafe { self.send("check_variant", self.check_variant, engine, message) }
    }

    unsafe fn list_known_toggles(&self, engine: RawEngine) -> Result<Buf, NativeCallError> {
        let mut status = CallStatus::default();
        let buf = unsafe { (self.list_known_toggles)(engine.as_ptr(), &mut status) };
        self.finish("list_known_toggles", status, buf)
    }

    unsafe fn get_metrics(&self, engine: RawEngine) -> Result<Buf, NativeCallError> {
        let mut status = CallStatus::default();
        let buf = unsafe { (self.get_metrics)(engine.as_ptr(), &mut status) };
        self.finish("get_metrics", status, buf)
    }

    unsafe fn define_counter(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        unsafe { self.send("define_counter", self.define_counter, engine, message) }
    }

    unsafe fn inc_counter(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        unsafe { self.send("inc_counter", self.inc_counter, engine, message) }
    }

    unsafe fn define_gauge(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        unsafe { self.send("define_gauge", self.define_gauge, engine, message) }
    }

    unsafe fn set_gauge(&self, engine: RawEngine, message: &[u8]) -> Result<Buf, NativeCallError> {
        unsafe { self.send("set_gauge", self.set_gauge, engine, message) }
    }

    unsafe fn define_histogram(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        unsafe { self.send("define_histogram", self.define_histogram, engine, message) }
    }

    unsafe fn observe_histogram(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        unsafe { self.send("observe_histogram", self.observe_histogram, engine, message) }
    }

    unsafe fn collect_impact_metrics(&self, engine: RawEngine) -> Result<Buf, NativeCallError> {
        let mut status = CallStatus::default();
        let buf = unsafe { (self.collect_impact_metrics)(engine.as_ptr(), &mut status) };
        self.finish("collect_impact_metrics", status, buf)
    }

    unsafe fn restore_impact_metrics(
        &self,
        engine: RawEngine,
        message: &[u8],
    ) -> Result<Buf, NativeCallError> {
        unsafe { self.send("restore_impact_metrics", self.restore_impact_metrics, engine, message) }
    }

    fn built_in_strategies(&self) -> Result<Buf, NativeCallError> {
        let mut status = CallStatus::default();
        let buf = unsafe { (self.built_in_strategies)(&mut status) };
        self.finish("built_in_strategies", status, buf)
    }

    fn core_version(&self) -> Result<Buf, NativeCallError> {
        let mut status = CallStatus::default();
        let buf = unsafe { (self.core_version)(&mut status) };
        self.finish("core_version", status, buf)
    }

    unsafe fn free_buf(&self, buf: Buf) {
        unsafe { (self.buf_free)(buf) }
    }
}
