//! Lifetime of one native engine instance.

use crate::error::{EngineError, Result};
use flagline_buffer::{Buf, EngineBinding, NativeCallError, OwnedBuf, RawEngine};
use flagline_codec::messages::{
    AckResponse, BuiltInStrategies, CoreVersion, EnabledResponse, EngineState, FeatureDefs,
    ImpactMetrics, MetricsResponse, TakeStateResponse, VariantResponse,
};
use flagline_codec::{WireMessage, read_optional_message};
use std::ffi::CString;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

type NativeResult = std::result::Result<Buf, NativeCallError>;

#[derive(Debug, Clone, Copy)]
enum HandleState {
    Live(RawEngine),
    Released,
}

/// Owns one engine instance and serializes every call into it.
///
/// The instance is destroyed exactly once: by [`release`](Self::release) or,
/// failing that, on drop. Calls after release return
/// [`EngineError::Released`], except the two that need no instance.
///
/// An empty response buffer means the engine had nothing to report; it
/// decodes to the response's default value.
pub struct EngineHandle {
    binding: Arc<dyn EngineBinding>,
    state: Mutex<HandleState>,
}

impl EngineHandle {
    /// Creates a live engine instance.
    pub fn new(binding: Arc<dyn EngineBinding>) -> Result<Self> {
        let engine = binding.new_engine()?;
        debug!("engine instance created");
        Ok(Self {
            binding,
            state: Mutex::new(HandleState::Live(engine)),
        })
    }

    pub fn is_live(&self) -> bool {
        matches!(*self.lock(), HandleState::Live(_))
    }

    /// Destroys the engine instance. Later calls are no-ops.
    pub fn release(&self) {
        let mut state = self.lock();
        if let HandleState::Live(engine) = std::mem::replace(&mut *state, HandleState::Released) {
            // SAFETY: the state was Live, and it is now Released, so no
            // further call can reach this engine.
            unsafe { self.binding.free_engine(engine) };
            debug!("engine instance released");
        }
    }

    // ================================================================
    // State
    // ================================================================

    /// Replaces the engine's toggle definitions.
    ///
    /// If the engine rejects the state, its previous state stays in effect
    /// and the rejection is returned as [`EngineError::InvalidInput`].
    pub fn take_state(&self, toggles_json: &str) -> Result<TakeStateResponse> {
        let json = CString::new(toggles_json)
            .map_err(|e| EngineError::InvalidInput(format!("toggle state contains NUL: {e}")))?;
        let response: TakeStateResponse =
            self.call(|binding, engine| unsafe { binding.take_state(engine, &json) })?;
        if let Some(error) = response.error {
            return Err(EngineError::InvalidInput(error));
        }
        Ok(response)
    }

    pub fn get_state(&self) -> Result<EngineState> {
        self.call(|binding, engine| unsafe { binding.get_state(engine) })
    }

    // ================================================================
    // Evaluation
    // ================================================================

    pub fn check_enabled(&self, context_message: &[u8]) -> Result<EnabledResponse> {
        self.call(|binding, engine| unsafe { binding.check_enabled(engine, context_message) })
    }

    pub fn check_variant(&self, context_message: &[u8]) -> Result<VariantResponse> {
        self.call(|binding, engine| unsafe { binding.check_variant(engine, context_message) })
    }

    // ================================================================
    // Introspection
    // ================================================================

    pub fn list_known_toggles(&self) -> Result<FeatureDefs> {
        self.call(|binding, engine| unsafe { binding.list_known_toggles(engine) })
    }

    pub fn get_metrics(&self) -> Result<MetricsResponse> {
        self.call(|binding, engine| unsafe { binding.get_metrics(engine) })
    }

    /// Answered by the engine library itself, so it works after release.
    pub fn built_in_strategies(&self) -> Result<BuiltInStrategies> {
        let binding = self.binding.as_ref();
        decode(binding, binding.built_in_strategies()?)
    }

    /// Answered by the engine library itself, so it works after release.
    pub fn core_version(&self) -> Result<CoreVersion> {
        let binding = self.binding.as_ref();
        decode(binding, binding.core_version()?)
    }

    // ================================================================
    // Impact metrics
    // ================================================================

    pub fn define_counter(&self, message: &[u8]) -> Result<()> {
        self.acknowledged(|binding, engine| unsafe { binding.define_counter(engine, message) })
    }

    pub fn inc_counter(&self, message: &[u8]) -> Result<()> {
        self.acknowledged(|binding, engine| unsafe { binding.inc_counter(engine, message) })
    }

    pub fn define_gauge(&self, message: &[u8]) -> Result<()> {
        self.acknowledged(|binding, engine| unsafe { binding.define_gauge(engine, message) })
    }

    pub fn set_gauge(&self, message: &[u8]) -> Result<()> {
        self.acknowledged(|binding, engine| unsafe { binding.set_gauge(engine, message) })
    }

    pub fn define_histogram(&self, message: &[u8]) -> Result<()> {
        self.acknowledged(|binding, engine| unsafe { binding.define_histogram(engine, message) })
    }

    pub fn observe_histogram(&self, message: &[u8]) -> Result<()> {
        self.acknowledged(|binding, engine| unsafe { binding.observe_histogram(engine, message) })
    }

    pub fn collect_impact_metrics(&self) -> Result<ImpactMetrics> {
        self.call(|binding, engine| unsafe { binding.collect_impact_metrics(engine) })
    }

    pub fn restore_impact_metrics(&self, message: &[u8]) -> Result<()> {
        self.acknowledged(|binding, engine| unsafe {
            binding.restore_impact_metrics(engine, message)
        })
    }

    /// Runs one native call under the handle lock and decodes its response.
    ///
    /// `op` receives a live engine; the returned buffer is released before
    /// this returns, whether or not it decodes.
    fn call<M: WireMessage + Default>(
        &self,
        op: impl FnOnce(&dyn EngineBinding, RawEngine) -> NativeResult,
    ) -> Result<M> {
        let state = self.lock();
        let HandleState::Live(engine) = *state else {
            return Err(EngineError::Released);
        };
        let binding = self.binding.as_ref();
        decode(binding, op(binding, engine)?)
    }

    /// A call whose only answer is an optional engine-reported error.
    fn acknowledged(
        &self,
        op: impl FnOnce(&dyn EngineBinding, RawEngine) -> NativeResult,
    ) -> Result<()> {
        let ack: AckResponse = self.call(op)?;
        match ack.error {
            Some(error) => Err(EngineError::InvalidInput(error)),
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HandleState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

fn decode<M: WireMessage + Default>(binding: &dyn EngineBinding, buf: Buf) -> Result<M> {
    // SAFETY: `buf` was just returned by `binding` and nothing else holds it.
    let owned = unsafe { OwnedBuf::new(buf, binding) };
    match read_optional_message(owned)? {
        Some(message) => Ok(message),
        None => {
            debug!(response = M::NAME, "engine returned no data");
            Ok(M::default())
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("live", &self.is_live())
            .finish()
    }
}
