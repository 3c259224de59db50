//! The strategy capability.

use flagline_types::Context;
use std::collections::BTreeMap;
use std::fmt;

/// A named rule evaluated by the host application.
///
/// Returning `Err` (or panicking) is treated as "not enabled" for the slot
/// being evaluated; it never aborts the surrounding check.
pub trait Strategy: Send + Sync {
    /// Name matched against the strategy names declared in toggle state.
    fn name(&self) -> &str;

    fn is_enabled(
        &self,
        parameters: &BTreeMap<String, String>,
        context: &Context,
    ) -> anyhow::Result<bool>;
}

/// A [`Strategy`] backed by a closure.
pub struct FnStrategy<F> {
    name: String,
    f: F,
}

/// Wraps a closure as a named strategy.
pub fn strategy_fn<F>(name: impl Into<String>, f: F) -> FnStrategy<F>
where
    F: Fn(&BTreeMap<String, String>, &Context) -> anyhow::Result<bool> + Send + Sync,
{
    FnStrategy {
        name: name.into(),
        f,
    }
}

impl<F> Strategy for FnStrategy<F>
where
    F: Fn(&BTreeMap<String, String>, &Context) -> anyhow::Result<bool> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(
        &self,
        parameters: &BTreeMap<String, String>,
        context: &Context,
    ) -> anyhow::Result<bool> {
        (self.f)(parameters, context)
    }
}

impl<F> fmt::Debug for FnStrategy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStrategy").field("name", &self.name).finish()
    }
}
