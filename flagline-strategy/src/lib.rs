//! Custom strategies supplied by the host application.
//!
//! The engine evaluates its own built-in strategies. Everything else a toggle
//! declares is routed here: the [`StrategyEvaluator`] maps each declared
//! custom strategy onto a numbered result slot (`customStrategy1`,
//! `customStrategy2`, ...) when state is loaded, then evaluates those slots
//! locally for every check and hands the booleans back to the engine.
//!
//! A strategy that fails or panics yields `false` for its own slot only.

mod evaluator;
mod registry;
mod snapshot;
mod strategy;

pub use evaluator::{StrategyEvaluator, StrategyOutcome};
pub use registry::{ResolvedStrategy, StrategyRegistry};
pub use snapshot::{MappedStrategy, SLOT_PREFIX, Snapshot};
pub use strategy::{FnStrategy, Strategy, strategy_fn};
