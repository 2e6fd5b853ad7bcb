//! Signal layer: predicates, entry engines, and the generator that
//! combines them into a per-tick trading intent.

pub mod entries;
mod generator;
mod predicate;

pub use generator::{SignalData, SignalGenerator};
pub use predicate::{compile_all, eval_all, CompiledPredicate};
