//! Signal generator: predicates plus entry engine, one intent per tick.

use std::collections::BTreeMap;

use crate::config::{ConfigError, StrategyConfig};
use crate::domain::{Direction, Tick};
use crate::metrics::Snapshot;

use super::entries::{build_entry_engine, EntryEngine};
use super::predicate::{compile_all, eval_all, CompiledPredicate};

/// The trading intent computed for one tick.
#[derive(Debug, Clone, Default)]
pub struct SignalData {
    pub should_open: bool,
    pub direction: Option<Direction>,
    pub tp: Option<f64>,
    pub sl: Option<f64>,
    pub tp_pips: Option<f64>,
    pub sl_pips: Option<f64>,
    pub timeout_seconds: Option<f64>,
    pub reason: String,
    pub should_close: bool,
    pub close_reason: Option<String>,
    pub entry_metadata: BTreeMap<String, f64>,
}

/// Applies entry/exit predicates around the configured entry engine.
pub struct SignalGenerator {
    entry_name: String,
    exit_name: String,
    entry_predicates: Vec<CompiledPredicate>,
    exit_predicates: Vec<CompiledPredicate>,
    engine: Box<dyn EntryEngine>,
}

impl SignalGenerator {
    pub fn new(strategy: &StrategyConfig, pip_size: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            entry_name: strategy.entry.name.clone(),
            exit_name: strategy.exit.name.clone(),
            entry_predicates: compile_all(&strategy.entry.predicates)?,
            exit_predicates: compile_all(&strategy.exit.predicates)?,
            engine: build_entry_engine(&strategy.entry, pip_size)?,
        })
    }

    /// Compute the intent for this tick.
    ///
    /// The engine is always advanced so its state tracks every tick; warmup
    /// only suppresses the resulting open/close flags. An exit signal
    /// requires a non-empty exit predicate list: with no predicates
    /// configured, exits are left to TP/SL/timeout alone.
    pub fn update(&mut self, tick: &Tick, snapshot: &Snapshot, is_warmup: bool) -> SignalData {
        let entry_ok = eval_all(&self.entry_predicates, snapshot);
        let exit_ok = !self.exit_predicates.is_empty() && eval_all(&self.exit_predicates, snapshot);

        let entry = self.engine.update(tick, snapshot);

        let mut signal = SignalData {
            reason: self.entry_name.clone(),
            entry_metadata: entry.metadata,
            ..SignalData::default()
        };

        if entry.should_open && entry_ok && !is_warmup {
            signal.should_open = true;
            signal.direction = entry.direction;
            signal.tp = entry.tp;
            signal.sl = entry.sl;
            signal.tp_pips = entry.tp_pips;
            signal.sl_pips = entry.sl_pips;
            signal.timeout_seconds = entry.timeout_seconds;
            signal.reason = entry.reason;
        } else if entry.should_open && !entry_ok {
            signal.reason = "entry_predicate_blocked".into();
        } else {
            signal.reason = entry.reason;
        }

        if exit_ok && !is_warmup {
            signal.should_close = true;
            signal.close_reason = Some(self.exit_name.clone());
        }

        signal
    }

    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }
}
