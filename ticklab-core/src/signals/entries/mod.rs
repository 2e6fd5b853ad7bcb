//! Entry engines and their registry.
//!
//! An entry engine inspects the tick and snapshot each tick and may request
//! a position open with direction and optional TP/SL levels. Engines are
//! advanced every tick, position open or not, so their internal state never
//! misses an observation.

mod ewma_crossover;
mod stub;
mod threshold_reversion;

pub use ewma_crossover::EwmaCrossoverEngine;
pub use stub::StubEngine;
pub use threshold_reversion::ThresholdReversionEngine;

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use crate::config::{ConfigError, EntryConfig};
use crate::domain::{Direction, Tick};
use crate::metrics::Snapshot;

/// Decision produced by an entry engine for one tick.
#[derive(Debug, Clone, Default)]
pub struct EntryResult {
    pub should_open: bool,
    pub direction: Option<Direction>,
    /// Take-profit level; adopted by the loop when finite.
    pub tp: Option<f64>,
    /// Stop-loss level; adopted by the loop when finite.
    pub sl: Option<f64>,
    /// Pip distance fallback when no TP level was supplied.
    pub tp_pips: Option<f64>,
    /// Pip distance fallback when no SL level was supplied.
    pub sl_pips: Option<f64>,
    pub timeout_seconds: Option<f64>,
    pub reason: String,
    /// Context attached to the eventual trade record.
    pub metadata: BTreeMap<String, f64>,
}

/// Pluggable entry logic.
pub trait EntryEngine: Send {
    fn name(&self) -> &str;

    /// Advance internal state with this tick and report the entry decision.
    fn update(&mut self, tick: &Tick, snapshot: &Snapshot) -> EntryResult;
}

type EngineCtor = fn(&EntryConfig, f64) -> Result<Box<dyn EntryEngine>, ConfigError>;

static ENTRY_ENGINE_REGISTRY: LazyLock<HashMap<&'static str, EngineCtor>> = LazyLock::new(|| {
    let mut registry: HashMap<&'static str, EngineCtor> = HashMap::new();
    registry.insert("threshold_reversion", ThresholdReversionEngine::build);
    registry.insert("ewma_crossover", EwmaCrossoverEngine::build);
    registry.insert("stub", StubEngine::build);
    registry
});

/// Construct an entry engine from its validated config.
pub fn build_entry_engine(
    config: &EntryConfig,
    pip_size: f64,
) -> Result<Box<dyn EntryEngine>, ConfigError> {
    config.validate()?;
    let id = config.params.engine_id();
    let ctor = ENTRY_ENGINE_REGISTRY
        .get(id)
        .ok_or_else(|| ConfigError::UnknownEngine(id.to_string()))?;
    ctor(config, pip_size)
}
