//! No-op entry engine for stubs and tests.

use crate::config::{ConfigError, EntryConfig, EntryParams};
use crate::domain::Tick;
use crate::metrics::Snapshot;

use super::{EntryEngine, EntryResult};

pub struct StubEngine {
    name: String,
}

impl StubEngine {
    /// Registry constructor.
    pub fn build(config: &EntryConfig, _pip_size: f64) -> Result<Box<dyn EntryEngine>, ConfigError> {
        let EntryParams::Stub = &config.params else {
            return Err(ConfigError::InvalidEngineParam {
                name: config.name.clone(),
                message: "expected stub params".into(),
            });
        };
        Ok(Box::new(Self {
            name: config.name.clone(),
        }))
    }
}

impl EntryEngine for StubEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, _tick: &Tick, _snapshot: &Snapshot) -> EntryResult {
        EntryResult {
            reason: self.name.clone(),
            ..EntryResult::default()
        }
    }
}
