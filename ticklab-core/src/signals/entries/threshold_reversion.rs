//! Entry engine wrapping the threshold-reversion metric.
//!
//! The metric holds the directional state; the engine converts state
//! *changes* into open requests, latching the last seen direction so a held
//! state never re-fires.

use std::collections::BTreeMap;

use crate::config::{ConfigError, EntryConfig, EntryParams};
use crate::domain::{Direction, Tick};
use crate::metrics::{Snapshot, ThresholdReversionMetric};

use super::{EntryEngine, EntryResult};

pub struct ThresholdReversionEngine {
    name: String,
    metric: ThresholdReversionMetric,
    threshold_pips: f64,
    tp_pips: f64,
    sl_pips: f64,
    pip_size: f64,
    trade_timeout_seconds: Option<f64>,
    last_direction: i32,
}

impl ThresholdReversionEngine {
    /// Registry constructor.
    pub fn build(
        config: &EntryConfig,
        pip_size: f64,
    ) -> Result<Box<dyn EntryEngine>, ConfigError> {
        let EntryParams::ThresholdReversion {
            lookback_seconds,
            threshold_pips,
            tp_pips,
            sl_pips,
            min_recency_seconds,
            trade_timeout_seconds,
        } = &config.params
        else {
            return Err(ConfigError::InvalidEngineParam {
                name: config.name.clone(),
                message: "expected threshold_reversion params".into(),
            });
        };

        // TP/SL pip distances default to the displacement threshold.
        let tp_pips = tp_pips.unwrap_or(*threshold_pips);
        let sl_pips = sl_pips.unwrap_or(*threshold_pips);

        let metric = ThresholdReversionMetric::new(
            &config.name,
            *lookback_seconds,
            *threshold_pips,
            pip_size,
            tp_pips,
            sl_pips,
            *min_recency_seconds,
            *trade_timeout_seconds,
        );

        Ok(Box::new(Self {
            name: config.name.clone(),
            metric,
            threshold_pips: *threshold_pips,
            tp_pips,
            sl_pips,
            pip_size,
            trade_timeout_seconds: *trade_timeout_seconds,
            last_direction: 0,
        }))
    }
}

impl EntryEngine for ThresholdReversionEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, tick: &Tick, _snapshot: &Snapshot) -> EntryResult {
        self.metric.update(tick);
        let state = self.metric.state();

        let mut metadata = BTreeMap::new();
        metadata.insert("reference_price".into(), state.reference_price);
        metadata.insert("threshold".into(), state.threshold);
        metadata.insert("threshold_pips".into(), self.threshold_pips);
        metadata.insert("tp_price".into(), state.tp_price);
        metadata.insert("sl_price".into(), state.sl_price);
        metadata.insert("reference_age_seconds".into(), state.reference_age_seconds);
        metadata.insert(
            "position_open_age_seconds".into(),
            state.position_open_age_seconds,
        );
        metadata.insert("trade_timeout_seconds".into(), state.trade_timeout_seconds);

        if state.direction == 0 {
            self.last_direction = 0;
            return EntryResult {
                reason: self.name.clone(),
                metadata,
                ..EntryResult::default()
            };
        }

        if self.last_direction == state.direction {
            // Held state: already requested this open.
            return EntryResult {
                reason: self.name.clone(),
                metadata,
                ..EntryResult::default()
            };
        }
        self.last_direction = state.direction;

        let direction = if state.direction > 0 {
            Direction::Long
        } else {
            Direction::Short
        };

        // Prefer the metric's levels; the loop falls back to pip distances
        // off its fill price when they are not finite.
        let tp = state.tp_price.is_finite().then_some(state.tp_price);
        let sl = state.sl_price.is_finite().then_some(state.sl_price);

        metadata.insert("direction".into(), state.direction as f64);
        metadata.insert("signal_price".into(), tick.mid);

        EntryResult {
            should_open: true,
            direction: Some(direction),
            tp,
            sl,
            tp_pips: Some(self.tp_pips),
            sl_pips: Some(self.sl_pips),
            timeout_seconds: self.trade_timeout_seconds,
            reason: self.name.clone(),
            metadata,
        }
    }
}
