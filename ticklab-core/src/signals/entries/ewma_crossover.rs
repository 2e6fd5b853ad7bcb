//! Fast/slow EWMA crossover entry engine.
//!
//! Watches the sign of `fast - slow` between consecutive ticks. A flip from
//! negative to non-negative fires long (if enabled); positive to
//! non-positive fires short. The first finite observation only seeds the
//! state, and any non-finite input resets it.

use std::collections::BTreeMap;

use crate::config::{ConfigError, EntryConfig, EntryParams};
use crate::domain::{Direction, Tick};
use crate::metrics::Snapshot;

use super::{EntryEngine, EntryResult};

pub struct EwmaCrossoverEngine {
    name: String,
    fast_key: String,
    slow_key: String,
    long_on_cross: bool,
    short_on_cross: bool,
    tp_pips: f64,
    sl_pips: f64,
    pip_size: f64,
    trade_timeout_seconds: Option<f64>,
    last_diff: Option<f64>,
}

impl EwmaCrossoverEngine {
    /// Registry constructor.
    pub fn build(
        config: &EntryConfig,
        pip_size: f64,
    ) -> Result<Box<dyn EntryEngine>, ConfigError> {
        let EntryParams::EwmaCrossover {
            fast_metric,
            slow_metric,
            long_on_cross,
            short_on_cross,
            tp_pips,
            sl_pips,
            trade_timeout_seconds,
        } = &config.params
        else {
            return Err(ConfigError::InvalidEngineParam {
                name: config.name.clone(),
                message: "expected ewma_crossover params".into(),
            });
        };
        Ok(Box::new(Self {
            name: config.name.clone(),
            fast_key: fast_metric.clone(),
            slow_key: slow_metric.clone(),
            long_on_cross: *long_on_cross,
            short_on_cross: *short_on_cross,
            tp_pips: *tp_pips,
            sl_pips: *sl_pips,
            pip_size,
            trade_timeout_seconds: *trade_timeout_seconds,
            last_diff: None,
        }))
    }
}

impl EntryEngine for EwmaCrossoverEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, tick: &Tick, snapshot: &Snapshot) -> EntryResult {
        let fast = snapshot.num(&self.fast_key);
        let slow = snapshot.num(&self.slow_key);

        let mut metadata = BTreeMap::new();
        metadata.insert("fast".into(), fast);
        metadata.insert("slow".into(), slow);

        if !(fast.is_finite() && slow.is_finite()) {
            self.last_diff = None;
            return EntryResult {
                reason: self.name.clone(),
                metadata,
                ..EntryResult::default()
            };
        }

        let diff = fast - slow;
        metadata.insert("diff".into(), diff);

        let Some(last_diff) = self.last_diff else {
            self.last_diff = Some(diff);
            return EntryResult {
                reason: self.name.clone(),
                metadata,
                ..EntryResult::default()
            };
        };

        let mut direction = None;
        if self.long_on_cross && diff >= 0.0 && last_diff < 0.0 {
            direction = Some(Direction::Long);
        } else if self.short_on_cross && diff <= 0.0 && last_diff > 0.0 {
            direction = Some(Direction::Short);
        }
        self.last_diff = Some(diff);

        let Some(direction) = direction else {
            return EntryResult {
                reason: self.name.clone(),
                metadata,
                ..EntryResult::default()
            };
        };

        // Zero pip distances mean "no automatic exit on that side".
        let price = tick.mid;
        let tp = (self.tp_pips > 0.0).then(|| {
            let offset = self.tp_pips * self.pip_size;
            price + direction.signum() * offset
        });
        let sl = (self.sl_pips > 0.0).then(|| {
            let offset = self.sl_pips * self.pip_size;
            price - direction.signum() * offset
        });

        metadata.insert("direction".into(), direction.signum());
        metadata.insert("signal_price".into(), price);

        EntryResult {
            should_open: true,
            direction: Some(direction),
            tp,
            sl,
            tp_pips: (self.tp_pips > 0.0).then_some(self.tp_pips),
            sl_pips: (self.sl_pips > 0.0).then_some(self.sl_pips),
            timeout_seconds: self.trade_timeout_seconds,
            reason: self.name.clone(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(long_on_cross: bool, short_on_cross: bool, tp_pips: f64, sl_pips: f64) -> Box<dyn EntryEngine> {
        let config = EntryConfig {
            name: "xover".into(),
            params: EntryParams::EwmaCrossover {
                fast_metric: "fewma.ewma".into(),
                slow_metric: "sewma.ewma".into(),
                long_on_cross,
                short_on_cross,
                tp_pips,
                sl_pips,
                trade_timeout_seconds: None,
            },
            predicates: vec![],
        };
        EwmaCrossoverEngine::build(&config, 0.0001).unwrap()
    }

    fn snapshot(fast: f64, slow: f64) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.set_num("fewma.ewma", fast);
        snapshot.set_num("sewma.ewma", slow);
        snapshot
    }

    fn tick(t: f64) -> Tick {
        Tick::new(t, 1.2000, 1.2000)
    }

    #[test]
    fn fires_long_on_negative_to_positive_cross() {
        let mut engine = engine(true, false, 10.0, 20.0);
        // diff sequence: -, -, +, +
        assert!(!engine.update(&tick(0.0), &snapshot(1.0, 1.1)).should_open); // seeds
        assert!(!engine.update(&tick(1.0), &snapshot(1.0, 1.05)).should_open);
        let fired = engine.update(&tick(2.0), &snapshot(1.1, 1.0));
        assert!(fired.should_open);
        assert_eq!(fired.direction, Some(Direction::Long));
        assert!((fired.tp.unwrap() - 1.2010).abs() < 1e-9);
        assert!((fired.sl.unwrap() - 1.1980).abs() < 1e-9);
        assert!(!engine.update(&tick(3.0), &snapshot(1.2, 1.0)).should_open);
    }

    #[test]
    fn short_cross_requires_flag() {
        let mut engine = engine(true, false, 0.0, 0.0);
        engine.update(&tick(0.0), &snapshot(1.1, 1.0));
        let result = engine.update(&tick(1.0), &snapshot(1.0, 1.1));
        assert!(!result.should_open);

        let mut engine = engine_with_short();
        engine.update(&tick(0.0), &snapshot(1.1, 1.0));
        let result = engine.update(&tick(1.0), &snapshot(1.0, 1.1));
        assert!(result.should_open);
        assert_eq!(result.direction, Some(Direction::Short));
        // Zero pip distances leave both exit levels unset.
        assert!(result.tp.is_none());
        assert!(result.sl.is_none());
    }

    fn engine_with_short() -> Box<dyn EntryEngine> {
        engine(false, true, 0.0, 0.0)
    }

    #[test]
    fn non_finite_input_reseeds() {
        let mut engine = engine(true, false, 0.0, 0.0);
        engine.update(&tick(0.0), &snapshot(1.0, 1.1)); // diff < 0
        engine.update(&tick(1.0), &snapshot(f64::NAN, 1.1)); // resets
        // Without a prior finite diff, a positive diff only seeds.
        let result = engine.update(&tick(2.0), &snapshot(1.2, 1.1));
        assert!(!result.should_open);
    }

    #[test]
    fn missing_keys_never_fire() {
        let mut engine = engine(true, false, 0.0, 0.0);
        for i in 0..5 {
            let result = engine.update(&tick(i as f64), &Snapshot::new());
            assert!(!result.should_open);
        }
    }
}
