//! Quoted spread, in price units and pips, with an empirical percentile.

use std::collections::VecDeque;

use crate::domain::Tick;

use super::{Metric, Snapshot};

/// Publishes `spread`, `spread_pips`, and `spread_percentile` (the fraction
/// of retained samples at or below the current spread; the current sample
/// is included, so the field is never NaN once a tick has arrived).
#[derive(Debug, Clone)]
pub struct SpreadMetric {
    name: String,
    pip_size: f64,
    window: f64,
    spread: f64,
    spread_pips: f64,
    percentile: f64,
    history: VecDeque<(f64, f64)>,
    key_spread: String,
    key_pips: String,
    key_percentile: String,
}

impl SpreadMetric {
    pub fn new(name: impl Into<String>, pip_size: f64, window_seconds: f64) -> Self {
        assert!(pip_size > 0.0, "pip_size must be positive, got {pip_size}");
        assert!(
            window_seconds > 0.0,
            "window_seconds must be positive, got {window_seconds}"
        );
        let name = name.into();
        Self {
            key_spread: format!("{name}.spread"),
            key_pips: format!("{name}.spread_pips"),
            key_percentile: format!("{name}.spread_percentile"),
            pip_size,
            window: window_seconds,
            spread: f64::NAN,
            spread_pips: f64::NAN,
            percentile: f64::NAN,
            history: VecDeque::new(),
            name,
        }
    }
}

impl Metric for SpreadMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, tick: &Tick) {
        let t = tick.timestamp;
        let raw = tick.spread();
        let spread_pips = raw / self.pip_size;

        self.spread = raw;
        self.spread_pips = spread_pips;

        self.history.push_back((t, spread_pips));
        let cutoff = t - self.window;
        while self.history.front().is_some_and(|(ts, _)| *ts < cutoff) {
            self.history.pop_front();
        }

        if self.history.is_empty() {
            self.percentile = f64::NAN;
            return;
        }
        let at_or_below = self
            .history
            .iter()
            .filter(|(_, pips)| *pips <= spread_pips)
            .count();
        self.percentile = at_or_below as f64 / self.history.len() as f64;
    }

    fn publish(&self, out: &mut Snapshot) {
        out.set_num(&self.key_spread, self.spread);
        out.set_num(&self.key_pips, self.spread_pips);
        out.set_num(&self.key_percentile, self.percentile);
    }
}
