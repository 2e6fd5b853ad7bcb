//! Tick arrival rate over a rolling window.

use std::collections::VecDeque;

use crate::domain::Tick;

use super::{Metric, Snapshot};

/// Publishes `tick_count`, `tick_rate_per_sec`, and `tick_rate_per_min`.
/// Rates divide by the configured window length, not the observed span.
#[derive(Debug, Clone)]
pub struct TickRateMetric {
    name: String,
    window: f64,
    timestamps: VecDeque<f64>,
    key_count: String,
    key_per_sec: String,
    key_per_min: String,
}

impl TickRateMetric {
    pub fn new(name: impl Into<String>, window_seconds: f64) -> Self {
        assert!(
            window_seconds > 0.0,
            "window_seconds must be positive, got {window_seconds}"
        );
        let name = name.into();
        Self {
            key_count: format!("{name}.tick_count"),
            key_per_sec: format!("{name}.tick_rate_per_sec"),
            key_per_min: format!("{name}.tick_rate_per_min"),
            window: window_seconds,
            timestamps: VecDeque::new(),
            name,
        }
    }
}

impl Metric for TickRateMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, tick: &Tick) {
        let t = tick.timestamp;
        self.timestamps.push_back(t);
        let cutoff = t - self.window;
        while self.timestamps.front().is_some_and(|ts| *ts <= cutoff) {
            self.timestamps.pop_front();
        }
    }

    fn publish(&self, out: &mut Snapshot) {
        let count = self.timestamps.len() as f64;
        let per_sec = count / self.window;
        out.set_num(&self.key_count, count);
        out.set_num(&self.key_per_sec, per_sec);
        out.set_num(&self.key_per_min, per_sec * 60.0);
    }
}
