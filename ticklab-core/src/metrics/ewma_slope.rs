//! EWMA slope: smoothed price plus its rate of change over a short window.

use std::collections::VecDeque;

use crate::config::PriceField;
use crate::domain::Tick;

use super::ewma::EwmaMetric;
use super::{Metric, Snapshot};

const MIN_DT: f64 = 1e-6;

/// Publishes the inner EWMA and the slope between the newest and oldest
/// retained (timestamp, ewma) samples. Slope is NaN until two samples span
/// the window.
#[derive(Debug, Clone)]
pub struct EwmaSlopeMetric {
    name: String,
    window: f64,
    inner: EwmaMetric,
    history: VecDeque<(f64, f64)>,
    slope: f64,
    key_ewma: String,
    key_slope: String,
}

impl EwmaSlopeMetric {
    pub fn new(
        name: impl Into<String>,
        tau_seconds: f64,
        window_seconds: f64,
        initial_value: Option<f64>,
        price_field: PriceField,
    ) -> Self {
        assert!(
            window_seconds > 0.0,
            "window_seconds must be positive, got {window_seconds}"
        );
        let name = name.into();
        Self {
            key_ewma: format!("{name}.ewma"),
            key_slope: format!("{name}.slope"),
            inner: EwmaMetric::new(format!("{name}_inner"), tau_seconds, initial_value, price_field),
            window: window_seconds,
            history: VecDeque::new(),
            slope: f64::NAN,
            name,
        }
    }
}

impl Metric for EwmaSlopeMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, tick: &Tick) {
        let t = tick.timestamp;
        self.inner.update(tick);
        let current = self.inner.current();

        self.history.push_back((t, current));
        let cutoff = t - self.window;
        // Always keep at least one sample so the slope base never vanishes.
        while self.history.len() > 1 && self.history.front().is_some_and(|(ts, _)| *ts < cutoff) {
            self.history.pop_front();
        }

        if self.history.len() < 2 {
            self.slope = f64::NAN;
            return;
        }

        let (oldest_t, oldest_v) = *self.history.front().expect("len checked");
        let dt = (t - oldest_t).max(MIN_DT);
        self.slope = (current - oldest_v) / dt;
    }

    fn publish(&self, out: &mut Snapshot) {
        out.set_num(&self.key_ewma, self.inner.current());
        out.set_num(&self.key_slope, self.slope);
    }
}
