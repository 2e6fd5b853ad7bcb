//! Drift of the mid price against its rolling mean, plus its sign.

use crate::domain::Tick;
use crate::primitives::TimeRollingWindow;

use super::{Metric, Snapshot, TickInterval};

/// Publishes `drift = (mid - mean) / lookback` and `drift_sign` in
/// {-1, 0, +1}. A NaN mean yields NaN drift with sign 0.
#[derive(Debug, Clone)]
pub struct DriftSignMetric {
    name: String,
    lookback: f64,
    window: TimeRollingWindow,
    interval: TickInterval,
    drift: f64,
    sign: f64,
    key_drift: String,
    key_sign: String,
}

impl DriftSignMetric {
    pub fn new(name: impl Into<String>, lookback_seconds: f64) -> Self {
        let name = name.into();
        Self {
            key_drift: format!("{name}.drift"),
            key_sign: format!("{name}.drift_sign"),
            window: TimeRollingWindow::new(lookback_seconds),
            interval: TickInterval::default(),
            lookback: lookback_seconds,
            drift: f64::NAN,
            sign: 0.0,
            name,
        }
    }
}

impl Metric for DriftSignMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, tick: &Tick) {
        let t = tick.timestamp;
        let dt = self.interval.advance(t);
        self.window.append(t, tick.mid, dt);

        let (mean, _) = self.window.stats();
        if !mean.is_finite() {
            self.drift = f64::NAN;
            self.sign = 0.0;
            return;
        }

        self.drift = (tick.mid - mean) / self.lookback;
        self.sign = if self.drift > 0.0 {
            1.0
        } else if self.drift < 0.0 {
            -1.0
        } else {
            0.0
        };
    }

    fn publish(&self, out: &mut Snapshot) {
        out.set_num(&self.key_drift, self.drift);
        out.set_num(&self.key_sign, self.sign);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(t: f64, mid: f64) -> Tick {
        Tick::new(t, mid, mid)
    }

    fn values(m: &DriftSignMetric) -> (f64, f64) {
        let mut snapshot = Snapshot::new();
        m.publish(&mut snapshot);
        (snapshot.num("d.drift"), snapshot.num("d.drift_sign"))
    }

    #[test]
    fn single_tick_is_neutral() {
        let mut metric = DriftSignMetric::new("d", 60.0);
        metric.update(&tick(0.0, 1.0001));
        let (drift, sign) = values(&metric);
        assert!(drift.abs() < 1e-9);
        assert_eq!(sign, 0.0);
    }

    #[test]
    fn sign_follows_deviation_from_mean() {
        let mut metric = DriftSignMetric::new("d", 120.0);
        for (i, mid) in [1.0001, 1.0011, 1.0021].iter().enumerate() {
            metric.update(&tick(i as f64, *mid));
        }
        let (_, sign) = values(&metric);
        assert_eq!(sign, 1.0);

        metric.update(&tick(3.0, 0.9991));
        let (_, sign) = values(&metric);
        assert_eq!(sign, -1.0);
    }

    #[test]
    fn drift_magnitude_scales_by_lookback() {
        let mut metric = DriftSignMetric::new("d", 100.0);
        metric.update(&tick(0.0, 1.0));
        metric.update(&tick(1.0, 2.0));
        // The first sample carries infinitesimal weight, so the weighted
        // mean sits just under the current mid: tiny positive drift.
        let (drift, _) = values(&metric);
        assert!(drift >= 0.0 && drift < 0.01);
    }
}
