//! Z-score of the mid price against its time-weighted rolling window.

use crate::domain::Tick;
use crate::primitives::TimeRollingWindow;

use super::{Metric, Snapshot, TickInterval};

/// Publishes `z_score` and `rolling_residual`.
///
/// The residual is the mid's deviation from the weighted mean; the z-score
/// divides by the weighted standard deviation, falling back to zero when
/// the deviation is within numerical noise. Both fields are NaN only while
/// the window has no finite statistics (every append skipped).
#[derive(Debug, Clone)]
pub struct ZscoreMetric {
    name: String,
    window: TimeRollingWindow,
    interval: TickInterval,
    z_score: f64,
    residual: f64,
    key_z: String,
    key_residual: String,
}

impl ZscoreMetric {
    pub fn new(name: impl Into<String>, lookback_seconds: f64) -> Self {
        let name = name.into();
        Self {
            key_z: format!("{name}.z_score"),
            key_residual: format!("{name}.rolling_residual"),
            window: TimeRollingWindow::new(lookback_seconds),
            interval: TickInterval::default(),
            z_score: f64::NAN,
            residual: f64::NAN,
            name,
        }
    }
}

impl Metric for ZscoreMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, tick: &Tick) {
        let t = tick.timestamp;
        let dt = self.interval.advance(t);
        self.window.append(t, tick.mid, dt);

        let (mean, stdev) = self.window.stats();
        if !mean.is_finite() {
            self.residual = f64::NAN;
            self.z_score = f64::NAN;
            return;
        }

        self.residual = tick.mid - mean;
        self.z_score = if stdev.is_finite() && stdev > 1e-12 {
            self.residual / stdev
        } else {
            0.0
        };
    }

    fn publish(&self, out: &mut Snapshot) {
        out.set_num(&self.key_z, self.z_score);
        out.set_num(&self.key_residual, self.residual);
    }
}
