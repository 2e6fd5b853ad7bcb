//! EWMA volatility with a rolling percentile rank.
//!
//! Log returns feed a power-2 EWMA (a variance estimate). Each variance
//! observation is also written into a time-weighted histogram whose edges
//! span `[0, (stddev_cap * base_vol)^2]`, so `vol_percentile` reports where
//! the current variance sits inside its own recent distribution.

use crate::domain::Tick;
use crate::primitives::{Ewma, EwmaPower, TimeWeightedHistogram};

use super::{Metric, Snapshot};

const MIN_DT: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct EwmaVolMetric {
    name: String,
    smoother: Ewma,
    histogram: TimeWeightedHistogram,
    prev: Option<(f64, f64)>, // (timestamp, mid)
    vol_ewma: f64,
    vol_percentile: f64,
    key_ewma: String,
    key_percentile: String,
}

impl EwmaVolMetric {
    pub fn new(
        name: impl Into<String>,
        tau_seconds: f64,
        percentile_horizon_seconds: f64,
        bins: usize,
        base_vol: f64,
        stddev_cap: f64,
    ) -> Self {
        assert!(bins >= 2, "bins must be >= 2, got {bins}");
        assert!(base_vol > 0.0, "base_vol must be positive, got {base_vol}");
        assert!(stddev_cap > 0.0, "stddev_cap must be positive, got {stddev_cap}");

        let var_max = (stddev_cap * base_vol).powi(2);
        let edges: Vec<f64> = (0..=bins).map(|i| var_max * i as f64 / bins as f64).collect();

        let name = name.into();
        Self {
            key_ewma: format!("{name}.vol_ewma"),
            key_percentile: format!("{name}.vol_percentile"),
            smoother: Ewma::new(tau_seconds, EwmaPower::MeanSquare),
            histogram: TimeWeightedHistogram::new(edges, percentile_horizon_seconds),
            prev: None,
            vol_ewma: 0.0,
            vol_percentile: f64::NAN,
            name,
        }
    }
}

impl Metric for EwmaVolMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, tick: &Tick) {
        let t = tick.timestamp;
        let mid = tick.mid;

        let Some((prev_t, prev_mid)) = self.prev else {
            // First tick only seeds the return base.
            self.prev = Some((t, mid));
            return;
        };

        let dt = (t - prev_t).max(MIN_DT);
        let log_return = if mid > 0.0 && prev_mid > 0.0 {
            (mid / prev_mid).ln()
        } else {
            0.0
        };

        self.vol_ewma = self.smoother.update(t, log_return);
        self.histogram.add(t - dt, t, self.vol_ewma);
        self.histogram.trim(t);
        self.vol_percentile = self.histogram.percentile_rank(self.vol_ewma);

        self.prev = Some((t, mid));
    }

    fn publish(&self, out: &mut Snapshot) {
        out.set_num(&self.key_ewma, self.vol_ewma);
        out.set_num(&self.key_percentile, self.vol_percentile);
    }
}
