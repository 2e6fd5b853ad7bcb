//! Time-weighted rolling window.
//!
//! Keeps the samples covering `[now - lookback, now]`, each weighted by the
//! time it served in the window. Three running sums (weight, weighted x,
//! weighted x^2) make `stats()` O(1):
//!
//!   mean = sum(dt * x) / sum(dt)
//!   var  = sum(dt * x^2) / sum(dt) - mean^2   (clipped at zero)
//!
//! Trimming pops fully expired samples and partially trims the sample that
//! straddles the cutoff by advancing its start time and shrinking its
//! weight. When the running weight decays below epsilon it snaps to exact
//! zero so float drift cannot accumulate.

use std::collections::VecDeque;

const TRIM_EPS: f64 = 1e-12;
const MIN_DT: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Sample {
    ts: f64,
    value: f64,
    dt: f64,
}

/// Time-weighted rolling mean/stddev window.
#[derive(Debug, Clone)]
pub struct TimeRollingWindow {
    lookback: f64,
    samples: VecDeque<Sample>,
    sum_w: f64,
    sum_x: f64,
    sum_x2: f64,
}

impl TimeRollingWindow {
    pub fn new(lookback_seconds: f64) -> Self {
        assert!(
            lookback_seconds > 0.0,
            "lookback_seconds must be positive, got {lookback_seconds}"
        );
        Self {
            lookback: lookback_seconds,
            samples: VecDeque::new(),
            sum_w: 0.0,
            sum_x: 0.0,
            sum_x2: 0.0,
        }
    }

    /// Append a sample that served `dt` seconds starting at `ts`.
    ///
    /// Non-finite inputs are skipped silently; non-positive `dt` is clamped
    /// to an infinitesimal weight.
    pub fn append(&mut self, ts: f64, value: f64, dt: f64) {
        if !(ts.is_finite() && value.is_finite() && dt.is_finite()) {
            return;
        }
        let dt = if dt <= 0.0 { MIN_DT } else { dt };

        self.samples.push_back(Sample { ts, value, dt });
        self.sum_w += dt;
        self.sum_x += dt * value;
        self.sum_x2 += dt * value * value;

        self.trim(ts);
    }

    fn trim(&mut self, ts: f64) {
        let cutoff = ts - self.lookback;

        while let Some(head) = self.samples.front() {
            let end = head.ts + head.dt;

            if end <= cutoff - TRIM_EPS {
                let head = self.samples.pop_front().expect("front checked");
                self.sum_w -= head.dt;
                self.sum_x -= head.dt * head.value;
                self.sum_x2 -= head.dt * head.value * head.value;
                continue;
            }

            if head.ts < cutoff && cutoff < end {
                let mut drop_dt = cutoff - head.ts;
                let mut keep_dt = head.dt - drop_dt;
                if keep_dt < 0.0 {
                    keep_dt = 0.0;
                    drop_dt = head.dt;
                }

                let value = head.value;
                self.sum_w -= drop_dt;
                self.sum_x -= drop_dt * value;
                self.sum_x2 -= drop_dt * value * value;

                let head = self.samples.front_mut().expect("front checked");
                head.ts = cutoff;
                head.dt = keep_dt;
            }
            break;
        }

        if self.sum_w.abs() < TRIM_EPS {
            self.sum_w = 0.0;
            self.sum_x = 0.0;
            self.sum_x2 = 0.0;
        } else if self.sum_w < 0.0 && self.sum_w > -TRIM_EPS {
            self.sum_w = 0.0;
        }
    }

    /// Weighted mean and population standard deviation.
    ///
    /// Returns `(NaN, NaN)` while the window holds effectively zero weight.
    pub fn stats(&self) -> (f64, f64) {
        if !self.sum_w.is_finite() || self.sum_w <= 1e-12 {
            return (f64::NAN, f64::NAN);
        }
        if !(self.sum_x.is_finite() && self.sum_x2.is_finite()) {
            return (f64::NAN, f64::NAN);
        }

        let mean = self.sum_x / self.sum_w;
        let raw = self.sum_x2 / self.sum_w - mean * mean;
        if !raw.is_finite() {
            return (mean, f64::NAN);
        }

        (mean, raw.max(0.0).sqrt())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total weight currently in the window.
    pub fn weight(&self) -> f64 {
        self.sum_w
    }
}
