//! Threshold-reversion state machine.
//!
//! Tracks recent highs and lows in monotonic queues and watches for the
//! price to displace by at least `threshold` from an extremum old enough to
//! trust (the reference). While displaced, the metric holds a directional
//! state pointing back toward the reference: short when price sits above a
//! low, long when it sits below a high. Touching the reference (within one
//! pip) flattens the state; the same update may then re-arm against the
//! opposite extremum, so a fast round trip can flip direction within a
//! single tick. That behavior is intentional.
//!
//! This metric underpins the threshold-reversion entry engine and is not
//! part of the config-driven metric registry.

use crate::domain::Tick;
use crate::primitives::{Extremum, MonotonicQueue};

/// Snapshot of the reversion state after an update.
#[derive(Debug, Clone, Copy)]
pub struct ReversionState {
    /// -1 short, 0 flat, +1 long.
    pub direction: i32,
    /// Price of the current reference extremum; NaN when flat.
    pub reference_price: f64,
    /// |mid - reference|; NaN without a reference.
    pub distance_from_reference: f64,
    /// Displacement threshold in price units.
    pub threshold: f64,
    /// Take-profit level for the held direction; NaN when flat.
    pub tp_price: f64,
    /// Stop-loss level for the held direction; NaN when flat.
    pub sl_price: f64,
    /// Age of the reference extremum; NaN without a reference.
    pub reference_age_seconds: f64,
    /// Time since the directional state opened; NaN when flat.
    pub position_open_age_seconds: f64,
    /// Configured trade timeout; NaN when unset.
    pub trade_timeout_seconds: f64,
}

#[derive(Debug, Clone)]
pub struct ThresholdReversionMetric {
    name: String,
    lookback: f64,
    threshold: f64,
    pip_size: f64,
    tp_distance: f64,
    sl_distance: f64,
    min_recency: f64,
    trade_timeout: Option<f64>,

    highs: MonotonicQueue,
    lows: MonotonicQueue,
    /// (price, observed_at) of the active reference extremum.
    reference: Option<(f64, f64)>,
    direction: i32,
    tp_price: f64,
    sl_price: f64,
    position_open_time: f64,
    last_mid: f64,
    last_t: f64,
}

impl ThresholdReversionMetric {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        lookback_seconds: f64,
        threshold_pips: f64,
        pip_size: f64,
        tp_pips: f64,
        sl_pips: f64,
        min_recency_seconds: f64,
        trade_timeout_seconds: Option<f64>,
    ) -> Self {
        assert!(lookback_seconds > 0.0, "lookback_seconds must be positive");
        assert!(threshold_pips > 0.0, "threshold_pips must be positive");
        assert!(pip_size > 0.0, "pip_size must be positive");
        Self {
            name: name.into(),
            lookback: lookback_seconds,
            threshold: threshold_pips * pip_size,
            pip_size,
            tp_distance: tp_pips * pip_size,
            sl_distance: sl_pips * pip_size,
            min_recency: min_recency_seconds,
            trade_timeout: trade_timeout_seconds,
            highs: MonotonicQueue::new(Extremum::Max),
            lows: MonotonicQueue::new(Extremum::Min),
            reference: None,
            direction: 0,
            tp_price: f64::NAN,
            sl_price: f64::NAN,
            position_open_time: f64::NAN,
            last_mid: f64::NAN,
            last_t: f64::NAN,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn update(&mut self, tick: &Tick) {
        let t = tick.timestamp;
        let mid = tick.mid;
        self.last_mid = mid;
        self.last_t = t;

        self.highs.append(t, mid);
        self.lows.append(t, mid);
        let cutoff = t - self.lookback;
        self.highs.trim(cutoff);
        self.lows.trim(cutoff);

        // Reversion completed: price came back to the reference.
        if self.direction != 0 {
            if let Some((ref_price, _)) = self.reference {
                if (mid - ref_price).abs() <= self.pip_size {
                    self.flatten();
                }
            }
        }

        // Locate the freshest qualifying extremum on either side.
        let low = self.lows.find_candidate(mid, self.threshold, t, self.min_recency);
        let high = self.highs.find_candidate(mid, self.threshold, t, self.min_recency);
        let candidate = match (low, high) {
            (Some(l), Some(h)) => Some(if l.t >= h.t { l } else { h }),
            (Some(l), None) => Some(l),
            (None, Some(h)) => Some(h),
            (None, None) => None,
        };

        match candidate {
            None => {
                self.flatten();
                self.reference = None;
            }
            Some(entry) => {
                if let Some((ref_price, _)) = self.reference {
                    // Reference drifted to a different extremum.
                    if (entry.price - ref_price).abs() > self.pip_size / 10.0 {
                        self.flatten();
                    }
                }
                self.reference = Some((entry.price, entry.t));
            }
        }

        if self.direction == 0 {
            if let Some((ref_price, _)) = self.reference {
                if mid - ref_price >= self.threshold {
                    // Price displaced above a low: fade it short.
                    self.direction = -1;
                    self.tp_price = mid - self.tp_distance;
                    self.sl_price = mid + self.sl_distance;
                    self.position_open_time = t;
                } else if ref_price - mid >= self.threshold {
                    self.direction = 1;
                    self.tp_price = mid + self.tp_distance;
                    self.sl_price = mid - self.sl_distance;
                    self.position_open_time = t;
                }
            }
        }
    }

    fn flatten(&mut self) {
        self.direction = 0;
        self.tp_price = f64::NAN;
        self.sl_price = f64::NAN;
        self.position_open_time = f64::NAN;
    }

    /// Current state, computed against the last updated tick.
    pub fn state(&self) -> ReversionState {
        let (reference_price, reference_age) = match self.reference {
            Some((price, observed_at)) => (price, self.last_t - observed_at),
            None => (f64::NAN, f64::NAN),
        };
        ReversionState {
            direction: self.direction,
            reference_price,
            distance_from_reference: (self.last_mid - reference_price).abs(),
            threshold: self.threshold,
            tp_price: self.tp_price,
            sl_price: self.sl_price,
            reference_age_seconds: reference_age,
            position_open_age_seconds: if self.position_open_time.is_nan() {
                f64::NAN
            } else {
                self.last_t - self.position_open_time
            },
            trade_timeout_seconds: self.trade_timeout.unwrap_or(f64::NAN),
        }
    }

    pub fn trade_timeout_seconds(&self) -> Option<f64> {
        self.trade_timeout
    }
}
