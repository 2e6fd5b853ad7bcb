//! Online indicator metrics and the snapshot they publish into.
//!
//! A metric is a named estimator updated once per tick. Every field it
//! exposes lands in the flat snapshot under `"{metric_name}.{field}"`. Key
//! strings are formatted once at construction; per-tick publishing only
//! refreshes values in place, so the hot path does not allocate once the
//! key set exists.

mod drift_sign;
mod ewma;
mod ewma_slope;
mod ewma_vol;
mod manager;
mod registry;
mod session;
mod snapshot;
mod spread;
mod threshold_reversion;
mod tick_rate;
mod zscore;

pub use drift_sign::DriftSignMetric;
pub use ewma::EwmaMetric;
pub use ewma_slope::EwmaSlopeMetric;
pub use ewma_vol::EwmaVolMetric;
pub use manager::MetricsManager;
pub use registry::build_metric;
pub use session::SessionMetric;
pub use snapshot::{Snapshot, SnapshotValue};
pub use spread::SpreadMetric;
pub use threshold_reversion::{ReversionState, ThresholdReversionMetric};
pub use tick_rate::TickRateMetric;
pub use zscore::ZscoreMetric;

use crate::domain::Tick;

/// A named online estimator.
///
/// Metrics are created at run start, owned by the manager, and mutated only
/// by the single-threaded tick loop.
pub trait Metric: Send {
    /// Stable instance name; prefixes every published field.
    fn name(&self) -> &str;

    /// Fold one tick into the internal state.
    fn update(&mut self, tick: &Tick);

    /// Write the current field values into the snapshot.
    fn publish(&self, out: &mut Snapshot);
}

/// Tick-to-tick interval tracker shared by the rolling-window metrics.
///
/// The first observation yields `dt = 0` (the window clamps it to an
/// infinitesimal weight); later observations clamp to a 1 microsecond floor
/// so equal timestamps cannot produce zero weights.
#[derive(Debug, Clone, Default)]
pub(crate) struct TickInterval {
    last: Option<f64>,
}

impl TickInterval {
    pub(crate) fn advance(&mut self, t: f64) -> f64 {
        let dt = match self.last {
            None => 0.0,
            Some(last) => (t - last).max(1e-6),
        };
        self.last = Some(t);
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_starts_at_zero_then_clamps() {
        let mut interval = TickInterval::default();
        assert_eq!(interval.advance(5.0), 0.0);
        assert_eq!(interval.advance(6.5), 1.5);
        assert_eq!(interval.advance(6.5), 1e-6);
    }
}
