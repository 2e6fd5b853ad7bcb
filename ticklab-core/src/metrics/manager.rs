//! Metrics manager: owns the metric collection and the shared snapshot.

use tracing::debug;

use crate::config::{ConfigError, MetricConfig};
use crate::domain::Tick;

use super::registry::build_metric;
use super::{Metric, Snapshot};

/// Composes metrics into one flat snapshot per tick.
///
/// Metrics update in declaration order; the snapshot is refreshed in place
/// and is read-only to predicates and engines for the rest of the tick.
pub struct MetricsManager {
    metrics: Vec<Box<dyn Metric>>,
    snapshot: Snapshot,
}

impl MetricsManager {
    /// Wrap an already-built metric collection. Names must be unique since
    /// they namespace the snapshot keys.
    pub fn new(metrics: Vec<Box<dyn Metric>>) -> Result<Self, ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for metric in &metrics {
            if !seen.insert(metric.name().to_string()) {
                return Err(ConfigError::DuplicateMetricName(metric.name().to_string()));
            }
        }
        Ok(Self {
            metrics,
            snapshot: Snapshot::new(),
        })
    }

    /// Build the collection from config, skipping disabled entries.
    pub fn from_configs(configs: &[MetricConfig]) -> Result<Self, ConfigError> {
        let mut metrics: Vec<Box<dyn Metric>> = Vec::with_capacity(configs.len());
        for config in configs {
            if !config.enabled {
                debug!(metric = %config.name, "metric disabled via config");
                continue;
            }
            metrics.push(build_metric(config)?);
        }
        Self::new(metrics)
    }

    /// Update every metric with `tick` and republish the snapshot.
    pub fn update_all(&mut self, tick: &Tick) -> &Snapshot {
        for metric in &mut self.metrics {
            metric.update(tick);
        }
        for metric in &self.metrics {
            metric.publish(&mut self.snapshot);
        }
        &self.snapshot
    }

    /// The snapshot as of the last `update_all`.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }
}
