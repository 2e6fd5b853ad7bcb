//! Run configuration: symbols plus the core's metric and strategy configs.

use serde::{Deserialize, Serialize};

use ticklab_core::config::{MetricConfig, StrategyConfig};

/// Everything needed to run one batch of single-symbol backtests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub symbols: Vec<String>,
    pub pip_size: f64,
    #[serde(default)]
    pub warmup_seconds: f64,
    pub metrics: Vec<MetricConfig>,
    pub strategy: StrategyConfig,
}
