//! Validated configuration types.
//!
//! The core never parses YAML; the external config layer deserializes into
//! these structs (any serde format works) and the registries validate them
//! before the first tick is processed. Parameter errors fail fast as
//! `ConfigError`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Tick;

/// Configuration rejected at construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("metric '{name}': {message}")]
    InvalidMetricParam { name: String, message: String },
    #[error("unknown metric type '{0}'")]
    UnknownMetricType(String),
    #[error("duplicate metric name '{0}'")]
    DuplicateMetricName(String),
    #[error("entry engine '{name}': {message}")]
    InvalidEngineParam { name: String, message: String },
    #[error("unknown entry engine '{0}'")]
    UnknownEngine(String),
    #[error("predicate on '{metric}': {message}")]
    InvalidPredicate { metric: String, message: String },
}

// ─── Metric configuration ────────────────────────────────────────────

/// Which quote field a price-driven metric reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    #[default]
    Mid,
    Bid,
    Ask,
}

impl PriceField {
    pub fn extract(self, tick: &Tick) -> f64 {
        match self {
            PriceField::Mid => tick.mid,
            PriceField::Bid => tick.bid,
            PriceField::Ask => tick.ask,
        }
    }
}

/// One configured metric instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Instance name; prefixes every snapshot key this metric emits.
    pub name: String,
    /// Disabled metrics are skipped at manager construction.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(flatten)]
    pub params: MetricParams,
}

fn default_true() -> bool {
    true
}

fn default_bins() -> usize {
    64
}

fn default_base_vol() -> f64 {
    1e-4
}

fn default_stddev_cap() -> f64 {
    5.0
}

/// Per-type metric parameters, tagged by the metric type string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricParams {
    Zscore {
        lookback_seconds: f64,
    },
    Ewma {
        tau_seconds: f64,
        #[serde(default)]
        initial_value: Option<f64>,
        #[serde(default)]
        price_field: PriceField,
    },
    EwmaSlope {
        tau_seconds: f64,
        window_seconds: f64,
        #[serde(default)]
        initial_value: Option<f64>,
        #[serde(default)]
        price_field: PriceField,
    },
    EwmaVol {
        tau_seconds: f64,
        percentile_horizon_seconds: f64,
        #[serde(default = "default_bins")]
        bins: usize,
        #[serde(default = "default_base_vol")]
        base_vol: f64,
        #[serde(default = "default_stddev_cap")]
        stddev_cap: f64,
    },
    DriftSign {
        lookback_seconds: f64,
    },
    Session,
    Spread {
        pip_size: f64,
        window_seconds: f64,
    },
    TickRate {
        window_seconds: f64,
    },
}

impl MetricParams {
    /// Registry key for this metric kind.
    pub fn type_tag(&self) -> &'static str {
        match self {
            MetricParams::Zscore { .. } => "zscore",
            MetricParams::Ewma { .. } => "ewma",
            MetricParams::EwmaSlope { .. } => "ewma_slope",
            MetricParams::EwmaVol { .. } => "ewma_vol",
            MetricParams::DriftSign { .. } => "drift_sign",
            MetricParams::Session => "session",
            MetricParams::Spread { .. } => "spread",
            MetricParams::TickRate { .. } => "tick_rate",
        }
    }
}

impl MetricConfig {
    /// Reject invalid parameters before any tick is processed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |message: String| {
            Err(ConfigError::InvalidMetricParam {
                name: self.name.clone(),
                message,
            })
        };
        if self.name.is_empty() {
            return Err(ConfigError::InvalidMetricParam {
                name: "<unnamed>".into(),
                message: "metric name must be non-empty".into(),
            });
        }
        match &self.params {
            MetricParams::Zscore { lookback_seconds } | MetricParams::DriftSign { lookback_seconds } => {
                require_positive(*lookback_seconds, "lookback_seconds").or_else(fail)
            }
            MetricParams::Ewma {
                tau_seconds,
                initial_value,
                ..
            } => {
                require_positive(*tau_seconds, "tau_seconds").or_else(fail)?;
                require_finite_opt(*initial_value, "initial_value").or_else(fail)
            }
            MetricParams::EwmaSlope {
                tau_seconds,
                window_seconds,
                initial_value,
                ..
            } => {
                require_positive(*tau_seconds, "tau_seconds").or_else(fail)?;
                require_positive(*window_seconds, "window_seconds").or_else(fail)?;
                require_finite_opt(*initial_value, "initial_value").or_else(fail)
            }
            MetricParams::EwmaVol {
                tau_seconds,
                percentile_horizon_seconds,
                bins,
                base_vol,
                stddev_cap,
            } => {
                require_positive(*tau_seconds, "tau_seconds").or_else(fail)?;
                require_positive(*percentile_horizon_seconds, "percentile_horizon_seconds")
                    .or_else(fail)?;
                if !(2..=10_000).contains(bins) {
                    return fail(format!("bins must be between 2 and 10000, got {bins}"));
                }
                require_positive(*base_vol, "base_vol").or_else(fail)?;
                require_positive(*stddev_cap, "stddev_cap").or_else(fail)
            }
            MetricParams::Session => Ok(()),
            MetricParams::Spread {
                pip_size,
                window_seconds,
            } => {
                require_positive(*pip_size, "pip_size").or_else(fail)?;
                require_positive(*window_seconds, "window_seconds").or_else(fail)
            }
            MetricParams::TickRate { window_seconds } => {
                require_positive(*window_seconds, "window_seconds").or_else(fail)
            }
        }
    }
}

fn require_positive(value: f64, field: &str) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be positive and finite, got {value}"))
    }
}

fn require_non_negative(value: f64, field: &str) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be non-negative and finite, got {value}"))
    }
}

fn require_finite_opt(value: Option<f64>, field: &str) -> Result<(), String> {
    match value {
        Some(v) if !v.is_finite() => Err(format!("{field} must be finite, got {v}")),
        _ => Ok(()),
    }
}

// ─── Strategy configuration ──────────────────────────────────────────

/// Comparison operator for predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl Operator {
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Operator::Lt => lhs < rhs,
            Operator::Le => lhs <= rhs,
            Operator::Gt => lhs > rhs,
            Operator::Ge => lhs >= rhs,
            Operator::Eq => lhs == rhs,
            Operator::Ne => lhs != rhs,
        }
    }
}

/// Declarative comparison of a snapshot value against a literal or a second
/// snapshot value. Exactly one of `value` / `other_metric` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredicateConfig {
    /// Fully qualified snapshot key, e.g. `"z30m.z_score"`.
    pub metric: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub other_metric: Option<String>,
    #[serde(default)]
    pub use_abs: bool,
}

/// Entry engine parameter bundles, tagged by engine id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "snake_case")]
pub enum EntryParams {
    ThresholdReversion {
        lookback_seconds: f64,
        threshold_pips: f64,
        #[serde(default)]
        tp_pips: Option<f64>,
        #[serde(default)]
        sl_pips: Option<f64>,
        #[serde(default)]
        min_recency_seconds: f64,
        #[serde(default)]
        trade_timeout_seconds: Option<f64>,
    },
    EwmaCrossover {
        /// Dotted snapshot key of the fast EWMA, e.g. `"fewma.ewma"`.
        fast_metric: String,
        slow_metric: String,
        #[serde(default = "default_true")]
        long_on_cross: bool,
        #[serde(default)]
        short_on_cross: bool,
        /// Zero means no automatic take-profit.
        #[serde(default)]
        tp_pips: f64,
        /// Zero means no automatic stop-loss.
        #[serde(default)]
        sl_pips: f64,
        #[serde(default)]
        trade_timeout_seconds: Option<f64>,
    },
    Stub,
}

impl EntryParams {
    /// Registry key for this engine kind.
    pub fn engine_id(&self) -> &'static str {
        match self {
            EntryParams::ThresholdReversion { .. } => "threshold_reversion",
            EntryParams::EwmaCrossover { .. } => "ewma_crossover",
            EntryParams::Stub => "stub",
        }
    }
}

/// Entry side of a strategy: one engine plus gating predicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryConfig {
    pub name: String,
    #[serde(flatten)]
    pub params: EntryParams,
    #[serde(default)]
    pub predicates: Vec<PredicateConfig>,
}

impl EntryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |message: String| {
            Err(ConfigError::InvalidEngineParam {
                name: self.name.clone(),
                message,
            })
        };
        if self.name.is_empty() {
            return fail("entry name must be non-empty".into());
        }
        match &self.params {
            EntryParams::ThresholdReversion {
                lookback_seconds,
                threshold_pips,
                tp_pips,
                sl_pips,
                min_recency_seconds,
                trade_timeout_seconds,
            } => {
                require_positive(*lookback_seconds, "lookback_seconds").or_else(fail)?;
                require_positive(*threshold_pips, "threshold_pips").or_else(fail)?;
                if let Some(tp) = tp_pips {
                    require_positive(*tp, "tp_pips").or_else(fail)?;
                }
                if let Some(sl) = sl_pips {
                    require_positive(*sl, "sl_pips").or_else(fail)?;
                }
                require_non_negative(*min_recency_seconds, "min_recency_seconds").or_else(fail)?;
                if let Some(timeout) = trade_timeout_seconds {
                    require_positive(*timeout, "trade_timeout_seconds").or_else(fail)?;
                }
                Ok(())
            }
            EntryParams::EwmaCrossover {
                fast_metric,
                slow_metric,
                tp_pips,
                sl_pips,
                trade_timeout_seconds,
                ..
            } => {
                if fast_metric.is_empty() {
                    return fail("fast_metric must be a non-empty snapshot key".into());
                }
                if slow_metric.is_empty() {
                    return fail("slow_metric must be a non-empty snapshot key".into());
                }
                require_non_negative(*tp_pips, "tp_pips").or_else(fail)?;
                require_non_negative(*sl_pips, "sl_pips").or_else(fail)?;
                if let Some(timeout) = trade_timeout_seconds {
                    require_positive(*timeout, "trade_timeout_seconds").or_else(fail)?;
                }
                Ok(())
            }
            EntryParams::Stub => Ok(()),
        }
    }
}

/// Exit side of a strategy: predicates only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitConfig {
    pub name: String,
    #[serde(default)]
    pub predicates: Vec<PredicateConfig>,
}

/// Top-level strategy definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    pub entry: EntryConfig,
    pub exit: ExitConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_params_round_trip_with_type_tag() {
        let config = MetricConfig {
            name: "z30m".into(),
            enabled: true,
            params: MetricParams::Zscore {
                lookback_seconds: 1800.0,
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"type\":\"zscore\""));
        let back: MetricConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "z30m");
        assert_eq!(back.params.type_tag(), "zscore");
    }

    #[test]
    fn ewma_vol_defaults_apply() {
        let json = r#"{
            "name": "vol",
            "type": "ewma_vol",
            "tau_seconds": 30.0,
            "percentile_horizon_seconds": 120.0
        }"#;
        let config: MetricConfig = serde_json::from_str(json).unwrap();
        match config.params {
            MetricParams::EwmaVol {
                bins,
                base_vol,
                stddev_cap,
                ..
            } => {
                assert_eq!(bins, 64);
                assert_eq!(base_vol, 1e-4);
                assert_eq!(stddev_cap, 5.0);
            }
            other => panic!("expected ewma_vol params, got {other:?}"),
        }
        config.validate().unwrap();
    }

    #[test]
    fn non_positive_tau_is_rejected() {
        let config = MetricConfig {
            name: "e".into(),
            enabled: true,
            params: MetricParams::Ewma {
                tau_seconds: 0.0,
                initial_value: None,
                price_field: PriceField::Mid,
            },
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMetricParam { .. })
        ));
    }

    #[test]
    fn bins_out_of_range_is_rejected() {
        let config = MetricConfig {
            name: "vol".into(),
            enabled: true,
            params: MetricParams::EwmaVol {
                tau_seconds: 10.0,
                percentile_horizon_seconds: 60.0,
                bins: 1,
                base_vol: 1e-4,
                stddev_cap: 5.0,
            },
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn operators_deserialize_from_symbols() {
        let op: Operator = serde_json::from_str("\">=\"").unwrap();
        assert_eq!(op, Operator::Ge);
        assert!(op.apply(2.0, 2.0));
        assert!(!Operator::Lt.apply(2.0, 2.0));
        assert!(Operator::Ne.apply(1.0, 2.0));
    }

    #[test]
    fn entry_params_tag_on_engine_id() {
        let json = r#"{
            "name": "xover",
            "engine": "ewma_crossover",
            "fast_metric": "f.ewma",
            "slow_metric": "s.ewma"
        }"#;
        let entry: EntryConfig = serde_json::from_str(json).unwrap();
        assert_eq!(entry.params.engine_id(), "ewma_crossover");
        entry.validate().unwrap();
        match entry.params {
            EntryParams::EwmaCrossover {
                long_on_cross,
                short_on_cross,
                tp_pips,
                ..
            } => {
                assert!(long_on_cross);
                assert!(!short_on_cross);
                assert_eq!(tp_pips, 0.0);
            }
            other => panic!("expected crossover params, got {other:?}"),
        }
    }

    #[test]
    fn reversion_rejects_zero_threshold() {
        let entry = EntryConfig {
            name: "rev".into(),
            params: EntryParams::ThresholdReversion {
                lookback_seconds: 120.0,
                threshold_pips: 0.0,
                tp_pips: None,
                sl_pips: None,
                min_recency_seconds: 0.0,
                trade_timeout_seconds: None,
            },
            predicates: vec![],
        };
        assert!(entry.validate().is_err());
    }
}
