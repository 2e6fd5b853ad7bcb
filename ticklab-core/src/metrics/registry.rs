//! Metric-type registry: string tag to constructor.
//!
//! Built once at first use and immutable afterwards. Constructors validate
//! their parameters before allocating any state, so a bad config fails
//! before the first tick.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::config::{ConfigError, MetricConfig, MetricParams};

use super::{
    DriftSignMetric, EwmaMetric, EwmaSlopeMetric, EwmaVolMetric, Metric, SessionMetric,
    SpreadMetric, TickRateMetric, ZscoreMetric,
};

type MetricCtor = fn(&MetricConfig) -> Result<Box<dyn Metric>, ConfigError>;

static METRIC_REGISTRY: LazyLock<HashMap<&'static str, MetricCtor>> = LazyLock::new(|| {
    let mut registry: HashMap<&'static str, MetricCtor> = HashMap::new();
    registry.insert("zscore", build_zscore);
    registry.insert("ewma", build_ewma);
    registry.insert("ewma_slope", build_ewma_slope);
    registry.insert("ewma_vol", build_ewma_vol);
    registry.insert("drift_sign", build_drift_sign);
    registry.insert("session", build_session);
    registry.insert("spread", build_spread);
    registry.insert("tick_rate", build_tick_rate);
    registry
});

/// Construct a metric from its validated config.
pub fn build_metric(config: &MetricConfig) -> Result<Box<dyn Metric>, ConfigError> {
    config.validate()?;
    let tag = config.params.type_tag();
    let ctor = METRIC_REGISTRY
        .get(tag)
        .ok_or_else(|| ConfigError::UnknownMetricType(tag.to_string()))?;
    ctor(config)
}

fn mismatch(config: &MetricConfig) -> ConfigError {
    ConfigError::InvalidMetricParam {
        name: config.name.clone(),
        message: format!("constructor/params mismatch for type '{}'", config.params.type_tag()),
    }
}

fn build_zscore(config: &MetricConfig) -> Result<Box<dyn Metric>, ConfigError> {
    let MetricParams::Zscore { lookback_seconds } = &config.params else {
        return Err(mismatch(config));
    };
    Ok(Box::new(ZscoreMetric::new(&config.name, *lookback_seconds)))
}

fn build_ewma(config: &MetricConfig) -> Result<Box<dyn Metric>, ConfigError> {
    let MetricParams::Ewma {
        tau_seconds,
        initial_value,
        price_field,
    } = &config.params
    else {
        return Err(mismatch(config));
    };
    Ok(Box::new(EwmaMetric::new(
        &config.name,
        *tau_seconds,
        *initial_value,
        *price_field,
    )))
}

fn build_ewma_slope(config: &MetricConfig) -> Result<Box<dyn Metric>, ConfigError> {
    let MetricParams::EwmaSlope {
        tau_seconds,
        window_seconds,
        initial_value,
        price_field,
    } = &config.params
    else {
        return Err(mismatch(config));
    };
    Ok(Box::new(EwmaSlopeMetric::new(
        &config.name,
        *tau_seconds,
        *window_seconds,
        *initial_value,
        *price_field,
    )))
}

fn build_ewma_vol(config: &MetricConfig) -> Result<Box<dyn Metric>, ConfigError> {
    let MetricParams::EwmaVol {
        tau_seconds,
        percentile_horizon_seconds,
        bins,
        base_vol,
        stddev_cap,
    } = &config.params
    else {
        return Err(mismatch(config));
    };
    Ok(Box::new(EwmaVolMetric::new(
        &config.name,
        *tau_seconds,
        *percentile_horizon_seconds,
        *bins,
        *base_vol,
        *stddev_cap,
    )))
}

fn build_drift_sign(config: &MetricConfig) -> Result<Box<dyn Metric>, ConfigError> {
    let MetricParams::DriftSign { lookback_seconds } = &config.params else {
        return Err(mismatch(config));
    };
    Ok(Box::new(DriftSignMetric::new(&config.name, *lookback_seconds)))
}

fn build_session(config: &MetricConfig) -> Result<Box<dyn Metric>, ConfigError> {
    let MetricParams::Session = &config.params else {
        return Err(mismatch(config));
    };
    Ok(Box::new(SessionMetric::new(&config.name)))
}

fn build_spread(config: &MetricConfig) -> Result<Box<dyn Metric>, ConfigError> {
    let MetricParams::Spread {
        pip_size,
        window_seconds,
    } = &config.params
    else {
        return Err(mismatch(config));
    };
    Ok(Box::new(SpreadMetric::new(&config.name, *pip_size, *window_seconds)))
}

fn build_tick_rate(config: &MetricConfig) -> Result<Box<dyn Metric>, ConfigError> {
    let MetricParams::TickRate { window_seconds } = &config.params else {
        return Err(mismatch(config));
    };
    Ok(Box::new(TickRateMetric::new(&config.name, *window_seconds)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PriceField;

    #[test]
    fn builds_every_registered_type() {
        let params = [
            MetricParams::Zscore { lookback_seconds: 60.0 },
            MetricParams::Ewma {
                tau_seconds: 10.0,
                initial_value: None,
                price_field: PriceField::Mid,
            },
            MetricParams::EwmaSlope {
                tau_seconds: 10.0,
                window_seconds: 30.0,
                initial_value: None,
                price_field: PriceField::Mid,
            },
            MetricParams::EwmaVol {
                tau_seconds: 10.0,
                percentile_horizon_seconds: 60.0,
                bins: 32,
                base_vol: 1e-4,
                stddev_cap: 5.0,
            },
            MetricParams::DriftSign { lookback_seconds: 60.0 },
            MetricParams::Session,
            MetricParams::Spread {
                pip_size: 0.0001,
                window_seconds: 60.0,
            },
            MetricParams::TickRate { window_seconds: 60.0 },
        ];
        for (i, p) in params.into_iter().enumerate() {
            let tag = p.type_tag();
            let config = MetricConfig {
                name: format!("m{i}"),
                enabled: true,
                params: p,
            };
            let metric = build_metric(&config).unwrap_or_else(|e| panic!("{tag}: {e}"));
            assert_eq!(metric.name(), format!("m{i}"));
        }
    }

    #[test]
    fn invalid_params_fail_before_construction() {
        let config = MetricConfig {
            name: "bad".into(),
            enabled: true,
            params: MetricParams::Spread {
                pip_size: -1.0,
                window_seconds: 60.0,
            },
        };
        assert!(build_metric(&config).is_err());
    }
}
