//! Tick anomaly screening.
//!
//! The pipeline assumes clean ticks; this wrapper enforces that upstream by
//! skipping anomalous records and tallying each issue kind. Counters use an
//! ordered map so serialized stats are deterministic.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::domain::Tick;

use super::{FeedError, TickSource};

/// Counts of validation outcomes for one feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationStats {
    pub total_ticks: u64,
    pub accepted_ticks: u64,
    pub skipped_ticks: u64,
    pub issues: BTreeMap<String, u64>,
}

impl ValidationStats {
    fn record_issue(&mut self, issue: String) {
        self.skipped_ticks += 1;
        *self.issues.entry(issue).or_insert(0) += 1;
    }
}

/// Stateful per-feed tick validator.
#[derive(Debug, Clone, Default)]
pub struct TickValidator {
    last_timestamp: Option<f64>,
    stats: ValidationStats,
}

impl TickValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the tick passes all checks; otherwise the issue is recorded
    /// and the tick should be dropped.
    pub fn validate(&mut self, tick: &Tick) -> bool {
        self.stats.total_ticks += 1;

        for (field, value) in [
            ("timestamp", tick.timestamp),
            ("bid", tick.bid),
            ("ask", tick.ask),
            ("mid", tick.mid),
        ] {
            if !value.is_finite() {
                self.stats.record_issue(format!("non_finite_field:{field}"));
                return false;
            }
        }

        if tick.ask < tick.bid {
            self.stats.record_issue("negative_spread".into());
            return false;
        }

        let expected_mid = 0.5 * (tick.bid + tick.ask);
        if (expected_mid - tick.mid).abs() > 1e-6 * expected_mid.abs().max(1.0) {
            self.stats.record_issue("invalid_mid".into());
            return false;
        }

        if let Some(last) = self.last_timestamp {
            if tick.timestamp < last {
                self.stats.record_issue("timestamp_regression".into());
                return false;
            }
        }

        self.last_timestamp = Some(tick.timestamp);
        self.stats.accepted_ticks += 1;
        true
    }

    pub fn stats(&self) -> &ValidationStats {
        &self.stats
    }

    pub fn into_stats(self) -> ValidationStats {
        self.stats
    }
}

/// Tick source wrapper that drops invalid ticks.
#[derive(Debug)]
pub struct ValidatingSource<S> {
    inner: S,
    validator: TickValidator,
}

impl<S: TickSource> ValidatingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            validator: TickValidator::new(),
        }
    }

    pub fn stats(&self) -> &ValidationStats {
        self.validator.stats()
    }

    pub fn into_stats(self) -> ValidationStats {
        self.validator.into_stats()
    }
}

impl<S: TickSource> TickSource for ValidatingSource<S> {
    fn next_tick(&mut self) -> Result<Option<Tick>, FeedError> {
        loop {
            let Some(tick) = self.inner.next_tick()? else {
                let stats = self.validator.stats();
                if stats.skipped_ticks > 0 {
                    warn!(
                        skipped = stats.skipped_ticks,
                        total = stats.total_ticks,
                        "feed exhausted with skipped anomalous ticks"
                    );
                }
                return Ok(None);
            };
            if self.validator.validate(&tick) {
                return Ok(Some(tick));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::VecSource;

    #[test]
    fn accepts_clean_ticks() {
        let mut validator = TickValidator::new();
        assert!(validator.validate(&Tick::new(0.0, 1.0, 1.0002)));
        assert!(validator.validate(&Tick::new(1.0, 1.0, 1.0002)));
        assert_eq!(validator.stats().accepted_ticks, 2);
        assert_eq!(validator.stats().skipped_ticks, 0);
    }

    #[test]
    fn rejects_non_finite_fields() {
        let mut validator = TickValidator::new();
        assert!(!validator.validate(&Tick::new(0.0, f64::NAN, 1.0)));
        assert_eq!(validator.stats().issues["non_finite_field:bid"], 1);
    }

    #[test]
    fn rejects_negative_spread() {
        let mut validator = TickValidator::new();
        assert!(!validator.validate(&Tick::new(0.0, 1.0002, 1.0000)));
        assert_eq!(validator.stats().issues["negative_spread"], 1);
    }

    #[test]
    fn rejects_inconsistent_mid() {
        let mut validator = TickValidator::new();
        let tick = Tick::with_mid(0.0, 1.0000, 1.0002, 1.5);
        assert!(!validator.validate(&tick));
        assert_eq!(validator.stats().issues["invalid_mid"], 1);
    }

    #[test]
    fn rejects_timestamp_regression() {
        let mut validator = TickValidator::new();
        assert!(validator.validate(&Tick::new(10.0, 1.0, 1.0)));
        assert!(!validator.validate(&Tick::new(5.0, 1.0, 1.0)));
        assert_eq!(validator.stats().issues["timestamp_regression"], 1);
        // Equal timestamps are fine.
        assert!(validator.validate(&Tick::new(10.0, 1.0, 1.0)));
    }

    #[test]
    fn validating_source_skips_bad_ticks() {
        let ticks = vec![
            Tick::new(0.0, 1.0, 1.0002),
            Tick::new(1.0, 1.0002, 1.0000), // crossed
            Tick::new(2.0, 1.0, 1.0002),
        ];
        let mut source = ValidatingSource::new(VecSource::new(ticks));
        assert_eq!(source.next_tick().unwrap().unwrap().timestamp, 0.0);
        assert_eq!(source.next_tick().unwrap().unwrap().timestamp, 2.0);
        assert!(source.next_tick().unwrap().is_none());
        assert_eq!(source.stats().skipped_ticks, 1);
    }
}
