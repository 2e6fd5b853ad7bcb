//! Closed trade records and their outcome taxonomy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1.0 for long, -1.0 for short.
    pub fn signum(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    /// Map a numeric sign to a direction; zero and non-finite are `None`.
    pub fn from_sign(sign: f64) -> Option<Direction> {
        if sign > 0.0 {
            Some(Direction::Long)
        } else if sign < 0.0 {
            Some(Direction::Short)
        } else {
            None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "Long"),
            Direction::Short => write!(f, "Short"),
        }
    }
}

/// Terminal label of a closed trade. The set is closed; analytics key on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Tp,
    Sl,
    Timeout,
    ExitPredicate,
    Reversal,
    EndOfFeed,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Tp => "TP",
            Outcome::Sl => "SL",
            Outcome::Timeout => "TIMEOUT",
            Outcome::ExitPredicate => "EXIT_PREDICATE",
            Outcome::Reversal => "REVERSAL",
            Outcome::EndOfFeed => "END_OF_FEED",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Emitted exactly once per transition out of LONG/SHORT, in chronological
/// exit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Realized profit in pips: `(exit - entry) * direction / pip_size`.
    pub pnl_pips: f64,
    pub holding_seconds: f64,
    pub outcome: Outcome,
    /// Entry engine's reason string.
    pub reason: String,
    /// Engine-supplied context captured at open time. Ordered map so
    /// serialized ledgers are byte-identical across runs.
    pub entry_metadata: BTreeMap<String, f64>,
}

/// Convert epoch seconds to a UTC datetime, preserving sub-second precision.
pub(crate) fn utc_from_epoch(timestamp: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos((timestamp * 1e9).round() as i64)
}
