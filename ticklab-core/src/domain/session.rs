//! Trading-session classification by UTC minute of day.
//!
//! The table is fixed: 22:00-06:59 Asia, 07:00-11:59 London, 12:00-15:59
//! London/New York overlap, 16:00-20:59 New York, 21:00-21:59 Other.
//! Built once per process and immutable afterwards.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// FX trading session of a UTC wall-clock minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Session {
    Asia,
    London,
    LondonNewYorkOverlap,
    NewYork,
    Other,
}

impl Session {
    /// Stable label exposed through metric snapshots.
    pub fn label(self) -> &'static str {
        match self {
            Session::Asia => "Asia",
            Session::London => "London",
            Session::LondonNewYorkOverlap => "London_New_York_Overlap",
            Session::NewYork => "New_York",
            Session::Other => "Other",
        }
    }

    /// Session for a UTC (hour, minute) pair.
    pub fn at(hour: u32, minute: u32) -> Session {
        SESSION_TABLE[((hour * 60 + minute) % 1_440) as usize]
    }
}

/// One entry per minute of the UTC day.
static SESSION_TABLE: LazyLock<[Session; 1_440]> = LazyLock::new(|| {
    let mut table = [Session::Other; 1_440];
    for (minute, slot) in table.iter_mut().enumerate() {
        *slot = match minute {
            0..=419 => Session::Asia,                  // 00:00-06:59
            420..=719 => Session::London,              // 07:00-11:59
            720..=959 => Session::LondonNewYorkOverlap, // 12:00-15:59
            960..=1_259 => Session::NewYork,           // 16:00-20:59
            1_260..=1_319 => Session::Other,           // 21:00-21:59
            _ => Session::Asia,                        // 22:00-23:59
        };
    }
    table
});
