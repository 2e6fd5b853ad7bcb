//! Monotonic min/max queue over a sliding time window.
//!
//! Appending pops dominated tail entries (smaller-or-equal for a max queue,
//! greater-or-equal for a min queue) so the head always holds the extremum
//! of the retained span. `find_candidate` walks backwards from the
//! second-newest entry looking for the first retained extremum that is both
//! far enough from the current price and old enough to trust.

use std::collections::VecDeque;

/// Which extremum the queue tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

/// Timestamped price entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueEntry {
    pub t: f64,
    pub price: f64,
}

/// Sliding-window monotonic deque of (timestamp, price).
#[derive(Debug, Clone)]
pub struct MonotonicQueue {
    kind: Extremum,
    entries: VecDeque<QueueEntry>,
}

impl MonotonicQueue {
    pub fn new(kind: Extremum) -> Self {
        Self {
            kind,
            entries: VecDeque::new(),
        }
    }

    /// Append a price observation, evicting dominated tail entries first.
    /// Non-finite prices are skipped silently.
    pub fn append(&mut self, t: f64, price: f64) {
        if !(t.is_finite() && price.is_finite()) {
            return;
        }
        while let Some(tail) = self.entries.back() {
            let dominated = match self.kind {
                Extremum::Max => tail.price <= price,
                Extremum::Min => tail.price >= price,
            };
            if dominated {
                self.entries.pop_back();
            } else {
                break;
            }
        }
        self.entries.push_back(QueueEntry { t, price });
    }

    /// Drop head entries observed before `cutoff`.
    pub fn trim(&mut self, cutoff: f64) {
        while let Some(head) = self.entries.front() {
            if head.t < cutoff {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// The retained extremum, oldest such observation.
    pub fn head(&self) -> Option<QueueEntry> {
        self.entries.front().copied()
    }

    /// Newest retained entry that is at least `threshold` away from
    /// `current_price` (below it for a min queue, above it for a max queue)
    /// and at least `min_age` seconds old at `now`.
    ///
    /// The scan starts at the second-newest entry: the newest one is the
    /// observation just appended for the current tick and can never be its
    /// own reference.
    pub fn find_candidate(
        &self,
        current_price: f64,
        threshold: f64,
        now: f64,
        min_age: f64,
    ) -> Option<QueueEntry> {
        let len = self.entries.len();
        for idx in (0..len.saturating_sub(1)).rev() {
            let entry = self.entries[idx];
            let displaced = match self.kind {
                Extremum::Min => current_price - entry.price >= threshold,
                Extremum::Max => entry.price - current_price >= threshold,
            };
            if displaced && now - entry.t >= min_age {
                return Some(entry);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
