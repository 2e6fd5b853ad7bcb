//! Reusable incremental estimators.
//!
//! Every primitive is online: O(1) update (amortized for the trimming
//! structures), no per-tick allocation once warm, and a fixed reduction
//! order for the running sums so results are reproducible across platforms.

mod ewma;
mod histogram;
mod monotonic_queue;
mod rolling_window;

pub use ewma::{Ewma, EwmaPower};
pub use histogram::TimeWeightedHistogram;
pub use monotonic_queue::{Extremum, MonotonicQueue, QueueEntry};
pub use rolling_window::TimeRollingWindow;
