//! The per-symbol backtest engine: warmup gate and position loop.

mod backtest;
mod warmup;

pub use backtest::{Backtest, BacktestError, RunSummary};
pub use warmup::WarmupState;
