//! Feed boundary: tick producers, trade sinks, validation, fixtures.

mod synthetic;
mod validation;

pub use synthetic::BrownianFeed;
pub use validation::{TickValidator, ValidatingSource, ValidationStats};

use thiserror::Error;

use crate::domain::{Tick, TradeRecord};

/// Producer-side failure. The core reports these up without recovery; the
/// coordinator isolates the affected symbol.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("tick source failed: {0}")]
    Source(String),
}

/// A sequential tick producer. `Ok(None)` signals end of feed.
pub trait TickSource {
    fn next_tick(&mut self) -> Result<Option<Tick>, FeedError>;
}

impl<S: TickSource + ?Sized> TickSource for Box<S> {
    fn next_tick(&mut self) -> Result<Option<Tick>, FeedError> {
        (**self).next_tick()
    }
}

/// Consumer of closed trades. Must accept every record synchronously;
/// emission order equals chronological exit order.
pub trait TradeSink {
    fn emit(&mut self, trade: TradeRecord);
}

/// In-memory tick source over a prepared vector.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    ticks: Vec<Tick>,
    next: usize,
}

impl VecSource {
    pub fn new(ticks: Vec<Tick>) -> Self {
        Self { ticks, next: 0 }
    }
}

impl TickSource for VecSource {
    fn next_tick(&mut self) -> Result<Option<Tick>, FeedError> {
        let tick = self.ticks.get(self.next).copied();
        if tick.is_some() {
            self.next += 1;
        }
        Ok(tick)
    }
}

/// Collecting trade sink.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    pub trades: Vec<TradeRecord>,
}

impl TradeSink for VecSink {
    fn emit(&mut self, trade: TradeRecord) {
        self.trades.push(trade);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_source_drains_in_order() {
        let ticks = vec![Tick::new(0.0, 1.0, 1.0), Tick::new(1.0, 2.0, 2.0)];
        let mut source = VecSource::new(ticks);
        assert_eq!(source.next_tick().unwrap().unwrap().timestamp, 0.0);
        assert_eq!(source.next_tick().unwrap().unwrap().timestamp, 1.0);
        assert!(source.next_tick().unwrap().is_none());
        assert!(source.next_tick().unwrap().is_none());
    }
}
