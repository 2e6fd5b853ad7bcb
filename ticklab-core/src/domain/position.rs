//! Open position state.
//!
//! The position loop holds at most one of these per symbol; FLAT is the
//! absence of one. Closing consumes the position and produces the trade
//! record, so a trade cannot be emitted without a matching open.

use std::collections::BTreeMap;

use super::trade::{utc_from_epoch, Direction, Outcome, TradeRecord};

/// A live LONG or SHORT position.
#[derive(Debug, Clone)]
pub struct OpenPosition {
    pub direction: Direction,
    /// Epoch seconds of the entry fill.
    pub entry_timestamp: f64,
    pub entry_price: f64,
    /// Take-profit level; `None` disables that exit.
    pub tp_price: Option<f64>,
    /// Stop-loss level; `None` disables that exit.
    pub sl_price: Option<f64>,
    /// Maximum holding time; `None` disables the timeout exit.
    pub timeout_seconds: Option<f64>,
    /// Entry engine's reason string, carried onto the trade record.
    pub reason: String,
    pub entry_metadata: BTreeMap<String, f64>,
}

impl OpenPosition {
    /// Close the position, producing the emitted trade record.
    pub fn into_trade(
        self,
        symbol: &str,
        exit_timestamp: f64,
        exit_price: f64,
        pip_size: f64,
        outcome: Outcome,
    ) -> TradeRecord {
        let pnl_pips = (exit_price - self.entry_price) * self.direction.signum() / pip_size;
        TradeRecord {
            symbol: symbol.to_string(),
            entry_time: utc_from_epoch(self.entry_timestamp),
            exit_time: utc_from_epoch(exit_timestamp),
            direction: self.direction,
            entry_price: self.entry_price,
            exit_price,
            pnl_pips,
            holding_seconds: exit_timestamp - self.entry_timestamp,
            outcome,
            reason: self.reason,
            entry_metadata: self.entry_metadata,
        }
    }

    /// Elapsed holding time at `now`.
    pub fn age_seconds(&self, now: f64) -> f64 {
        now - self.entry_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(direction: Direction, entry_price: f64) -> OpenPosition {
        OpenPosition {
            direction,
            entry_timestamp: 100.0,
            entry_price,
            tp_price: None,
            sl_price: None,
            timeout_seconds: None,
            reason: "test".into(),
            entry_metadata: BTreeMap::new(),
        }
    }

    #[test]
    fn long_pnl_in_pips() {
        let trade = position(Direction::Long, 1.1000).into_trade("EURUSD", 160.0, 1.1010, 0.0001, Outcome::Tp);
        assert!((trade.pnl_pips - 10.0).abs() < 1e-9);
        assert_eq!(trade.holding_seconds, 60.0);
        assert_eq!(trade.outcome, Outcome::Tp);
    }

    #[test]
    fn short_pnl_in_pips() {
        let trade =
            position(Direction::Short, 1.1000).into_trade("EURUSD", 160.0, 1.1010, 0.0001, Outcome::Sl);
        assert!((trade.pnl_pips + 10.0).abs() < 1e-9);
    }

    #[test]
    fn trade_times_come_from_timestamps() {
        let trade = position(Direction::Long, 1.0).into_trade("EURUSD", 100.5, 1.0, 0.0001, Outcome::EndOfFeed);
        assert!(trade.entry_time <= trade.exit_time);
        assert_eq!(trade.exit_time.timestamp_subsec_millis(), 500);
    }
}
