//! Ledger statistics computed from closed trades.

use std::collections::BTreeMap;

use serde::Serialize;

use ticklab_core::domain::TradeRecord;

/// Aggregate statistics over one symbol's trade ledger.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub num_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Fraction of trades with positive pips; NaN with no trades.
    pub win_rate: f64,
    pub total_pips: f64,
    pub mean_pips: f64,
    pub mean_holding_seconds: f64,
    /// Count per outcome label.
    pub outcomes: BTreeMap<String, usize>,
}

impl LedgerStats {
    pub fn from_trades(trades: &[TradeRecord]) -> Self {
        let num_trades = trades.len();
        let wins = trades.iter().filter(|t| t.pnl_pips > 0.0).count();
        let losses = trades.iter().filter(|t| t.pnl_pips < 0.0).count();
        let total_pips: f64 = trades.iter().map(|t| t.pnl_pips).sum();
        let total_holding: f64 = trades.iter().map(|t| t.holding_seconds).sum();

        let mut outcomes = BTreeMap::new();
        for trade in trades {
            *outcomes.entry(trade.outcome.label().to_string()).or_insert(0) += 1;
        }

        let n = num_trades as f64;
        Self {
            num_trades,
            wins,
            losses,
            win_rate: if num_trades > 0 { wins as f64 / n } else { f64::NAN },
            total_pips,
            mean_pips: if num_trades > 0 { total_pips / n } else { f64::NAN },
            mean_holding_seconds: if num_trades > 0 { total_holding / n } else { f64::NAN },
            outcomes,
        }
    }
}
