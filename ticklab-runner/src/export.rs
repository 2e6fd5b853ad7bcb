//! Trade ledger export (CSV/JSON).

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use ticklab_core::domain::TradeRecord;

pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("failed to create trades CSV {}", path.display()))?;

    writeln!(
        file,
        "symbol,entry_time,exit_time,direction,entry_price,exit_price,pnl_pips,holding_seconds,outcome,reason"
    )?;

    for trade in trades {
        writeln!(
            file,
            "{},{},{},{},{:.6},{:.6},{:.4},{:.3},{},{}",
            trade.symbol,
            trade.entry_time.to_rfc3339(),
            trade.exit_time.to_rfc3339(),
            trade.direction,
            trade.entry_price,
            trade.exit_price,
            trade.pnl_pips,
            trade.holding_seconds,
            trade.outcome,
            trade.reason,
        )?;
    }

    Ok(())
}

pub fn write_trades_json(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(trades).context("failed to serialize trades")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write trades JSON {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use ticklab_core::domain::{Direction, OpenPosition, Outcome};

    fn sample_trades() -> Vec<TradeRecord> {
        let position = OpenPosition {
            direction: Direction::Long,
            entry_timestamp: 1_420_070_400.0,
            entry_price: 1.1000,
            tp_price: Some(1.1010),
            sl_price: None,
            timeout_seconds: None,
            reason: "reversion_entry".into(),
            entry_metadata: BTreeMap::new(),
        };
        vec![position.into_trade("EURUSD", 1_420_070_460.0, 1.1010, 0.0001, Outcome::Tp)]
    }

    #[test]
    fn csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");
        write_trades_csv(&path, &sample_trades()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("symbol,entry_time"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("EURUSD,"));
        assert!(row.contains("Long"));
        assert!(row.contains("TP"));
        assert!(row.ends_with("reversion_entry"));
    }

    #[test]
    fn json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.json");
        let trades = sample_trades();
        write_trades_json(&path, &trades).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let back: Vec<TradeRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(back, trades);
    }
}
