//! Sequential per-symbol position loop.
//!
//! Per tick, in fixed order: metrics update (declaration order), exit
//! evaluation, entry evaluation. Exits rank TP, SL, timeout, then exit
//! predicates. Fills are side-aware: a long enters at the ask and exits at
//! the bid, a short enters at the bid and exits at the ask.
//!
//! The entry engine is advanced every tick. An open request against an
//! opposite-direction position closes it with outcome REVERSAL and opens
//! the new position on the same tick; a same-direction request while open
//! is ignored. On feed exhaustion any open position is force-closed at the
//! last known quote with outcome END_OF_FEED.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{Direction, OpenPosition, Outcome, Tick};
use crate::feed::{FeedError, TickSource, TradeSink};
use crate::metrics::MetricsManager;
use crate::signals::{SignalData, SignalGenerator};

use super::warmup::WarmupState;

/// Fatal loop failure. Feed errors and invariant violations abort this
/// symbol only; the coordinator keeps other symbols running.
#[derive(Debug, Error)]
pub enum BacktestError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks_processed: u64,
    pub warmup_ticks: u64,
    pub trades_emitted: u64,
}

/// Single-symbol backtest driver.
pub struct Backtest {
    symbol: String,
    pip_size: f64,
    manager: MetricsManager,
    generator: SignalGenerator,
    warmup: WarmupState,
    position: Option<OpenPosition>,
    last_tick: Option<Tick>,
    summary: RunSummary,
}

impl Backtest {
    pub fn new(
        symbol: impl Into<String>,
        pip_size: f64,
        manager: MetricsManager,
        generator: SignalGenerator,
        warmup_seconds: f64,
    ) -> Self {
        assert!(pip_size > 0.0, "pip_size must be positive, got {pip_size}");
        Self {
            symbol: symbol.into(),
            pip_size,
            manager,
            generator,
            warmup: WarmupState::new(warmup_seconds),
            position: None,
            last_tick: None,
            summary: RunSummary::default(),
        }
    }

    /// Drain the source, emitting trades into the sink as they close.
    pub fn run(
        &mut self,
        source: &mut dyn TickSource,
        sink: &mut dyn TradeSink,
    ) -> Result<RunSummary, BacktestError> {
        while let Some(tick) = source.next_tick()? {
            self.process_tick(&tick, sink)?;
        }
        self.finish(sink)?;
        Ok(self.summary)
    }

    /// One step of the loop; exposed for incremental drivers and tests.
    pub fn process_tick(
        &mut self,
        tick: &Tick,
        sink: &mut dyn TradeSink,
    ) -> Result<(), BacktestError> {
        self.summary.ticks_processed += 1;
        self.last_tick = Some(*tick);

        let is_warmup = self.warmup.observe(tick.timestamp);
        self.manager.update_all(tick);
        let signal = self.generator.update(tick, self.manager.snapshot(), is_warmup);

        if is_warmup {
            self.summary.warmup_ticks += 1;
            return Ok(());
        }

        if self.position.is_some() {
            self.evaluate_exits(tick, &signal, sink)?;
        }

        // Engine fired against a live position: opposite direction closes
        // it as a reversal, same direction is a duplicate request.
        if let Some(position) = &self.position {
            if signal.should_open {
                if signal.direction.is_some() && signal.direction != Some(position.direction) {
                    let exit_price = Self::exit_price(position.direction, tick);
                    self.close_position(tick.timestamp, exit_price, Outcome::Reversal, sink)?;
                } else {
                    debug!(
                        symbol = %self.symbol,
                        reason = %signal.reason,
                        "open signal ignored while same-direction position active"
                    );
                }
            }
        }

        if self.position.is_none() && signal.should_open {
            self.open_position(tick, &signal)?;
        }

        Ok(())
    }

    /// Force-close any open position at the last known quote.
    pub fn finish(&mut self, sink: &mut dyn TradeSink) -> Result<(), BacktestError> {
        if let (Some(position), Some(last)) = (&self.position, &self.last_tick) {
            let exit_price = Self::exit_price(position.direction, last);
            let exit_timestamp = last.timestamp;
            self.close_position(exit_timestamp, exit_price, Outcome::EndOfFeed, sink)?;
        }
        Ok(())
    }

    fn evaluate_exits(
        &mut self,
        tick: &Tick,
        signal: &SignalData,
        sink: &mut dyn TradeSink,
    ) -> Result<(), BacktestError> {
        let Some(position) = &self.position else {
            return Ok(());
        };

        let outcome = Self::pick_exit(position, tick, signal);
        if let Some(outcome) = outcome {
            let exit_price = Self::exit_price(position.direction, tick);
            self.close_position(tick.timestamp, exit_price, outcome, sink)?;
        }
        Ok(())
    }

    /// Exit ladder: TP, SL, timeout, exit predicates.
    fn pick_exit(position: &OpenPosition, tick: &Tick, signal: &SignalData) -> Option<Outcome> {
        let tp_hit = position.tp_price.is_some_and(|tp| match position.direction {
            Direction::Long => tick.bid >= tp,
            Direction::Short => tick.ask <= tp,
        });
        if tp_hit {
            return Some(Outcome::Tp);
        }

        let sl_hit = position.sl_price.is_some_and(|sl| match position.direction {
            Direction::Long => tick.bid <= sl,
            Direction::Short => tick.ask >= sl,
        });
        if sl_hit {
            return Some(Outcome::Sl);
        }

        let timed_out = position
            .timeout_seconds
            .is_some_and(|timeout| position.age_seconds(tick.timestamp) >= timeout);
        if timed_out {
            return Some(Outcome::Timeout);
        }

        if signal.should_close {
            return Some(Outcome::ExitPredicate);
        }

        None
    }

    fn exit_price(direction: Direction, tick: &Tick) -> f64 {
        match direction {
            Direction::Long => tick.bid,
            Direction::Short => tick.ask,
        }
    }

    fn open_position(&mut self, tick: &Tick, signal: &SignalData) -> Result<(), BacktestError> {
        if self.position.is_some() {
            return Err(BacktestError::InvariantViolation(format!(
                "open requested for {} while a position is active",
                self.symbol
            )));
        }
        let Some(direction) = signal.direction else {
            return Err(BacktestError::InvariantViolation(format!(
                "open signal without direction for {}",
                self.symbol
            )));
        };

        let entry_price = match direction {
            Direction::Long => tick.ask,
            Direction::Short => tick.bid,
        };

        let tp_price = Self::resolve_level(signal.tp, signal.tp_pips, entry_price, direction, self.pip_size, true);
        let sl_price = Self::resolve_level(signal.sl, signal.sl_pips, entry_price, direction, self.pip_size, false);

        self.position = Some(OpenPosition {
            direction,
            entry_timestamp: tick.timestamp,
            entry_price,
            tp_price,
            sl_price,
            timeout_seconds: signal.timeout_seconds,
            reason: signal.reason.clone(),
            entry_metadata: signal.entry_metadata.clone(),
        });
        Ok(())
    }

    /// Adopt an engine-supplied level when finite, otherwise recompute from
    /// the pip distance off the actual entry fill.
    fn resolve_level(
        level: Option<f64>,
        pips: Option<f64>,
        entry_price: f64,
        direction: Direction,
        pip_size: f64,
        is_tp: bool,
    ) -> Option<f64> {
        if let Some(level) = level {
            if level.is_finite() {
                return Some(level);
            }
        }
        let pips = pips.filter(|p| p.is_finite() && *p > 0.0)?;
        let offset = pips * pip_size;
        let sign = if is_tp {
            direction.signum()
        } else {
            -direction.signum()
        };
        Some(entry_price + sign * offset)
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        self.position.as_ref()
    }

    pub fn snapshot(&self) -> &crate::metrics::Snapshot {
        self.manager.snapshot()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    fn close_position(
        &mut self,
        exit_timestamp: f64,
        exit_price: f64,
        outcome: Outcome,
        sink: &mut dyn TradeSink,
    ) -> Result<(), BacktestError> {
        let position = self.position.take().ok_or_else(|| {
            BacktestError::InvariantViolation(format!(
                "close requested for {} without an open position",
                self.symbol
            ))
        })?;
        let trade = position.into_trade(&self.symbol, exit_timestamp, exit_price, self.pip_size, outcome);
        self.summary.trades_emitted += 1;
        sink.emit(trade);
        Ok(())
    }
}
