//! Multi-symbol run coordinator.
//!
//! Each symbol gets an independent pipeline instance built fresh from the
//! shared config; no state crosses symbol boundaries. A symbol failure is
//! recorded and the batch continues.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{error, info, info_span};

use ticklab_core::domain::TradeRecord;
use ticklab_core::engine::{Backtest, RunSummary};
use ticklab_core::feed::{FeedError, TickSource, ValidatingSource, ValidationStats, VecSink};
use ticklab_core::metrics::MetricsManager;
use ticklab_core::signals::SignalGenerator;

use crate::config::RunConfig;

/// Per-symbol result of a completed backtest.
#[derive(Debug)]
pub struct SymbolOutcome {
    pub summary: RunSummary,
    pub trades: Vec<TradeRecord>,
    pub validation: ValidationStats,
}

/// Batch result: completed symbols and isolated failures.
#[derive(Debug, Default)]
pub struct RunReport {
    pub completed: BTreeMap<String, SymbolOutcome>,
    pub failures: BTreeMap<String, String>,
}

/// Supplies a tick source per symbol. The coordinator owns no IO itself.
pub trait SourceFactory {
    fn open(&mut self, symbol: &str) -> Result<Box<dyn TickSource>, FeedError>;
}

impl<F> SourceFactory for F
where
    F: FnMut(&str) -> Result<Box<dyn TickSource>, FeedError>,
{
    fn open(&mut self, symbol: &str) -> Result<Box<dyn TickSource>, FeedError> {
        self(symbol)
    }
}

pub struct Coordinator {
    config: RunConfig,
}

impl Coordinator {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Run every configured symbol sequentially.
    pub fn run(&self, sources: &mut dyn SourceFactory) -> RunReport {
        let mut report = RunReport::default();
        info!(symbols = self.config.symbols.len(), "starting backtest batch");

        for symbol in &self.config.symbols {
            let span = info_span!("symbol_backtest", symbol = %symbol);
            let _guard = span.enter();

            match self.run_symbol(symbol, sources) {
                Ok(outcome) => {
                    info!(
                        trades = outcome.trades.len(),
                        ticks = outcome.summary.ticks_processed,
                        "completed symbol backtest"
                    );
                    report.completed.insert(symbol.clone(), outcome);
                }
                Err(err) => {
                    error!(error = %err, "symbol backtest failed; continuing batch");
                    report.failures.insert(symbol.clone(), format!("{err:#}"));
                }
            }
        }

        info!(
            completed = report.completed.len(),
            failed = report.failures.len(),
            "backtest batch finished"
        );
        report
    }

    fn run_symbol(&self, symbol: &str, sources: &mut dyn SourceFactory) -> Result<SymbolOutcome> {
        let raw_source = sources
            .open(symbol)
            .with_context(|| format!("opening tick source for {symbol}"))?;
        let mut source = ValidatingSource::new(raw_source);

        let manager = MetricsManager::from_configs(&self.config.metrics)
            .context("building metrics manager")?;
        let generator = SignalGenerator::new(&self.config.strategy, self.config.pip_size)
            .context("building signal generator")?;

        let mut backtest = Backtest::new(
            symbol,
            self.config.pip_size,
            manager,
            generator,
            self.config.warmup_seconds,
        );

        let mut sink = VecSink::default();
        let summary = backtest
            .run(&mut source, &mut sink)
            .with_context(|| format!("running backtest for {symbol}"))?;

        Ok(SymbolOutcome {
            summary,
            trades: sink.trades,
            validation: source.into_stats(),
        })
    }
}
