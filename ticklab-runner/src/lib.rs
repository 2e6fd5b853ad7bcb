//! TickLab Runner
//!
//! Orchestrates ticklab-core pipelines across symbols: one independent
//! pipeline instance per symbol, failure isolation between them, ledger
//! statistics, and trade export.

pub mod config;
pub mod coordinator;
pub mod export;
pub mod report;

/// Install a fmt subscriber honoring `RUST_LOG`. Safe to call twice; the
/// second call is a no-op.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
