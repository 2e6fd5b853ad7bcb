//! Property tests for the numeric invariants of the pipeline.
//!
//! Uses proptest to verify:
//! 1. Constant input: time-weighted window reports mean = C, std = 0
//! 2. EWMA convergence bound under irregular time steps
//! 3. Histogram percentile rank is monotone and bounded
//! 4. Monotonic queue head always holds the retained extremum
//! 5. Every emitted trade is well-formed (direction, ordering, outcome)

use proptest::prelude::*;

use ticklab_core::config::{
    EntryConfig, EntryParams, ExitConfig, MetricConfig, MetricParams, StrategyConfig,
};
use ticklab_core::domain::{Outcome, Tick};
use ticklab_core::engine::Backtest;
use ticklab_core::feed::{BrownianFeed, VecSink};
use ticklab_core::metrics::MetricsManager;
use ticklab_core::primitives::{Ewma, EwmaPower, Extremum, MonotonicQueue, TimeRollingWindow, TimeWeightedHistogram};
use ticklab_core::signals::SignalGenerator;

// ── Strategies ───────────────────────────────────────────────────────

fn arb_dt() -> impl Strategy<Value = f64> {
    (0.01..5.0_f64).prop_map(|dt| (dt * 1000.0).round() / 1000.0)
}

fn arb_price() -> impl Strategy<Value = f64> {
    (0.5..2.0_f64).prop_map(|p| (p * 10000.0).round() / 10000.0)
}

// ── 1. Constant input: mean = C, std = 0 ─────────────────────────────

proptest! {
    #[test]
    fn constant_series_has_exact_stats(
        constant in arb_price(),
        dts in prop::collection::vec(arb_dt(), 2..50),
    ) {
        let mut window = TimeRollingWindow::new(60.0);
        let mut t = 0.0;
        let mut prev: Option<f64> = None;
        for dt in dts {
            let sample_dt = prev.map_or(0.0, |p| t - p);
            window.append(t, constant, sample_dt);
            prev = Some(t);
            t += dt;
        }
        let (mean, std) = window.stats();
        prop_assert!((mean - constant).abs() < 1e-9);
        prop_assert!(std < 1e-9);
    }
}

// ── 2. EWMA convergence bound ────────────────────────────────────────

proptest! {
    #[test]
    fn ewma_error_respects_decay_bound(
        target in arb_price(),
        tau in 0.5..30.0_f64,
        dts in prop::collection::vec(arb_dt(), 1..60),
    ) {
        let mut ewma = Ewma::new(tau, EwmaPower::Mean);
        ewma.update(0.0, target); // seeds at t=0, y stays 0
        let y0_err = target.abs();

        let mut t = 0.0;
        let mut elapsed = 0.0;
        let mut prev_err = y0_err;
        for dt in dts {
            t += dt;
            elapsed += dt;
            let y = ewma.update(t, target);
            let err = (y - target).abs();
            // Monotone approach plus the analytic decay bound.
            prop_assert!(err <= prev_err + 1e-12);
            prop_assert!(err <= y0_err * (-elapsed / tau).exp() + 1e-9);
            prev_err = err;
        }
    }
}

// ── 3. Histogram percentile monotonicity ─────────────────────────────

proptest! {
    #[test]
    fn percentile_rank_is_monotone_and_bounded(
        values in prop::collection::vec(0.0..1.0_f64, 1..40),
        probes in prop::collection::vec(-0.5..1.5_f64, 2..20),
    ) {
        let edges: Vec<f64> = (0..=16).map(|i| i as f64 / 16.0).collect();
        let mut hist = TimeWeightedHistogram::new(edges, 1e6);
        for (i, v) in values.iter().enumerate() {
            let start = i as f64;
            hist.add(start, start + 1.0, *v);
        }

        let mut probes = probes;
        probes.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut prev_rank = f64::NEG_INFINITY;
        for x in probes {
            let rank = hist.percentile_rank(x);
            prop_assert!((0.0..=1.0).contains(&rank));
            prop_assert!(rank >= prev_rank - 1e-12);
            prev_rank = rank;
        }
    }
}

// ── 4. Monotonic queue head extremum ─────────────────────────────────

proptest! {
    #[test]
    fn max_queue_head_is_window_maximum(
        steps in prop::collection::vec((arb_dt(), arb_price()), 1..80),
    ) {
        let lookback = 10.0;
        let mut queue = MonotonicQueue::new(Extremum::Max);
        let mut observed: Vec<(f64, f64)> = Vec::new();
        let mut t = 0.0;

        for (dt, price) in steps {
            t += dt;
            queue.append(t, price);
            observed.push((t, price));
            let cutoff = t - lookback;
            queue.trim(cutoff);

            let naive_max = observed
                .iter()
                .filter(|(ts, _)| *ts >= cutoff)
                .map(|(_, p)| *p)
                .fold(f64::NEG_INFINITY, f64::max);
            let head = queue.head().unwrap();
            prop_assert!((head.price - naive_max).abs() < 1e-12);
        }
    }

    #[test]
    fn min_queue_head_is_window_minimum(
        steps in prop::collection::vec((arb_dt(), arb_price()), 1..80),
    ) {
        let lookback = 10.0;
        let mut queue = MonotonicQueue::new(Extremum::Min);
        let mut observed: Vec<(f64, f64)> = Vec::new();
        let mut t = 0.0;

        for (dt, price) in steps {
            t += dt;
            queue.append(t, price);
            observed.push((t, price));
            let cutoff = t - lookback;
            queue.trim(cutoff);

            let naive_min = observed
                .iter()
                .filter(|(ts, _)| *ts >= cutoff)
                .map(|(_, p)| *p)
                .fold(f64::INFINITY, f64::min);
            let head = queue.head().unwrap();
            prop_assert!((head.price - naive_min).abs() < 1e-12);
        }
    }
}

// ── 5. Trade ledger invariants over random walks ─────────────────────

fn reversion_pipeline() -> Backtest {
    let metrics = vec![MetricConfig {
        name: "z".into(),
        enabled: true,
        params: MetricParams::Zscore {
            lookback_seconds: 120.0,
        },
    }];
    let strategy = StrategyConfig {
        name: "prop".into(),
        entry: EntryConfig {
            name: "reversion_entry".into(),
            params: EntryParams::ThresholdReversion {
                lookback_seconds: 300.0,
                threshold_pips: 4.0,
                tp_pips: Some(4.0),
                sl_pips: Some(8.0),
                min_recency_seconds: 0.0,
                trade_timeout_seconds: Some(600.0),
            },
            predicates: vec![],
        },
        exit: ExitConfig {
            name: "exit".into(),
            predicates: vec![],
        },
    };
    let manager = MetricsManager::from_configs(&metrics).unwrap();
    let generator = SignalGenerator::new(&strategy, 0.0001).unwrap();
    Backtest::new("EURUSD", 0.0001, manager, generator, 30.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn random_walk_trades_are_well_formed(seed in 0u64..1000) {
        let mut backtest = reversion_pipeline();
        let mut source = BrownianFeed::new(seed, 0.0, 1.1000, 0.5, 0.0001, 0.00005, 2_000);
        let mut sink = VecSink::default();
        backtest.run(&mut source, &mut sink).unwrap();

        let outcomes = [
            Outcome::Tp,
            Outcome::Sl,
            Outcome::Timeout,
            Outcome::ExitPredicate,
            Outcome::Reversal,
            Outcome::EndOfFeed,
        ];
        let mut prev_exit = None;
        for trade in &sink.trades {
            prop_assert!(trade.entry_time <= trade.exit_time);
            prop_assert!(outcomes.contains(&trade.outcome));
            prop_assert!(trade.pnl_pips.is_finite());
            if let Some(prev) = prev_exit {
                prop_assert!(trade.exit_time >= prev);
            }
            prev_exit = Some(trade.exit_time);
        }
    }
}

// ── Session metric consistency under arbitrary timestamps ────────────

proptest! {
    #[test]
    fn session_label_is_total(seconds in 0u32..86_400) {
        let tick = Tick::new(seconds as f64, 1.0, 1.0001);
        let session = ticklab_core::domain::Session::at(tick.hour, tick.minute);
        let known = ["Asia", "London", "London_New_York_Overlap", "New_York", "Other"];
        prop_assert!(known.contains(&session.label()));
    }
}
