//! Seeded Brownian-motion tick fixture.
//!
//! Deterministic for a given seed: the generator is the only source of
//! randomness in the workspace and it is always seeded explicitly, so
//! fixture-driven tests and benches reproduce bit-for-bit.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::domain::Tick;

use super::{FeedError, TickSource};

/// Brownian mid-price walk quoted with a constant spread.
#[derive(Debug, Clone)]
pub struct BrownianFeed {
    rng: ChaCha8Rng,
    timestamp: f64,
    tick_interval: f64,
    mid: f64,
    vol_per_tick: f64,
    spread: f64,
    remaining: usize,
}

impl BrownianFeed {
    /// `vol_per_tick` is the standard deviation of each mid increment.
    pub fn new(
        seed: u64,
        start_timestamp: f64,
        start_mid: f64,
        tick_interval: f64,
        vol_per_tick: f64,
        spread: f64,
        ticks: usize,
    ) -> Self {
        assert!(tick_interval > 0.0, "tick_interval must be positive");
        assert!(start_mid > 0.0, "start_mid must be positive");
        assert!(spread >= 0.0, "spread must be non-negative");
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            timestamp: start_timestamp,
            tick_interval,
            mid: start_mid,
            vol_per_tick,
            spread,
            remaining: ticks,
        }
    }
}

impl TickSource for BrownianFeed {
    fn next_tick(&mut self) -> Result<Option<Tick>, FeedError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        let step: f64 = self.rng.sample(StandardNormal);
        self.mid = (self.mid + step * self.vol_per_tick).max(self.vol_per_tick);
        self.timestamp += self.tick_interval;

        let half_spread = 0.5 * self.spread;
        Ok(Some(Tick::new(
            self.timestamp,
            self.mid - half_spread,
            self.mid + half_spread,
        )))
    }
}
