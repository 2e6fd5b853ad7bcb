//! Continuous-time exponential smoother.
//!
//! Irregular tick spacing is handled by deriving the decay from the actual
//! elapsed time: `decay = exp(-dt / tau)`, `y <- decay * y + (1 - decay) * v`
//! where `v` is the raw input (power 1) or its square (power 2). The square
//! form is the variance estimator behind `ewma_vol`.

/// Which power of the input the smoother tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EwmaPower {
    /// Smooth the input itself.
    Mean,
    /// Smooth the squared input (second moment).
    MeanSquare,
}

/// Time-decayed exponential moving average.
#[derive(Debug, Clone)]
pub struct Ewma {
    tau: f64,
    power: EwmaPower,
    y: f64,
    last_t: Option<f64>,
}

impl Ewma {
    pub fn new(tau_seconds: f64, power: EwmaPower) -> Self {
        assert!(tau_seconds > 0.0, "tau_seconds must be positive, got {tau_seconds}");
        Self {
            tau: tau_seconds,
            power,
            y: 0.0,
            last_t: None,
        }
    }

    /// Fold in an observation at time `t`, returning the updated value.
    ///
    /// The first call only seeds the clock and returns the zero-initialized
    /// value; smoothing starts with the second observation.
    pub fn update(&mut self, t: f64, x: f64) -> f64 {
        let Some(last_t) = self.last_t else {
            self.last_t = Some(t);
            return self.y;
        };

        let dt = (t - last_t).max(1e-9);
        let decay = (-dt / self.tau).exp();
        let v = match self.power {
            EwmaPower::Mean => x,
            EwmaPower::MeanSquare => x * x,
        };
        self.y = decay * self.y + (1.0 - decay) * v;
        self.last_t = Some(t);
        self.y
    }

    pub fn value(&self) -> f64 {
        self.y
    }

    pub fn reset(&mut self) {
        self.y = 0.0;
        self.last_t = None;
    }
}
