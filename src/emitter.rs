//! Continuous background emission.
//!
//! Beat bursts are event driven; the background emitter instead trickles
//! particles in at a steady rate so the canvas is never empty between beats.
//! Emission is accumulated in seconds, so a 30 fps and a 144 fps loop emit
//! the same number of particles over the same wall time.
//!
//! # Example
//!
//! ```ignore
//! let mut emitter = BackgroundEmitter::new(20.0, true);
//! let n = emitter.emit(1.0 / 60.0); // usually 0, sometimes 1
//! ```

/// Rate-based emitter with fractional carry between ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundEmitter {
    rate: f32,
    enabled: bool,
    carry: f32,
}

impl BackgroundEmitter {
    /// Create an emitter producing `rate` particles per second when enabled.
    pub fn new(rate: f32, enabled: bool) -> Self {
        Self {
            rate: rate.max(0.0),
            enabled,
            carry: 0.0,
        }
    }

    /// Particles per second.
    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Whether the emitter is running.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Change the rate. Negative rates clamp to zero.
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = if rate.is_finite() { rate.max(0.0) } else { 0.0 };
    }

    /// Turn the emitter on or off. Turning it off drops any partial particle.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.carry = 0.0;
        }
    }

    /// Advance by `dt` seconds and return how many particles to spawn now.
    pub fn emit(&mut self, dt: f32) -> usize {
        if !self.enabled || self.rate <= 0.0 || !(dt > 0.0) {
            return 0;
        }
        self.carry += self.rate * dt;
        let whole = self.carry.floor();
        self.carry -= whole;
        whole as usize
    }
}
