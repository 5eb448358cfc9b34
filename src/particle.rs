//! The particle value type and its per-tick physics.
//!
//! Particles are plain values owned by a [`ParticleField`](crate::ParticleField).
//! A particle is alive while `life > 0` and its rendered `size` stays above the
//! field's death threshold; once dead it is only ever removed.
//!
//! # Integration
//!
//! Motion is integrated in closed form for constant gravity and exponential
//! friction (see [`integrate`]). Advancing by `dt` gives the same state as two
//! advances by `dt / 2`, so trajectories do not depend on the frame rate.

use crate::Vec2;

/// Below this damping rate friction is treated as absent.
const DAMPING_EPSILON: f32 = 1e-6;

/// A single point-like emitter.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Position in canvas pixels (+y down).
    pub position: Vec2,
    /// Velocity in pixels per second.
    pub velocity: Vec2,
    /// Rendered radius, recomputed every tick.
    pub size: f32,
    /// RGB color, fixed at creation.
    pub color: [u8; 3],
    /// Remaining life in the same unit as `max_life`.
    pub life: f32,
    /// Seconds since spawn. Phases the size oscillation.
    pub age: f32,
    /// Transient pulse factor, relaxes back to 1.0.
    pub boost: f32,
    base_size: f32,
    max_life: f32,
}

/// Size oscillation and pulse parameters shared by every particle in a field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseShape {
    /// Relative amplitude of the size oscillation.
    pub amplitude: f32,
    /// Angular frequency of the size oscillation (rad/s).
    pub frequency: f32,
    /// Rate at which `boost` relaxes towards 1.0 (1/s).
    pub boost_decay: f32,
    /// Upper bound for `boost`.
    pub max_boost: f32,
}

impl PulseShape {
    /// Oscillation factor at a given age.
    #[inline]
    pub fn oscillation(&self, age: f32) -> f32 {
        1.0 + self.amplitude * (age * self.frequency).sin()
    }
}

/// Forces applied during [`Particle::advance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Downward acceleration (px/s²).
    pub gravity: f32,
    /// Linear drag rate (1/s), `-ln(friction)`.
    pub damping: f32,
    /// Life lost per second.
    pub life_decay: f32,
}

impl Particle {
    /// Create a fresh particle with full life and no pulse boost.
    pub fn new(position: Vec2, velocity: Vec2, base_size: f32, color: [u8; 3], max_life: f32) -> Self {
        Self {
            position,
            velocity,
            size: base_size,
            color,
            life: max_life,
            age: 0.0,
            boost: 1.0,
            base_size,
            max_life,
        }
    }

    /// Nominal radius set at creation.
    #[inline]
    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    /// Life at creation.
    #[inline]
    pub fn max_life(&self) -> f32 {
        self.max_life
    }

    /// Remaining life as a fraction of `max_life`, in `[0, 1]`.
    #[inline]
    pub fn life_fraction(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Alive iff life remains and the rendered size exceeds `death_size`.
    #[inline]
    pub fn is_alive(&self, death_size: f32) -> bool {
        self.life > 0.0 && self.size > death_size
    }

    /// Whether the position lies inside `[min, max]`.
    #[inline]
    pub fn is_within(&self, min: Vec2, max: Vec2) -> bool {
        self.position.cmpge(min).all() && self.position.cmple(max).all()
    }

    /// Recompute `size` from base size, oscillation, boost and life.
    pub fn refresh_size(&mut self, shape: &PulseShape) {
        let size = self.base_size * shape.oscillation(self.age) * self.boost * self.life_fraction();
        self.size = size.max(0.0);
    }

    /// Advance one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f32, motion: &Motion, shape: &PulseShape) {
        let (position, velocity) =
            integrate(self.position, self.velocity, motion.gravity, motion.damping, dt);
        self.position = position;
        self.velocity = velocity;

        self.age += dt;
        self.life -= motion.life_decay * dt;
        self.boost = 1.0 + (self.boost - 1.0) * (-shape.boost_decay * dt).exp();
        self.refresh_size(shape);
    }

    /// Apply a beat pulse: scale the boost, kick the velocity, optionally
    /// extend life by `life_bonus × max_life`.
    pub fn pulse(&mut self, intensity: f32, kick: Vec2, life_bonus: f32, shape: &PulseShape) {
        self.boost = (self.boost * intensity).min(shape.max_boost);
        self.velocity += kick;
        if life_bonus > 0.0 {
            self.life = (self.life + life_bonus * self.max_life).min(self.max_life);
        }
        self.refresh_size(shape);
    }
}

/// Advance `(position, velocity)` by `dt` under constant downward `gravity`
/// and linear drag `damping`.
///
/// Solves `dv/dt = g - k·v` exactly, so the result composes:
/// `integrate(dt)` equals `integrate(dt/2)` applied twice.
pub fn integrate(position: Vec2, velocity: Vec2, gravity: f32, damping: f32, dt: f32) -> (Vec2, Vec2) {
    let accel = Vec2::new(0.0, gravity);

    if damping <= DAMPING_EPSILON {
        let v = velocity + accel * dt;
        let p = position + velocity * dt + accel * (0.5 * dt * dt);
        return (p, v);
    }

    let terminal = accel / damping;
    let decay = (-damping * dt).exp();
    // (1 - e^(-k·dt)) / k
    let gain = -(-damping * dt).exp_m1() / damping;

    let v = terminal + (velocity - terminal) * decay;
    let p = position + terminal * dt + (velocity - terminal) * gain;
    (p, v)
}
