//! Field configuration.
//!
//! Every tunable of a [`ParticleField`](crate::ParticleField) lives in one
//! [`FieldConfig`], validated once when the field is built. Configs can be
//! built in code with the `with_*` methods or deserialized from JSON; missing
//! JSON keys fall back to [`FieldConfig::default`].
//!
//! # Units
//!
//! Distances are canvas pixels, times are seconds, and the canvas uses
//! screen coordinates (+x right, +y down). Gravity is therefore positive.
//!
//! # Example
//!
//! ```ignore
//! let config = FieldConfig::new(1200.0, 800.0)
//!     .with_max_particles(500)
//!     .with_gravity(20.0)
//!     .with_seed(7);
//! let field = ParticleField::new(config)?;
//! ```

use crate::error::ConfigError;
use crate::particle::{Motion, PulseShape};
use crate::spawn::SpawnRegion;
use crate::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;

/// The seven-color palette used when none is configured.
pub const DEFAULT_PALETTE: [[u8; 3]; 7] = [
    [255, 100, 100],
    [100, 255, 100],
    [100, 100, 255],
    [255, 255, 100],
    [255, 100, 255],
    [100, 255, 255],
    [255, 255, 255],
];

/// Configuration for a [`ParticleField`](crate::ParticleField).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    /// Population cap. Spawning beyond it evicts the oldest particles.
    pub max_particles: usize,
    /// Downward acceleration (px/s²).
    pub gravity: f32,
    /// Fraction of velocity retained after one second, in `(0, 1]`.
    pub friction: f32,
    /// Life lost per second. Must be positive.
    pub life_decay: f32,
    /// Particles further than this outside the canvas are removed.
    pub margin: f32,
    /// Background emission rate (particles per second).
    pub spawn_rate: f32,
    /// Whether the background emitter runs.
    pub background_spawn: bool,
    /// Intensity used for background-emitted particles.
    pub background_intensity: f32,
    /// Particles spawned per unit of beat intensity.
    pub burst_size: f32,
    /// Particles spawned per unit of onset intensity.
    pub onset_burst: f32,
    /// Launch speed at intensity 1.0 (px/s), jittered by ×0.5..1.5.
    pub base_speed: f32,
    /// Center of the launch cone in radians (screen space).
    pub cone_direction: f32,
    /// Half-angle of the launch cone in radians.
    pub cone_spread: f32,
    /// Where beat bursts appear. `None` means the bottom-left strip.
    pub spawn_region: Option<SpawnRegion>,
    /// Range of nominal particle radii.
    pub size_range: (f32, f32),
    /// Range of initial life values.
    pub life_range: (f32, f32),
    /// Colors picked uniformly at spawn.
    pub palette: Vec<[u8; 3]>,
    /// Relative amplitude of the size oscillation, in `[0, 1)`.
    pub pulse_amplitude: f32,
    /// Angular frequency of the size oscillation (rad/s).
    pub pulse_frequency: f32,
    /// Velocity kick per unit of pulse intensity (px/s), jittered by ×0.5..2.0.
    pub pulse_kick: f32,
    /// Upper bound of the pulse boost factor.
    pub max_boost: f32,
    /// Rate at which the pulse boost relaxes back to 1.0 (1/s).
    pub boost_decay: f32,
    /// Fraction of `max_life` restored by each pulse.
    pub pulse_life_bonus: f32,
    /// Particles at or below this size are dead.
    pub death_size: f32,
    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            max_particles: 1000,
            gravity: 30.0,
            friction: 0.5,
            life_decay: 0.4,
            margin: 50.0,
            spawn_rate: 20.0,
            background_spawn: false,
            background_intensity: 0.5,
            burst_size: 5.0,
            onset_burst: 2.0,
            base_speed: 120.0,
            cone_direction: -FRAC_PI_4,
            cone_spread: 0.3,
            spawn_region: None,
            size_range: (2.0, 8.0),
            life_range: (0.8, 1.0),
            palette: DEFAULT_PALETTE.to_vec(),
            pulse_amplitude: 0.3,
            pulse_frequency: 8.0,
            pulse_kick: 30.0,
            max_boost: 4.0,
            boost_decay: 6.0,
            pulse_life_bonus: 0.0,
            death_size: 0.1,
            seed: None,
        }
    }
}

impl FieldConfig {
    /// Default configuration for a canvas of the given size.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Track-driven visualizer: beats launch bursts, no background emission.
    pub fn demo(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            burst_size: 8.0,
            onset_burst: 3.0,
            background_spawn: false,
            ..Default::default()
        }
    }

    /// Free-running metronome mode: larger, longer-lived bursts that fly far.
    pub fn quick(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            max_particles: 300,
            gravity: 72.0,
            friction: 0.97,
            life_decay: 0.4,
            margin: 100.0,
            burst_size: 12.0,
            base_speed: 250.0,
            cone_direction: -FRAC_PI_4 - 0.15,
            cone_spread: 0.45,
            spawn_region: Some(SpawnRegion::new(
                Vec2::new(0.0, height * 0.6),
                Vec2::new(width * 0.25, height),
            )),
            size_range: (2.0, 10.0),
            life_range: (3.0, 3.0),
            pulse_kick: 60.0,
            ..Default::default()
        }
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    /// Set the canvas size.
    pub fn with_canvas(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the population cap.
    pub fn with_max_particles(mut self, max_particles: usize) -> Self {
        self.max_particles = max_particles;
        self
    }

    /// Set gravity (px/s², positive pulls down).
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the fraction of velocity retained per second.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set the life lost per second.
    pub fn with_life_decay(mut self, life_decay: f32) -> Self {
        self.life_decay = life_decay;
        self
    }

    /// Set the out-of-bounds margin.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Enable background emission at `rate` particles per second.
    pub fn with_background_spawn(mut self, rate: f32) -> Self {
        self.background_spawn = true;
        self.spawn_rate = rate;
        self
    }

    /// Set the number of particles per unit of beat intensity.
    pub fn with_burst_size(mut self, burst_size: f32) -> Self {
        self.burst_size = burst_size;
        self
    }

    /// Set where beat bursts appear.
    pub fn with_spawn_region(mut self, region: SpawnRegion) -> Self {
        self.spawn_region = Some(region);
        self
    }

    /// Set the color palette.
    pub fn with_palette(mut self, palette: Vec<[u8; 3]>) -> Self {
        self.palette = palette;
        self
    }

    /// Seed the field's random source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    // =========================================================================
    // DERIVED VALUES
    // =========================================================================

    /// Canvas bounds expanded by `margin`, as `(min, max)`.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let m = Vec2::splat(self.margin);
        (-m, Vec2::new(self.width, self.height) + m)
    }

    /// Burst region, falling back to the bottom-left strip.
    pub fn burst_region(&self) -> SpawnRegion {
        self.spawn_region
            .unwrap_or_else(|| SpawnRegion::bottom_left(self.width, self.height))
    }

    /// Linear drag rate equivalent to `friction`.
    pub fn damping(&self) -> f32 {
        -self.friction.ln()
    }

    pub(crate) fn motion(&self) -> Motion {
        Motion {
            gravity: self.gravity,
            damping: self.damping(),
            life_decay: self.life_decay,
        }
    }

    pub(crate) fn pulse_shape(&self) -> PulseShape {
        PulseShape {
            amplitude: self.pulse_amplitude,
            frequency: self.pulse_frequency,
            boost_decay: self.boost_decay,
            max_boost: self.max_boost,
        }
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Check every option. Called by [`ParticleField::new`](crate::ParticleField::new).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let canvas_ok = |v: f32| v.is_finite() && v > 0.0;
        if !canvas_ok(self.width) || !canvas_ok(self.height) {
            return Err(ConfigError::InvalidCanvas {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_particles == 0 {
            return Err(ConfigError::ZeroMaxParticles);
        }
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        finite("gravity", self.gravity)?;
        finite("cone_direction", self.cone_direction)?;
        finite("cone_spread", self.cone_spread)?;
        finite("pulse_frequency", self.pulse_frequency)?;

        // at 1 or more the oscillation reaches zero size and kills particles
        if !(self.pulse_amplitude >= 0.0 && self.pulse_amplitude < 1.0) {
            return Err(invalid("pulse_amplitude", self.pulse_amplitude));
        }
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(invalid("friction", self.friction));
        }
        positive("life_decay", self.life_decay)?;
        positive("death_size", self.death_size)?;
        positive("max_boost", self.max_boost)?;
        non_negative("margin", self.margin)?;
        non_negative("spawn_rate", self.spawn_rate)?;
        non_negative("background_intensity", self.background_intensity)?;
        non_negative("burst_size", self.burst_size)?;
        non_negative("onset_burst", self.onset_burst)?;
        non_negative("base_speed", self.base_speed)?;
        non_negative("pulse_kick", self.pulse_kick)?;
        non_negative("boost_decay", self.boost_decay)?;
        non_negative("pulse_life_bonus", self.pulse_life_bonus)?;

        range("size_range", self.size_range)?;
        range("life_range", self.life_range)?;

        if let Some(region) = &self.spawn_region {
            if !region.min.is_finite() || !region.max.is_finite() {
                return Err(invalid("spawn_region", f32::NAN));
            }
        }

        Ok(())
    }
}

fn invalid(name: &'static str, value: f32) -> ConfigError {
    ConfigError::InvalidParameter { name, value }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, value))
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value))
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value))
    }
}

/// A `(min, max)` pair with `0 < min <= max`.
fn range(name: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    positive(name, min)?;
    positive(name, max)?;
    if min > max {
        return Err(invalid(name, min));
    }
    Ok(())
}
