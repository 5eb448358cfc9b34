//! The particle field: owner of the particle population.
//!
//! A [`ParticleField`] holds an insertion-ordered, capped collection of
//! [`Particle`]s and advances them once per display frame. External stimuli
//! enter through three mutators:
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`spawn`](ParticleField::spawn) | Add particles in a region, launched up the cone |
//! | [`pulse`](ParticleField::pulse) | Boost size and kick velocity of every alive particle |
//! | [`clear`](ParticleField::clear) | Drop every particle |
//!
//! [`update`](ParticleField::update) integrates physics, decays life, runs the
//! background emitter, and removes dead or escaped particles in one
//! `retain` pass.
//!
//! # Eviction
//!
//! The population never exceeds `max_particles`. When a spawn would overflow,
//! the oldest particles are evicted first, so the newest spawn is always kept.
//!
//! # Example
//!
//! ```ignore
//! let mut field = ParticleField::new(FieldConfig::new(800.0, 600.0).with_seed(1))?;
//! field.beat_response(1.5);
//! for _ in 0..60 {
//!     field.update(1.0 / 60.0);
//! }
//! println!("{:?}", field.stats());
//! ```

use crate::config::FieldConfig;
use crate::emitter::BackgroundEmitter;
use crate::error::ConfigError;
use crate::particle::Particle;
use crate::spawn::{SpawnContext, SpawnRegion};
use crate::vertex::ParticleVertex;
use log::{debug, warn};
use std::collections::VecDeque;

/// Read-only population snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldStats {
    /// Particles that are currently alive.
    pub alive_particles: usize,
    /// Particles held by the field, alive or awaiting removal.
    pub total_particles: usize,
    /// Mean remaining life fraction over alive particles (0 if none).
    pub mean_life_fraction: f32,
}

/// A frame-driven particle simulation.
pub struct ParticleField {
    config: FieldConfig,
    particles: VecDeque<Particle>,
    rng: SpawnContext,
    background: BackgroundEmitter,
}

impl ParticleField {
    /// Build a field from a validated configuration.
    pub fn new(config: FieldConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let background = BackgroundEmitter::new(config.spawn_rate, config.background_spawn);
        let rng = SpawnContext::new(config.seed);
        debug!(
            "particle field {}x{} (max {} particles, seed {:?})",
            config.width, config.height, config.max_particles, config.seed
        );

        Ok(Self {
            particles: VecDeque::with_capacity(config.max_particles.min(4096)),
            config,
            rng,
            background,
        })
    }

    /// The configuration this field runs with, including setter changes.
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Canvas width.
    #[inline]
    pub fn width(&self) -> f32 {
        self.config.width
    }

    /// Canvas height.
    #[inline]
    pub fn height(&self) -> f32 {
        self.config.height
    }

    /// Number of particles held, alive or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the field holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles in insertion order, oldest first.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.particles.iter()
    }

    /// Alive particles in insertion order.
    pub fn alive(&self) -> impl Iterator<Item = &Particle> + '_ {
        let death_size = self.config.death_size;
        self.particles.iter().filter(move |p| p.is_alive(death_size))
    }

    // =========================================================================
    // MUTATORS
    // =========================================================================

    /// Spawn `count` particles inside `region`, launched with speed scaled
    /// by `intensity`.
    ///
    /// Evicts the oldest particles so the population stays within
    /// `max_particles`; if `count` alone exceeds the cap only the newest
    /// `max_particles` are created. Negative or NaN intensity launches
    /// particles at rest. Returns the number of particles inserted.
    pub fn spawn(&mut self, count: usize, region: SpawnRegion, intensity: f32) -> usize {
        let max = self.config.max_particles;
        let keep = count.min(max);
        if keep == 0 {
            return 0;
        }
        let intensity = if intensity.is_finite() { intensity.max(0.0) } else { 0.0 };

        let overflow = (self.particles.len() + keep).saturating_sub(max);
        if overflow > 0 {
            self.particles.drain(..overflow);
            debug!("evicted {} oldest particles", overflow);
        }

        for _ in 0..keep {
            let particle = self.make_particle(&region, intensity);
            self.particles.push_back(particle);
        }
        keep
    }

    /// Apply a pulse of `intensity` to every alive particle.
    ///
    /// Scales each particle's boost (bounded by `max_boost`), recomputes its
    /// size, and adds a random velocity kick proportional to `intensity`.
    /// Zero, negative or non-finite intensity is a no-op. Returns the number
    /// of particles affected.
    pub fn pulse(&mut self, intensity: f32) -> usize {
        if !(intensity.is_finite() && intensity > 0.0) {
            return 0;
        }

        let shape = self.config.pulse_shape();
        let death_size = self.config.death_size;
        let kick = self.config.pulse_kick * intensity;
        let life_bonus = self.config.pulse_life_bonus;
        let rng = &mut self.rng;

        let mut affected = 0;
        for particle in self.particles.iter_mut().filter(|p| p.is_alive(death_size)) {
            let impulse = rng.random_direction() * rng.random_range(0.5, 2.0) * kick;
            particle.pulse(intensity, impulse, life_bonus, &shape);
            affected += 1;
        }
        affected
    }

    /// Drop every particle.
    pub fn clear(&mut self) {
        debug!("clearing {} particles", self.particles.len());
        self.particles.clear();
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// `dt = 0` is a valid tick that only removes particles already dead or
    /// out of bounds. Negative or non-finite `dt` is treated as zero.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!("ignoring invalid frame delta {}", dt);
            0.0
        };

        if dt > 0.0 {
            let motion = self.config.motion();
            let shape = self.config.pulse_shape();
            let death_size = self.config.death_size;

            for particle in self.particles.iter_mut().filter(|p| p.is_alive(death_size)) {
                particle.advance(dt, &motion, &shape);
            }

            let emitted = self.background.emit(dt);
            if emitted > 0 {
                let region = self.config.burst_region();
                let intensity = self.config.background_intensity;
                self.spawn(emitted, region, intensity);
            }
        }

        let death_size = self.config.death_size;
        let (min, max) = self.config.bounds();
        self.particles
            .retain(|p| p.is_alive(death_size) && p.is_within(min, max));
    }

    // =========================================================================
    // BEAT RESPONSES
    // =========================================================================

    /// Particles a beat of `intensity` spawns: `floor(burst_size × intensity)`.
    pub fn burst_count(&self, intensity: f32) -> usize {
        scaled_count(self.config.burst_size, intensity)
    }

    /// Particles an onset of `intensity` spawns: `floor(onset_burst × intensity)`.
    pub fn onset_count(&self, intensity: f32) -> usize {
        scaled_count(self.config.onset_burst, intensity)
    }

    /// React to a beat: pulse the existing population, then launch a burst
    /// from the configured spawn region. Returns the number spawned.
    pub fn beat_response(&mut self, intensity: f32) -> usize {
        self.pulse(intensity);
        let count = self.burst_count(intensity);
        let region = self.config.burst_region();
        self.spawn(count, region, intensity)
    }

    /// React to an onset: a smaller burst, no pulse. Returns the number spawned.
    pub fn onset_response(&mut self, intensity: f32) -> usize {
        let count = self.onset_count(intensity);
        let region = self.config.burst_region();
        self.spawn(count, region, intensity)
    }

    // =========================================================================
    // CONFIGURATION
    // =========================================================================

    /// Set gravity for subsequent updates. Non-finite values are ignored.
    pub fn set_gravity(&mut self, gravity: f32) {
        if gravity.is_finite() {
            self.config.gravity = gravity;
        } else {
            warn!("ignoring non-finite gravity {}", gravity);
        }
    }

    /// Turn background emission on or off.
    pub fn set_background_spawn(&mut self, enabled: bool) {
        self.config.background_spawn = enabled;
        self.background.set_enabled(enabled);
    }

    /// Set the background emission rate (particles per second, clamped to >= 0).
    pub fn set_spawn_rate(&mut self, rate: f32) {
        self.background.set_rate(rate);
        self.config.spawn_rate = self.background.rate();
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    /// Population snapshot.
    pub fn stats(&self) -> FieldStats {
        let (alive, life_sum) = self
            .alive()
            .fold((0usize, 0.0f32), |(n, sum), p| (n + 1, sum + p.life_fraction()));

        FieldStats {
            alive_particles: alive,
            total_particles: self.particles.len(),
            mean_life_fraction: if alive > 0 { life_sum / alive as f32 } else { 0.0 },
        }
    }

    /// Render snapshot of the alive particles.
    pub fn vertices(&self) -> Vec<ParticleVertex> {
        self.alive().map(ParticleVertex::from_particle).collect()
    }

    fn make_particle(&mut self, region: &SpawnRegion, intensity: f32) -> Particle {
        let config = &self.config;
        let rng = &mut self.rng;

        let position = rng.random_in_region(region);
        let direction = rng.cone_direction(config.cone_direction, config.cone_spread);
        let speed = config.base_speed * rng.random_range(0.5, 1.5) * intensity;
        let size = rng.random_range(config.size_range.0, config.size_range.1);
        let color = rng.pick_color(&config.palette);
        let life = rng.random_range(config.life_range.0, config.life_range.1);

        Particle::new(position, direction * speed, size, color, life)
    }
}

fn scaled_count(per_unit: f32, intensity: f32) -> usize {
    if !(intensity.is_finite() && intensity > 0.0) {
        return 0;
    }
    (per_unit * intensity).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec2;

    fn field(max: usize) -> ParticleField {
        ParticleField::new(FieldConfig::new(800.0, 600.0).with_max_particles(max).with_seed(42))
            .unwrap()
    }

    fn center() -> SpawnRegion {
        SpawnRegion::point(Vec2::new(400.0, 300.0))
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(ParticleField::new(FieldConfig::new(0.0, 600.0)).is_err());
        assert!(ParticleField::new(FieldConfig::default().with_max_particles(0)).is_err());
    }

    #[test]
    fn test_spawn_inserts_in_region() {
        let mut field = field(100);
        let region = SpawnRegion::around(Vec2::new(200.0, 200.0), 10.0);
        assert_eq!(field.spawn(10, region, 1.0), 10);
        assert_eq!(field.len(), 10);
        assert!(field.particles().all(|p| region.contains(p.position)));
    }

    #[test]
    fn test_spawn_zero_is_noop() {
        let mut field = field(10);
        assert_eq!(field.spawn(0, center(), 1.0), 0);
        assert!(field.is_empty());
    }

    #[test]
    fn test_spawn_caps_oversized_batch() {
        let mut field = field(8);
        assert_eq!(field.spawn(100, center(), 1.0), 8);
        assert_eq!(field.len(), 8);
    }

    #[test]
    fn test_spawn_velocity_points_up_right() {
        let mut field = field(50);
        field.spawn(50, center(), 1.0);
        for p in field.particles() {
            assert!(p.velocity.x > 0.0);
            assert!(p.velocity.y < 0.0);
        }
    }

    #[test]
    fn test_spawn_negative_intensity_launches_at_rest() {
        let mut field = field(5);
        field.spawn(5, center(), -3.0);
        assert!(field.particles().all(|p| p.velocity == Vec2::ZERO));
    }

    #[test]
    fn test_pulse_boosts_alive_particles() {
        let mut field = field(10);
        field.spawn(4, center(), 1.0);
        let before: Vec<f32> = field.particles().map(|p| p.size).collect();

        assert_eq!(field.pulse(2.0), 4);

        for (p, size) in field.particles().zip(before) {
            assert!((p.size - size * 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_pulse_zero_is_noop() {
        let mut field = field(10);
        field.spawn(3, center(), 1.0);
        let before: Vec<Particle> = field.particles().cloned().collect();

        assert_eq!(field.pulse(0.0), 0);
        assert_eq!(field.pulse(-1.0), 0);
        assert_eq!(field.pulse(f32::NAN), 0);

        let after: Vec<Particle> = field.particles().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_pulse_skips_dead_particles() {
        let mut field = field(10);
        field.spawn(2, center(), 1.0);
        field.particles[0].life = 0.0;
        let dead = field.particles[0].clone();

        assert_eq!(field.pulse(1.5), 1);
        assert_eq!(field.particles[0], dead);
    }

    #[test]
    fn test_update_zero_dt_is_noop() {
        let mut field = field(10);
        field.spawn(5, center(), 1.0);
        let before: Vec<Particle> = field.particles().cloned().collect();
        field.update(0.0);
        let after: Vec<Particle> = field.particles().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_negative_dt_is_zero() {
        let mut field = field(10);
        field.spawn(5, center(), 1.0);
        let before: Vec<Particle> = field.particles().cloned().collect();
        field.update(-0.5);
        field.update(f32::NAN);
        let after: Vec<Particle> = field.particles().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_removes_dead() {
        let mut field = field(10);
        field.spawn(3, center(), 0.0);
        field.particles[1].life = -0.1;
        field.update(0.0);
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut field = field(10);
        field.spawn(10, center(), 1.0);
        field.clear();
        assert!(field.is_empty());
        assert_eq!(field.stats(), FieldStats::default());
    }

    #[test]
    fn test_stats() {
        let mut field = field(10);
        assert_eq!(field.stats().mean_life_fraction, 0.0);

        field.spawn(4, center(), 1.0);
        let stats = field.stats();
        assert_eq!(stats.alive_particles, 4);
        assert_eq!(stats.total_particles, 4);
        assert!((stats.mean_life_fraction - 1.0).abs() < 1e-6);

        field.particles[0].life = 0.0;
        let stats = field.stats();
        assert_eq!(stats.alive_particles, 3);
        assert_eq!(stats.total_particles, 4);
    }

    #[test]
    fn test_burst_count() {
        let field = ParticleField::new(FieldConfig::default().with_burst_size(5.0)).unwrap();
        assert_eq!(field.burst_count(1.0), 5);
        assert_eq!(field.burst_count(1.5), 7);
        assert_eq!(field.burst_count(0.0), 0);
        assert_eq!(field.burst_count(-2.0), 0);
        assert_eq!(field.burst_count(f32::NAN), 0);
    }

    #[test]
    fn test_beat_response_pulses_and_spawns() {
        let mut field = field(100);
        field.spawn(3, center(), 1.0);
        let spawned = field.beat_response(2.0);
        assert_eq!(spawned, field.burst_count(2.0));
        assert_eq!(field.len(), 3 + spawned);
        assert!(field.particles().take(3).all(|p| p.boost > 1.0));
    }

    #[test]
    fn test_onset_response_does_not_pulse() {
        let mut field = field(100);
        field.spawn(3, center(), 1.0);
        field.onset_response(1.5);
        assert!(field.particles().take(3).all(|p| p.boost == 1.0));
    }

    #[test]
    fn test_background_spawn() {
        let config = FieldConfig::new(800.0, 600.0)
            .with_background_spawn(10.0)
            .with_seed(3);
        let mut field = ParticleField::new(config).unwrap();
        field.update(1.0);
        assert_eq!(field.len(), 10);

        field.set_background_spawn(false);
        field.update(0.1);
        assert!(field.len() <= 10);
    }

    #[test]
    fn test_setters() {
        let mut field = field(10);
        field.set_gravity(-12.0);
        assert_eq!(field.config().gravity, -12.0);
        field.set_gravity(f32::INFINITY);
        assert_eq!(field.config().gravity, -12.0);

        field.set_spawn_rate(-4.0);
        assert_eq!(field.config().spawn_rate, 0.0);
        field.set_spawn_rate(25.0);
        assert_eq!(field.config().spawn_rate, 25.0);
    }

    #[test]
    fn test_vertices_match_alive() {
        let mut field = field(10);
        field.spawn(6, center(), 1.0);
        field.particles[2].life = 0.0;
        assert_eq!(field.vertices().len(), 5);
    }
}
