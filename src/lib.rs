//! # Beatfield - beat-reactive particle field
//!
//! A frame-driven 2D particle simulation steered by precomputed beat and
//! onset timestamps.
//!
//! Beatfield does no audio analysis and no drawing. It consumes a
//! [`BeatTrack`] produced elsewhere, tells you when the playback position is
//! on a beat, and keeps a bounded population of particles moving in response.
//! Rendering is left to the caller through [`ParticleField::vertices`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use beatfield::prelude::*;
//!
//! let track = BeatTrack::metronome(120.0, 30.0, 0.5);
//! let oracle = BeatOracle::from_track(track)?.with_clock(PlaybackClock::manual());
//! let field = ParticleField::new(FieldConfig::new(800.0, 600.0).with_seed(7))?;
//!
//! let mut driver = Driver::new(oracle, field, DriverSettings::default());
//! driver.start();
//! for _ in 0..600 {
//!     let report = driver.frame(1.0 / 60.0);
//!     if report.beat.is_some() {
//!         println!("beat at {:.2}s: {:?}", report.elapsed, report.stats);
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Oracle
//!
//! [`BeatOracle`] holds the beat and onset timestamps and a [`PlaybackClock`].
//! [`BeatOracle::is_beat`] answers `(found, intensity)`: whether the current
//! position lies within a tolerance of a beat, and how close it is.
//!
//! ### Field
//!
//! [`ParticleField`] owns up to `max_particles` particles. Each frame
//! [`ParticleField::update`] applies gravity and friction, decays life and
//! removes particles that died or left the canvas. Beats reach the field
//! through [`ParticleField::spawn`] and [`ParticleField::pulse`].
//!
//! ### Driver
//!
//! [`Driver`] glues the two together: one call to [`Driver::frame`] steps the
//! clock, fires each new beat once, maps energy onto gravity and updates the
//! field.
//!
//! ## Coordinates
//!
//! Screen space, in pixels: the origin is the top-left corner and `+y` points
//! down. Gravity is positive downwards; "up and to the right" is `-π/4`.
//!
//! ## Feature Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`FieldConfig`] and its presets |
//! | [`field`] | [`ParticleField`], [`FieldStats`] |
//! | [`particle`] | [`Particle`] and the motion integrator |
//! | [`oracle`] | [`BeatOracle`], [`EventHit`] |
//! | [`track`] | [`BeatTrack`] JSON and metronome tracks |
//! | [`time`] | [`PlaybackClock`], [`FrameTimer`] |
//! | [`driver`] | [`Driver`], [`Command`] |
//! | [`vertex`] | [`ParticleVertex`] render snapshot |

pub mod config;
pub mod driver;
mod emitter;
pub mod error;
pub mod field;
pub mod oracle;
pub mod particle;
mod spawn;
pub mod time;
pub mod track;
pub mod vertex;

pub use bytemuck;
pub use config::{FieldConfig, DEFAULT_PALETTE};
pub use driver::{Command, Driver, DriverSettings, FrameReport};
pub use emitter::BackgroundEmitter;
pub use error::{ConfigError, TrackError};
pub use field::{FieldStats, ParticleField};
pub use glam::Vec2;
pub use oracle::{BeatOracle, EventHit};
pub use particle::Particle;
pub use spawn::{SpawnContext, SpawnRegion};
pub use time::{ClockMode, FrameTimer, PlaybackClock};
pub use track::{BeatTrack, FeatureTrack};
pub use vertex::ParticleVertex;

/// Common imports for beatfield.
///
/// ```ignore
/// use beatfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::FieldConfig;
    pub use crate::driver::{Command, Driver, DriverSettings, FrameReport};
    pub use crate::field::{FieldStats, ParticleField};
    pub use crate::oracle::{BeatOracle, EventHit};
    pub use crate::spawn::SpawnRegion;
    pub use crate::time::{FrameTimer, PlaybackClock};
    pub use crate::track::BeatTrack;
    pub use crate::vertex::ParticleVertex;
    pub use crate::Vec2;
}
