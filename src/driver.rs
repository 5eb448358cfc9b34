//! Frame loop glue between the oracle and the field.
//!
//! A [`Driver`] owns one [`BeatOracle`] and one [`ParticleField`] and runs the
//! per-frame sequence:
//!
//! 1. step the playback clock (manual clocks only),
//! 2. ask the oracle for the nearest beat and onset,
//! 3. forward new events to [`ParticleField::beat_response`] /
//!    [`ParticleField::onset_response`],
//! 4. map the track's energy onto gravity,
//! 5. [`ParticleField::update`].
//!
//! A beat stays inside its tolerance window for several frames. Each beat
//! index fires at most once per playback, on the frame closest to the beat,
//! so one beat produces one burst at (close to) full intensity.
//!
//! External input (keyboard, CLI) arrives as [`Command`]s.

use crate::field::{FieldStats, ParticleField};
use crate::oracle::{BeatOracle, EventHit, DEFAULT_BEAT_TOLERANCE, DEFAULT_ONSET_TOLERANCE};
use log::debug;
use serde::{Deserialize, Serialize};

/// External inputs to the frame loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Fire a manual beat at the configured trigger intensity.
    Trigger,
    /// Remove every particle.
    Clear,
    /// Restart playback from zero and clear the field.
    Restart,
    /// Stop the loop.
    Exit,
}

/// Tunables of the frame loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    /// Beat matching window in seconds.
    pub beat_tolerance: f32,
    /// Onset matching window in seconds.
    pub onset_tolerance: f32,
    /// Intensity of a [`Command::Trigger`] beat.
    pub trigger_intensity: f32,
    /// Whether energy modulates gravity.
    pub energy_gravity: bool,
    /// Gravity at zero energy.
    pub gravity_base: f32,
    /// Gravity removed at full energy.
    pub gravity_energy_span: f32,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            beat_tolerance: DEFAULT_BEAT_TOLERANCE,
            onset_tolerance: DEFAULT_ONSET_TOLERANCE,
            trigger_intensity: 2.0,
            energy_gravity: true,
            gravity_base: 30.0,
            gravity_energy_span: 20.0,
        }
    }
}

/// What happened during one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// Playback position after the frame.
    pub elapsed: f32,
    /// Beat fired this frame, if any.
    pub beat: Option<EventHit>,
    /// Onset fired this frame, if any.
    pub onset: Option<EventHit>,
    /// Field population after the update.
    pub stats: FieldStats,
}

/// Runs the oracle and the field together, one frame at a time.
pub struct Driver {
    oracle: BeatOracle,
    field: ParticleField,
    settings: DriverSettings,
    beats: EventGate,
    onsets: EventGate,
    frames: u64,
}

impl Driver {
    /// Combine an oracle and a field.
    pub fn new(oracle: BeatOracle, field: ParticleField, settings: DriverSettings) -> Self {
        Self {
            oracle,
            field,
            settings,
            beats: EventGate::default(),
            onsets: EventGate::default(),
            frames: 0,
        }
    }

    /// The oracle.
    pub fn oracle(&self) -> &BeatOracle {
        &self.oracle
    }

    /// Mutable oracle access, e.g. to pause playback.
    pub fn oracle_mut(&mut self) -> &mut BeatOracle {
        &mut self.oracle
    }

    /// The field.
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Mutable field access.
    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }

    /// Loop settings.
    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Start playback from zero.
    pub fn start(&mut self) {
        self.oracle.start();
        self.forget_events();
    }

    /// Jump to `seconds`. Events after the new position fire again.
    pub fn seek(&mut self, seconds: f32) {
        self.oracle.seek(seconds);
        self.forget_events();
    }

    /// Apply an external command. Returns `false` when the loop should exit.
    pub fn handle(&mut self, command: Command) -> bool {
        debug!("command {:?}", command);
        match command {
            Command::Trigger => {
                self.field.beat_response(self.settings.trigger_intensity);
            }
            Command::Clear => self.field.clear(),
            Command::Restart => {
                self.oracle.stop();
                self.start();
                self.field.clear();
            }
            Command::Exit => return false,
        }
        true
    }

    /// Run one frame of `dt` seconds.
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        self.frames += 1;
        self.oracle.advance(dt);

        let mut beat = None;
        let mut onset = None;

        if self.oracle.is_playing() {
            let t = self.oracle.elapsed();

            let candidate = self.oracle.nearest_beat(t, self.settings.beat_tolerance);
            if let Some(hit) = self.beats.observe(candidate, t, dt) {
                debug!("beat {} at {:.3}s (intensity {:.2})", hit.index, t, hit.intensity);
                self.field.beat_response(hit.intensity);
                beat = Some(hit);
            }

            let candidate = self.oracle.nearest_onset(t, self.settings.onset_tolerance);
            if let Some(hit) = self.onsets.observe(candidate, t, dt) {
                self.field.onset_response(hit.intensity);
                onset = Some(hit);
            }

            if self.settings.energy_gravity && self.oracle.has_energy() {
                let energy = self.oracle.energy();
                self.field
                    .set_gravity(self.settings.gravity_base - energy * self.settings.gravity_energy_span);
            }
        }

        self.field.update(dt);

        FrameReport {
            elapsed: self.oracle.elapsed(),
            beat,
            onset,
            stats: self.field.stats(),
        }
    }

    fn forget_events(&mut self) {
        self.beats = EventGate::default();
        self.onsets = EventGate::default();
    }
}

/// Fires each event index once, at the frame nearest to its timestamp.
///
/// While the clock approaches an event the best hit so far is held back. It
/// fires as soon as no later frame can come closer: the clock has reached the
/// timestamp, the hit is within half a frame of it, or the distance has
/// started to grow again.
#[derive(Clone, Copy, Debug, Default)]
struct EventGate {
    fired: Option<usize>,
    held: Option<EventHit>,
}

impl EventGate {
    fn observe(&mut self, hit: Option<EventHit>, t: f32, dt: f32) -> Option<EventHit> {
        let fired = self.fired;
        let hit = hit.filter(|hit| fired.map_or(true, |fired| hit.index > fired));

        match (self.held.take(), hit) {
            (Some(held), Some(hit)) if hit.index == held.index => {
                if hit.distance < held.distance {
                    self.settle(hit, t, dt)
                } else {
                    self.fire(held)
                }
            }
            // the held event left the window, or a later one took over
            (Some(held), _) => self.fire(held),
            (None, Some(hit)) => self.settle(hit, t, dt),
            (None, None) => None,
        }
    }

    fn settle(&mut self, hit: EventHit, t: f32, dt: f32) -> Option<EventHit> {
        if t >= hit.time || hit.distance <= dt * 0.5 {
            self.fire(hit)
        } else {
            self.held = Some(hit);
            None
        }
    }

    fn fire(&mut self, hit: EventHit) -> Option<EventHit> {
        self.fired = Some(hit.index);
        Some(hit)
    }
}
