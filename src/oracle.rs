//! Beat and onset oracle.
//!
//! [`BeatOracle`] turns the playback position into events: "is now a beat,
//! and how strongly?". It holds the ascending beat and onset timestamps of a
//! [`BeatTrack`] and a [`PlaybackClock`], and matches the clock against the
//! timestamps with a jitter tolerance.
//!
//! # Matching
//!
//! Among all timestamps within `tolerance` of the query time, the one at
//! minimum distance wins (ties go to the earlier timestamp). Its intensity is
//!
//! ```text
//! intensity = (1 - distance / tolerance) × scale
//! ```
//!
//! so an exact hit scores `scale` and a hit at the edge of the window scores 0.
//! Lookups are binary searches over the sorted arrays.
//!
//! # Graceful degradation
//!
//! Queries never fail. Empty timestamp arrays, a non-positive tolerance or a
//! missing feature track all answer `(false, 0.0)` or `0.0`.

use crate::error::TrackError;
use crate::time::PlaybackClock;
use crate::track::{BeatTrack, FeatureTrack};
use log::debug;

/// Default beat matching window in seconds.
pub const DEFAULT_BEAT_TOLERANCE: f32 = 0.1;
/// Default onset matching window in seconds.
pub const DEFAULT_ONSET_TOLERANCE: f32 = 0.05;
/// Intensity of an exact beat hit.
pub const DEFAULT_BEAT_SCALE: f32 = 2.0;
/// Intensity of an exact onset hit.
pub const DEFAULT_ONSET_SCALE: f32 = 1.5;

/// A matched beat or onset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventHit {
    /// Index into the beat or onset array.
    pub index: usize,
    /// Timestamp of the matched event.
    pub time: f32,
    /// `|query - time|` in seconds.
    pub distance: f32,
    /// `(1 - distance / tolerance) × scale`.
    pub intensity: f32,
}

/// Answers beat/onset queries against a playback clock.
#[derive(Clone, Debug)]
pub struct BeatOracle {
    beat_times: Vec<f32>,
    onset_times: Vec<f32>,
    duration: f32,
    tempo: Option<f32>,
    energy: Option<FeatureTrack>,
    spectral_centroid: Option<FeatureTrack>,
    beat_scale: f32,
    onset_scale: f32,
    clock: PlaybackClock,
}

impl BeatOracle {
    /// Build an oracle from raw timestamps.
    ///
    /// Timestamps must be finite; unsorted arrays are sorted. `duration` must
    /// be finite and non-negative.
    pub fn new(beat_times: Vec<f32>, onset_times: Vec<f32>, duration: f32) -> Result<Self, TrackError> {
        Self::from_track(BeatTrack::new(beat_times, onset_times, duration))
    }

    /// Build an oracle from a loaded track.
    pub fn from_track(track: BeatTrack) -> Result<Self, TrackError> {
        if !(track.duration.is_finite() && track.duration >= 0.0) {
            return Err(TrackError::InvalidDuration(track.duration));
        }
        let beat_times = checked_times(track.beat_times, "beat")?;
        let onset_times = checked_times(track.onset_times, "onset")?;

        debug!(
            "beat oracle: {} beats, {} onsets, {:.2}s",
            beat_times.len(),
            onset_times.len(),
            track.duration
        );

        Ok(Self {
            beat_times,
            onset_times,
            duration: track.duration,
            tempo: track.tempo,
            energy: track.energy,
            spectral_centroid: track.spectral_centroid,
            beat_scale: DEFAULT_BEAT_SCALE,
            onset_scale: DEFAULT_ONSET_SCALE,
            clock: PlaybackClock::realtime(),
        })
    }

    /// An oracle with no events: every query answers "no".
    pub fn empty() -> Self {
        Self {
            beat_times: Vec::new(),
            onset_times: Vec::new(),
            duration: 0.0,
            tempo: None,
            energy: None,
            spectral_centroid: None,
            beat_scale: DEFAULT_BEAT_SCALE,
            onset_scale: DEFAULT_ONSET_SCALE,
            clock: PlaybackClock::realtime(),
        }
    }

    /// Replace the playback clock (e.g. with [`PlaybackClock::manual`]).
    pub fn with_clock(mut self, clock: PlaybackClock) -> Self {
        self.clock = clock;
        self
    }

    /// Set the intensity of exact beat and onset hits.
    pub fn with_scales(mut self, beat_scale: f32, onset_scale: f32) -> Self {
        self.beat_scale = beat_scale;
        self.onset_scale = onset_scale;
        self
    }

    // =========================================================================
    // PLAYBACK
    // =========================================================================

    /// Start playback from zero.
    pub fn start(&mut self) {
        self.clock.start();
    }

    /// Stop playback; `elapsed` freezes.
    pub fn stop(&mut self) {
        self.clock.stop();
    }

    /// Continue from the frozen position.
    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Jump to `seconds`.
    pub fn seek(&mut self, seconds: f32) {
        self.clock.seek(seconds);
    }

    /// Step a manual clock. No effect on a realtime clock.
    pub fn advance(&mut self, dt: f32) {
        self.clock.advance(dt);
    }

    /// Whether playback is running.
    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Seconds of playback.
    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    /// The playback clock.
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    // =========================================================================
    // EVENT QUERIES
    // =========================================================================

    /// Is the current position within `tolerance` of a beat?
    pub fn is_beat(&self, tolerance: f32) -> (bool, f32) {
        self.is_beat_at(self.elapsed(), tolerance)
    }

    /// Is the current position within `tolerance` of an onset?
    pub fn is_onset(&self, tolerance: f32) -> (bool, f32) {
        self.is_onset_at(self.elapsed(), tolerance)
    }

    /// Beat query at an explicit time.
    pub fn is_beat_at(&self, t: f32, tolerance: f32) -> (bool, f32) {
        as_flag(self.nearest_beat(t, tolerance))
    }

    /// Onset query at an explicit time.
    pub fn is_onset_at(&self, t: f32, tolerance: f32) -> (bool, f32) {
        as_flag(self.nearest_onset(t, tolerance))
    }

    /// Nearest beat within `tolerance` of `t`.
    pub fn nearest_beat(&self, t: f32, tolerance: f32) -> Option<EventHit> {
        nearest_event(&self.beat_times, t, tolerance, self.beat_scale)
    }

    /// Nearest onset within `tolerance` of `t`.
    pub fn nearest_onset(&self, t: f32, tolerance: f32) -> Option<EventHit> {
        nearest_event(&self.onset_times, t, tolerance, self.onset_scale)
    }

    // =========================================================================
    // TRACK INFO
    // =========================================================================

    /// Playback progress in `[0, 1]`; 0 for a zero-length track.
    pub fn progress(&self) -> f32 {
        self.progress_at(self.elapsed())
    }

    /// Progress at an explicit time.
    pub fn progress_at(&self, t: f32) -> f32 {
        if self.duration > 0.0 && t.is_finite() {
            (t / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Loudness at the current position, `[0, 1]`.
    pub fn energy(&self) -> f32 {
        sample(&self.energy, self.elapsed())
    }

    /// Normalized spectral centroid at the current position, `[0, 1]`.
    pub fn spectral_centroid(&self) -> f32 {
        sample(&self.spectral_centroid, self.elapsed())
    }

    /// Whether the track carries an energy envelope.
    pub fn has_energy(&self) -> bool {
        self.energy.as_ref().is_some_and(|e| !e.values.is_empty())
    }

    /// Estimated tempo in BPM.
    pub fn tempo(&self) -> Option<f32> {
        self.tempo
    }

    /// Track length in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Beat timestamps, ascending.
    pub fn beat_times(&self) -> &[f32] {
        &self.beat_times
    }

    /// Onset timestamps, ascending.
    pub fn onset_times(&self) -> &[f32] {
        &self.onset_times
    }
}

impl Default for BeatOracle {
    fn default() -> Self {
        Self::empty()
    }
}

fn as_flag(hit: Option<EventHit>) -> (bool, f32) {
    match hit {
        Some(hit) => (true, hit.intensity),
        None => (false, 0.0),
    }
}

fn sample(track: &Option<FeatureTrack>, t: f32) -> f32 {
    track.as_ref().map_or(0.0, |track| track.sample(t))
}

fn checked_times(mut times: Vec<f32>, kind: &str) -> Result<Vec<f32>, TrackError> {
    if let Some((index, &value)) = times.iter().enumerate().find(|(_, t)| !t.is_finite()) {
        return Err(TrackError::InvalidTimestamp { index, value });
    }
    if !times.windows(2).all(|w| w[0] <= w[1]) {
        debug!("sorting {} unordered {} timestamps", times.len(), kind);
        times.sort_by(f32::total_cmp);
    }
    Ok(times)
}

/// Minimum-distance match of `t` against ascending `times`.
fn nearest_event(times: &[f32], t: f32, tolerance: f32, scale: f32) -> Option<EventHit> {
    if !(tolerance.is_finite() && tolerance > 0.0) || !t.is_finite() {
        return None;
    }

    // first index with times[i] >= t; the nearest is here or just before
    let split = times.partition_point(|&time| time < t);
    let mut best: Option<(usize, f32)> = None;
    for index in [split.checked_sub(1), Some(split)].into_iter().flatten() {
        let Some(&time) = times.get(index) else {
            continue;
        };
        let distance = (t - time).abs();
        if distance <= tolerance && best.map_or(true, |(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }

    best.map(|(index, distance)| EventHit {
        index,
        time: times[index],
        distance,
        intensity: (1.0 - distance / tolerance) * scale,
    })
}
