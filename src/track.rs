//! Precomputed beat tracks.
//!
//! Audio analysis happens elsewhere; this crate only consumes its results. A
//! [`BeatTrack`] bundles the beat and onset timestamps, the track duration,
//! and optional hop-indexed scalar features (energy, spectral centroid).
//!
//! Tracks are stored as JSON:
//!
//! ```json
//! {
//!   "tempo": 120.0,
//!   "duration": 30.0,
//!   "beat_times": [0.5, 1.0, 1.5],
//!   "onset_times": [0.5, 0.74, 1.0],
//!   "energy": { "hop": 0.0232, "values": [0.1, 0.4, 0.9] }
//! }
//! ```
//!
//! When no analysis is available, [`BeatTrack::metronome`] synthesizes a
//! regular click track.

use crate::error::TrackError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Hop between feature frames: 512 samples at 22.05 kHz.
pub const DEFAULT_HOP: f32 = 512.0 / 22_050.0;

/// Most beats or onsets [`BeatTrack::metronome`] generates per list.
pub const MAX_TICKS: usize = 1 << 20;

/// Most energy frames [`BeatTrack::metronome`] generates (about 13.5 hours).
pub const MAX_FEATURE_FRAMES: usize = 1 << 21;

/// A scalar feature sampled every `hop` seconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureTrack {
    /// Seconds between consecutive values.
    pub hop: f32,
    /// Feature values, expected in `[0, 1]`.
    pub values: Vec<f32>,
}

impl FeatureTrack {
    /// Create a feature track.
    pub fn new(hop: f32, values: Vec<f32>) -> Self {
        Self { hop, values }
    }

    /// Value of the frame containing `t`, clamped to `[0, 1]`.
    ///
    /// Times past the end hold the last frame. Negative or non-finite times,
    /// an empty track, or a non-positive hop give 0.
    pub fn sample(&self, t: f32) -> f32 {
        if self.values.is_empty() || !(self.hop > 0.0) || !t.is_finite() || t < 0.0 {
            return 0.0;
        }
        let index = ((t / self.hop) as usize).min(self.values.len() - 1);
        let value = self.values[index];
        if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Length in seconds.
    pub fn duration(&self) -> f32 {
        self.hop * self.values.len() as f32
    }
}

/// Beat and onset timestamps for one piece of audio.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatTrack {
    /// Estimated tempo in BPM, if known.
    pub tempo: Option<f32>,
    /// Track length in seconds.
    pub duration: f32,
    /// Beat instants in seconds, ascending.
    pub beat_times: Vec<f32>,
    /// Onset instants in seconds, ascending.
    pub onset_times: Vec<f32>,
    /// Loudness envelope.
    pub energy: Option<FeatureTrack>,
    /// Normalized spectral centroid.
    pub spectral_centroid: Option<FeatureTrack>,
}

impl BeatTrack {
    /// Track with only timestamps.
    pub fn new(beat_times: Vec<f32>, onset_times: Vec<f32>, duration: f32) -> Self {
        Self {
            duration,
            beat_times,
            onset_times,
            ..Default::default()
        }
    }

    /// Regular click track: a beat every `60 / bpm` seconds from `offset`,
    /// onsets on every beat and every off-beat eighth, and an energy envelope
    /// that spikes on each beat and decays before the next.
    ///
    /// A non-positive or non-finite `bpm` or `duration` gives an empty track.
    /// Event lists stop at [`MAX_TICKS`] entries (or once the period is too
    /// small to advance the time) and the envelope at [`MAX_FEATURE_FRAMES`].
    pub fn metronome(bpm: f32, duration: f32, offset: f32) -> Self {
        if !(bpm.is_finite() && bpm > 0.0 && duration.is_finite() && duration > 0.0) {
            return Self::default();
        }
        let period = 60.0 / bpm;
        let offset = if offset.is_finite() { offset.max(0.0) } else { 0.0 };

        let beat_times = ticks(offset, period, duration);
        let onset_times = ticks(offset, period / 2.0, duration);

        let frames = (duration / DEFAULT_HOP).ceil().min(MAX_FEATURE_FRAMES as f32) as usize;
        if frames == MAX_FEATURE_FRAMES {
            warn!("metronome energy truncated to {} frames", MAX_FEATURE_FRAMES);
        }
        let energy = (0..frames)
            .map(|i| {
                let t = i as f32 * DEFAULT_HOP;
                if t < offset {
                    return 0.0;
                }
                let since_beat = (t - offset) % period;
                (-6.0 * since_beat / period).exp()
            })
            .collect();

        Self {
            tempo: Some(bpm),
            duration,
            beat_times,
            onset_times,
            energy: Some(FeatureTrack::new(DEFAULT_HOP, energy)),
            spectral_centroid: None,
        }
    }

    /// Parse a track from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, TrackError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON track file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, TrackError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `start, start + step, ...` strictly below `end`, at most [`MAX_TICKS`]
/// of them. Stops early once `step` no longer moves `t` in f32.
fn ticks(start: f32, step: f32, end: f32) -> Vec<f32> {
    let mut times: Vec<f32> = Vec::new();
    for i in 0..MAX_TICKS {
        // multiply rather than accumulate to avoid drift
        let t = start + step * i as f32;
        if t >= end {
            return times;
        }
        if times.last().is_some_and(|&last| t <= last) {
            warn!("metronome step {} too small to advance past {}s", step, t);
            return times;
        }
        times.push(t);
    }
    warn!("metronome truncated to {} ticks", MAX_TICKS);
    times
}
