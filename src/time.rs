//! Clocks for the frame loop.
//!
//! Two clocks with different jobs:
//!
//! - [`PlaybackClock`] answers "how far into the track are we?". It is the
//!   time base the [`BeatOracle`](crate::BeatOracle) queries against.
//! - [`FrameTimer`] answers "how long was the last frame?". It produces the
//!   `dt` fed to [`ParticleField::update`](crate::ParticleField::update).
//!
//! Both can run off the wall clock or be stepped manually, which keeps
//! headless runs and tests deterministic.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = PlaybackClock::realtime();
//! let mut timer = FrameTimer::new();
//! clock.start();
//! loop {
//!     let dt = timer.tick();
//!     clock.advance(dt); // no-op for a realtime clock
//!     println!("t = {:.2}s, fps = {:.1}", clock.elapsed(), timer.fps());
//! }
//! ```

use std::time::{Duration, Instant};

/// Where a [`PlaybackClock`] takes its time from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockMode {
    /// Elapsed time follows the monotonic wall clock.
    Realtime,
    /// Elapsed time only moves through [`PlaybackClock::advance`] and
    /// [`PlaybackClock::seek`].
    Manual,
}

/// Playback position with start/stop semantics.
///
/// While playing, elapsed time grows; once stopped it is frozen at the last
/// value until the clock is resumed, restarted or seeked.
#[derive(Clone, Debug)]
pub struct PlaybackClock {
    mode: ClockMode,
    /// Wall-clock reference while playing in realtime mode.
    anchor: Option<Instant>,
    /// Elapsed seconds accumulated before `anchor` (or in total when manual).
    offset: f32,
    playing: bool,
}

impl PlaybackClock {
    /// A stopped clock at zero that follows the wall clock when playing.
    pub fn realtime() -> Self {
        Self::with_mode(ClockMode::Realtime)
    }

    /// A stopped clock at zero that only moves when advanced.
    pub fn manual() -> Self {
        Self::with_mode(ClockMode::Manual)
    }

    /// A stopped clock at zero.
    pub fn with_mode(mode: ClockMode) -> Self {
        Self {
            mode,
            anchor: None,
            offset: 0.0,
            playing: false,
        }
    }

    /// Time source in use.
    #[inline]
    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    /// Whether playback is running.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start playback from zero.
    pub fn start(&mut self) {
        self.offset = 0.0;
        self.playing = true;
        self.anchor = self.wall_anchor();
    }

    /// Stop playback, freezing the elapsed time.
    pub fn stop(&mut self) {
        self.offset = self.elapsed();
        self.anchor = None;
        self.playing = false;
    }

    /// Continue playback from the frozen position.
    pub fn resume(&mut self) {
        if !self.playing {
            self.playing = true;
            self.anchor = self.wall_anchor();
        }
    }

    /// Jump to `seconds`, keeping the play state. Non-finite input is ignored.
    pub fn seek(&mut self, seconds: f32) {
        if !seconds.is_finite() {
            return;
        }
        self.offset = seconds;
        if self.playing {
            self.anchor = self.wall_anchor();
        }
    }

    /// Step a playing manual clock by `dt` seconds. Realtime clocks ignore this.
    pub fn advance(&mut self, dt: f32) {
        if self.mode == ClockMode::Manual && self.playing && dt.is_finite() && dt > 0.0 {
            self.offset += dt;
        }
    }

    /// Seconds of playback.
    pub fn elapsed(&self) -> f32 {
        match self.anchor {
            Some(anchor) => self.offset + anchor.elapsed().as_secs_f32(),
            None => self.offset,
        }
    }

    fn wall_anchor(&self) -> Option<Instant> {
        match self.mode {
            ClockMode::Realtime => Some(Instant::now()),
            ClockMode::Manual => None,
        }
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::realtime()
    }
}

/// Per-frame delta and FPS tracking.
#[derive(Debug)]
pub struct FrameTimer {
    previous: Instant,
    dt: f32,
    ticks: u64,
    /// Deterministic delta; overrides the measured one when set.
    fixed: Option<f32>,
    /// Upper bound on a measured delta, so a stall does not teleport particles.
    max_delta: f32,
    rate: FpsWindow,
}

/// Frames counted over a half-second wall-clock window.
#[derive(Debug)]
struct FpsWindow {
    opened: Instant,
    first_tick: u64,
    fps: f32,
}

impl FpsWindow {
    const LENGTH: Duration = Duration::from_millis(500);

    fn observe(&mut self, now: Instant, ticks: u64) {
        let span = now.duration_since(self.opened);
        if span < Self::LENGTH {
            return;
        }
        self.fps = (ticks - self.first_tick) as f32 / span.as_secs_f32();
        self.opened = now;
        self.first_tick = ticks;
    }
}

impl FrameTimer {
    /// A wall-clock timer starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            previous: now,
            dt: 0.0,
            ticks: 0,
            fixed: None,
            max_delta: 0.25,
            rate: FpsWindow {
                opened: now,
                first_tick: 0,
                fps: 0.0,
            },
        }
    }

    /// A timer that always reports `1 / fps` seconds per frame.
    pub fn fixed(fps: f32) -> Self {
        let mut timer = Self::new();
        timer.set_fixed_delta(Some(1.0 / fps.max(1.0)));
        timer
    }

    /// Mark a new frame and return its delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let measured = now.duration_since(self.previous).as_secs_f32();
        self.previous = now;
        self.ticks += 1;
        self.rate.observe(now, self.ticks);

        self.dt = match self.fixed {
            Some(dt) => dt,
            None => measured.min(self.max_delta),
        };
        self.dt
    }

    /// Delta of the last frame.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.dt
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.ticks
    }

    /// Measured frames per second (wall clock, refreshed twice a second).
    #[inline]
    pub fn fps(&self) -> f32 {
        self.rate.fps
    }

    /// Use a fixed delta, or `None` for measured deltas.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed = delta.filter(|d| d.is_finite() && *d >= 0.0);
    }

    /// Cap measured deltas at `max` seconds.
    pub fn set_max_delta(&mut self, max: f32) {
        if max.is_finite() && max > 0.0 {
            self.max_delta = max;
        }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_starts_stopped() {
        let clock = PlaybackClock::realtime();
        assert!(!clock.is_playing());
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_realtime_clock_runs() {
        let mut clock = PlaybackClock::realtime();
        clock.start();
        thread::sleep(Duration::from_millis(8));
        assert!(clock.elapsed() > 0.0);
    }

    #[test]
    fn test_stop_freezes_elapsed() {
        let mut clock = PlaybackClock::realtime();
        clock.start();
        thread::sleep(Duration::from_millis(5));
        clock.stop();

        let frozen = clock.elapsed();
        thread::sleep(Duration::from_millis(12));
        assert_eq!(clock.elapsed(), frozen);
    }

    #[test]
    fn test_start_resets() {
        let mut clock = PlaybackClock::manual();
        clock.start();
        clock.advance(3.0);
        clock.stop();
        assert_eq!(clock.elapsed(), 3.0);

        clock.start();
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_manual_advance_only_when_playing() {
        let mut clock = PlaybackClock::manual();
        clock.advance(1.0);
        assert_eq!(clock.elapsed(), 0.0);

        clock.start();
        clock.advance(0.5);
        clock.advance(-1.0);
        assert_eq!(clock.elapsed(), 0.5);

        clock.stop();
        clock.resume();
        clock.advance(0.25);
        assert_eq!(clock.elapsed(), 0.75);
    }

    #[test]
    fn test_seek() {
        let mut clock = PlaybackClock::manual();
        clock.seek(1.05);
        assert_eq!(clock.elapsed(), 1.05);
        clock.seek(f32::NAN);
        assert_eq!(clock.elapsed(), 1.05);
    }

    #[test]
    fn test_fixed_frame_timer() {
        let mut timer = FrameTimer::fixed(60.0);
        thread::sleep(Duration::from_millis(20));
        let dt = timer.tick();
        assert!((dt - 1.0 / 60.0).abs() < 1e-6);
        assert_eq!(timer.frame(), 1);
    }

    #[test]
    fn test_fps_needs_a_full_window() {
        let mut timer = FrameTimer::new();
        timer.tick();
        timer.tick();
        assert_eq!(timer.fps(), 0.0);
        assert_eq!(timer.frame(), 2);
    }

    #[test]
    fn test_measured_delta_is_capped() {
        let mut timer = FrameTimer::new();
        timer.set_max_delta(0.005);
        thread::sleep(Duration::from_millis(20));
        assert!(timer.tick() <= 0.005);
    }
}
