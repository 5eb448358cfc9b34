// Headless runner: plays a beat track through the particle field and logs
// what happens. Run with RUST_LOG=info (or debug) to see the frame log.
mod cli;

use beatfield::{
    BeatOracle, BeatTrack, Driver, DriverSettings, FieldConfig, FrameTimer, ParticleField, ParticleVertex,
    PlaybackClock,
};
use clap::Parser;
use cli::Args;
use log::{debug, info, warn};
use std::error::Error;
use std::fs;
use std::thread;
use std::time::{Duration, Instant};

/// Used for the metronome track when neither --track nor --seconds is given.
const DEFAULT_SECONDS: f32 = 10.0;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_json::from_str::<FieldConfig>(&text)?
        }
        None => FieldConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let track = match &args.track {
        Some(path) => BeatTrack::load(path)?,
        None => {
            let seconds = args.seconds.unwrap_or(DEFAULT_SECONDS);
            info!("no track given, using a {} BPM metronome", args.bpm);
            BeatTrack::metronome(args.bpm, seconds, 0.5)
        }
    };

    let seconds = args.seconds.unwrap_or(track.duration);
    let fps = if args.fps.is_finite() && args.fps >= 1.0 {
        args.fps
    } else {
        warn!("invalid --fps {}, using 60", args.fps);
        60.0
    };

    let oracle = BeatOracle::from_track(track)?.with_clock(PlaybackClock::manual());
    let field = ParticleField::new(config)?;
    info!(
        "{} beats, {} onsets, {:.2}s track, simulating {:.2}s at {} fps",
        oracle.beat_times().len(),
        oracle.onset_times().len(),
        oracle.duration(),
        seconds,
        fps
    );

    let mut driver = Driver::new(oracle, field, DriverSettings::default());
    let mut timer = FrameTimer::fixed(fps);
    let frame_budget = Duration::from_secs_f32(1.0 / fps);
    let total_frames = (seconds.max(0.0) * fps).ceil() as u64;
    let frames_per_log = fps.round().max(1.0) as u64;

    let mut beats = 0usize;
    let mut onsets = 0usize;
    let mut peak = 0usize;

    driver.start();
    let started = Instant::now();
    for frame in 1..=total_frames {
        let frame_start = Instant::now();
        let dt = timer.tick();
        let report = driver.frame(dt);

        beats += usize::from(report.beat.is_some());
        onsets += usize::from(report.onset.is_some());
        peak = peak.max(report.stats.total_particles);

        if frame % frames_per_log == 0 {
            info!(
                "t={:6.2}s  progress={:5.1}%  alive={:5}  life={:.2}  gravity={:.1}",
                report.elapsed,
                driver.oracle().progress() * 100.0,
                report.stats.alive_particles,
                report.stats.mean_life_fraction,
                driver.field().config().gravity
            );
            if args.realtime {
                debug!("wall clock {:.1} fps", timer.fps());
            }
        }

        if args.realtime {
            if let Some(rest) = frame_budget.checked_sub(frame_start.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    let stats = driver.field().stats();
    info!(
        "done: {} frames in {:.2?}, {} beats, {} onsets, peak {} particles, {} alive at end",
        driver.frames(),
        started.elapsed(),
        beats,
        onsets,
        peak,
        stats.alive_particles
    );

    if let Some(path) = &args.dump_vertices {
        let vertices = driver.field().vertices();
        fs::write(path, ParticleVertex::as_bytes(&vertices))?;
        info!("wrote {} vertices to {}", vertices.len(), path.display());
    }

    Ok(())
}
