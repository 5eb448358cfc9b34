use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Beat track JSON (beat_times, onset_times, duration, ...)
    #[arg(long, value_name = "TRACK_JSON")]
    pub track: Option<PathBuf>,

    /// Field configuration JSON; missing keys take their defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seconds to simulate (defaults to the track duration)
    #[arg(long)]
    pub seconds: Option<f32>,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60.0)]
    pub fps: f32,

    /// RNG seed for reproducible runs (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Tempo of the metronome track used when no --track is given
    #[arg(long, default_value_t = 120.0)]
    pub bpm: f32,

    /// Pace frames against the wall clock instead of running flat out
    #[arg(long, default_value_t = false)]
    pub realtime: bool,

    /// Write the final vertex buffer to this file
    #[arg(long)]
    pub dump_vertices: Option<PathBuf>,
}
