//! Integration tests for beat matching and track loading.

use beatfield::{BeatOracle, BeatTrack, PlaybackClock, TrackError};
use std::fs;

fn manual(track: BeatTrack) -> BeatOracle {
    BeatOracle::from_track(track).unwrap().with_clock(PlaybackClock::manual())
}

#[test]
fn test_fresh_oracle_is_idle() {
    let oracle = BeatOracle::new(vec![0.0, 0.5], vec![0.0], 1.0).unwrap();
    assert!(!oracle.is_playing());
    assert_eq!(oracle.elapsed(), 0.0);
    assert_eq!(oracle.progress(), 0.0);
}

#[test]
fn test_window_edges() {
    let mut oracle = manual(BeatTrack::new(vec![1.0], Vec::new(), 2.0));

    oracle.seek(1.05);
    let (found, intensity) = oracle.is_beat(0.1);
    assert!(found);
    assert!((intensity - 1.0).abs() < 1e-4);

    oracle.seek(1.2);
    assert_eq!(oracle.is_beat(0.1), (false, 0.0));

    oracle.seek(0.95);
    let (found, intensity) = oracle.is_beat(0.1);
    assert!(found);
    assert!((intensity - 1.0).abs() < 1e-4);
}

#[test]
fn test_intensity_falls_off_linearly() {
    let oracle = manual(BeatTrack::new(vec![2.0], Vec::new(), 4.0));
    let exact = oracle.is_beat_at(2.0, 0.2).1;
    let quarter = oracle.is_beat_at(2.05, 0.2).1;
    let half = oracle.is_beat_at(2.1, 0.2).1;
    assert!(exact > quarter && quarter > half);
    assert!((half - exact / 2.0).abs() < 1e-4);
}

#[test]
fn test_progress_over_playback() {
    let mut oracle = manual(BeatTrack::new(Vec::new(), Vec::new(), 4.0));
    oracle.start();
    oracle.advance(1.0);
    assert!((oracle.progress() - 0.25).abs() < 1e-6);
    oracle.advance(10.0);
    assert_eq!(oracle.progress(), 1.0);

    oracle.stop();
    oracle.advance(1.0);
    assert_eq!(oracle.progress(), 1.0);
}

#[test]
fn test_metronome_beats_all_match() {
    let track = BeatTrack::metronome(100.0, 6.0, 0.2);
    let oracle = manual(track.clone());
    assert_eq!(oracle.tempo(), Some(100.0));
    for &t in &track.beat_times {
        assert!(oracle.is_beat_at(t, 0.01).0);
        assert!(oracle.is_onset_at(t, 0.01).0);
    }
    // off-beat eighths are onsets but not beats
    let off_beat = track.beat_times[1] + 0.3;
    assert!(!oracle.is_beat_at(off_beat, 0.05).0);
    assert!(oracle.is_onset_at(off_beat, 0.05).0);
}

#[test]
fn test_load_track_file() {
    let path = std::env::temp_dir().join(format!("beatfield-track-{}.json", std::process::id()));
    fs::write(
        &path,
        r#"{
            "tempo": 128.0,
            "duration": 3.0,
            "beat_times": [0.5, 0.97, 1.44],
            "onset_times": [0.5, 0.7],
            "energy": { "hop": 0.5, "values": [0.0, 0.4, 0.9, 0.2, 0.1, 0.0] }
        }"#,
    )
    .unwrap();

    let track = BeatTrack::load(&path).unwrap();
    fs::remove_file(&path).ok();

    let mut oracle = manual(track);
    assert_eq!(oracle.beat_times().len(), 3);
    assert!(oracle.is_beat_at(0.98, 0.05).0);

    oracle.seek(1.2);
    assert!((oracle.energy() - 0.9).abs() < 1e-6);
    assert_eq!(oracle.spectral_centroid(), 0.0);
}

#[test]
fn test_invalid_track_rejected() {
    let track = BeatTrack::new(vec![0.5], Vec::new(), f32::NAN);
    assert!(matches!(
        BeatOracle::from_track(track),
        Err(TrackError::InvalidDuration(_))
    ));
}
