//! Error types for beatfield.
//!
//! Construction is the only place the core can fail: an invalid
//! [`FieldConfig`](crate::FieldConfig) or a malformed [`BeatTrack`](crate::BeatTrack).
//! Once built, the field and the oracle accept any numeric input and degrade
//! to empty or zero results instead of returning errors.

use std::fmt;

/// Errors raised when validating a [`FieldConfig`](crate::FieldConfig).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Canvas width or height is zero, negative or not finite.
    InvalidCanvas {
        /// Requested canvas width.
        width: f32,
        /// Requested canvas height.
        height: f32,
    },
    /// `max_particles` was zero.
    ZeroMaxParticles,
    /// The color palette has no entries.
    EmptyPalette,
    /// A scalar parameter is out of its allowed range.
    InvalidParameter {
        /// Field name in the configuration.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCanvas { width, height } => write!(
                f,
                "Invalid canvas size {}x{}: both dimensions must be finite and positive",
                width, height
            ),
            ConfigError::ZeroMaxParticles => write!(f, "max_particles must be at least 1"),
            ConfigError::EmptyPalette => write!(f, "Color palette must contain at least one color"),
            ConfigError::InvalidParameter { name, value } => {
                write!(f, "Invalid value for {}: {}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur while loading or validating a beat track.
#[derive(Debug)]
pub enum TrackError {
    /// Failed to read the track file from disk.
    Io(std::io::Error),
    /// The track file is not valid JSON for a [`BeatTrack`](crate::BeatTrack).
    Parse(serde_json::Error),
    /// A beat or onset timestamp is NaN or infinite.
    InvalidTimestamp {
        /// Position in the offending array.
        index: usize,
        /// The rejected value.
        value: f32,
    },
    /// Track duration is negative or not finite.
    InvalidDuration(f32),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::Io(e) => write!(f, "Failed to read beat track: {}", e),
            TrackError::Parse(e) => write!(f, "Failed to parse beat track: {}", e),
            TrackError::InvalidTimestamp { index, value } => {
                write!(f, "Timestamp {} is not finite: {}", index, value)
            }
            TrackError::InvalidDuration(d) => {
                write!(f, "Track duration must be finite and non-negative, got {}", d)
            }
        }
    }
}

impl std::error::Error for TrackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackError::Io(e) => Some(e),
            TrackError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrackError {
    fn from(e: std::io::Error) -> Self {
        TrackError::Io(e)
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(e: serde_json::Error) -> Self {
        TrackError::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidCanvas {
            width: 0.0,
            height: 600.0,
        };
        assert!(err.to_string().contains("0x600"));

        let err = ConfigError::InvalidParameter {
            name: "friction",
            value: 1.5,
        };
        assert_eq!(err.to_string(), "Invalid value for friction: 1.5");
    }

    #[test]
    fn test_track_error_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = TrackError::from(io);
        assert!(err.source().is_some());

        let err = TrackError::InvalidDuration(-1.0);
        assert!(err.source().is_none());
    }
}
