//! Error types for the denoise crate.

use std::fmt;

/// Errors that can occur while profiling or reducing noise.
#[derive(Debug, Clone, PartialEq)]
pub enum ReduceError {
    /// Invalid configuration parameters.
    ConfigInvalid(String),
    /// The track to be reduced has a different sample rate than the profile.
    ProfileRateMismatch { profile: f64, track: f64 },
    /// The configured window size differs from the one the profile was captured with.
    ProfileWindowSizeMismatch { profile: usize, requested: usize },
    /// The profile selection was too short to fill even one analysis window.
    ProfileTooShort,
    /// Reduction was requested before any profile was captured.
    NoProfile,
    /// Invalid audio data or file format.
    InvalidFormat(String),
    /// I/O error.
    IoError(String),
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceError::ConfigInvalid(msg) => write!(f, "invalid configuration: {}", msg),
            ReduceError::ProfileRateMismatch { profile, track } => {
                write!(
                    f,
                    "sample rate mismatch: profile was captured at {} Hz, track is {} Hz",
                    profile, track
                )
            }
            ReduceError::ProfileWindowSizeMismatch { profile, requested } => {
                write!(
                    f,
                    "window size mismatch: profile was captured with {} samples, {} requested",
                    profile, requested
                )
            }
            ReduceError::ProfileTooShort => {
                write!(f, "selected noise profile is too short")
            }
            ReduceError::NoProfile => {
                write!(f, "no noise profile: capture one before reducing")
            }
            ReduceError::InvalidFormat(msg) => write!(f, "invalid format: {}", msg),
            ReduceError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ReduceError {}

impl From<std::io::Error> for ReduceError {
    fn from(err: std::io::Error) -> Self {
        ReduceError::IoError(err.to_string())
    }
}
