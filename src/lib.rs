#![forbid(unsafe_code)]
//! Two-pass spectral noise reduction for digital audio.
//!
//! `denoise` removes steady background noise (hiss, hum, fan rumble) from a
//! recording in two passes. The first pass profiles a stretch of audio that
//! contains only the noise, building a per-frequency-band statistical model.
//! The second pass classifies each band of each analysis window against that
//! profile and suppresses the ones that look like noise, with attack/release
//! shaping in time and geometric smoothing across frequency so that the
//! result stays free of musical-noise artifacts. Processing is offline; the
//! effect looks ahead in its window history and is not suited to low-latency
//! streaming.
//!
//! # Quick Start
//!
//! ```
//! use denoise::{AudioBuffer, NoiseReducer, NoiseReductionParams};
//!
//! let rate = 44100;
//! // Half a second of background hiss, then the signal to clean.
//! let hiss: Vec<f32> = (0..rate as usize / 2)
//!     .map(|i| 0.01 * (i as f32 * 1.7).sin() * (i as f32 * 0.23).cos())
//!     .collect();
//! let signal: Vec<f32> = (0..rate as usize)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / rate as f32).sin())
//!     .collect();
//!
//! let params = NoiseReductionParams::new().with_noise_gain_db(12.0);
//! let mut reducer = NoiseReducer::new(params).unwrap();
//! reducer
//!     .capture_profile(&AudioBuffer::from_mono(hiss, rate), 0.0, 0.5)
//!     .unwrap();
//! let cleaned = reducer
//!     .reduce(&AudioBuffer::from_mono(signal, rate))
//!     .unwrap();
//! assert_eq!(cleaned.data.len(), rate as usize);
//! ```

pub mod core;
pub mod error;
pub mod io;
pub mod reduce;

pub use crate::core::types::{
    db_to_linear, linear_to_db, AudioBuffer, Channels, ClassificationMethod,
    NoiseReductionParams, ReductionMode, Sample,
};
pub use crate::core::window::WindowPairKind;
pub use crate::error::ReduceError;
pub use crate::reduce::{NoiseProfile, NoiseReducer};

/// One-shot noise reduction of a mono signal.
///
/// Profiles the whole of `noise`, then reduces `input` against it. For
/// control over the two passes, multi-channel tracks, or profile reuse, use
/// [`NoiseReducer`] directly.
///
/// # Errors
///
/// Returns [`ReduceError::ConfigInvalid`] for inconsistent parameters and
/// [`ReduceError::ProfileTooShort`] when `noise` does not fill a single
/// analysis window.
///
/// # Example
///
/// ```
/// use denoise::NoiseReductionParams;
///
/// let rate = 44100;
/// let hiss: Vec<f32> = (0..22050).map(|i| 0.01 * (i as f32 * 2.1).sin()).collect();
/// let signal: Vec<f32> = (0..44100)
///     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / rate as f32).sin())
///     .collect();
///
/// let output = denoise::reduce(&signal, &hiss, rate, &NoiseReductionParams::new()).unwrap();
/// assert_eq!(output.len(), signal.len());
/// ```
pub fn reduce(
    input: &[f32],
    noise: &[f32],
    sample_rate: u32,
    params: &NoiseReductionParams,
) -> Result<Vec<f32>, ReduceError> {
    let mut reducer = NoiseReducer::new(params.clone())?;
    let noise_track = AudioBuffer::from_mono(noise.to_vec(), sample_rate);
    reducer.capture_profile(&noise_track, 0.0, noise_track.duration_secs())?;

    let track = AudioBuffer::from_mono(input.to_vec(), sample_rate);
    Ok(reducer.reduce(&track)?.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hiss(n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| 0.01 * ((i as f32 * 1.9).sin() + (i as f32 * 0.61).cos()))
            .collect()
    }

    #[test]
    fn test_reduce_empty_input() {
        let output = reduce(&[], &hiss(8192), 44100, &NoiseReductionParams::new()).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_reduce_preserves_length() {
        let input: Vec<f32> = (0..10_000)
            .map(|i| (2.0 * std::f32::consts::PI * 880.0 * i as f32 / 44100.0).sin())
            .collect();
        let output = reduce(&input, &hiss(8192), 44100, &NoiseReductionParams::new()).unwrap();
        assert_eq!(output.len(), input.len());
    }

    #[test]
    fn test_reduce_rejects_short_noise() {
        let err = reduce(&[0.0; 4096], &hiss(100), 44100, &NoiseReductionParams::new());
        assert!(matches!(err, Err(ReduceError::ProfileTooShort)));
    }

    #[test]
    fn test_reduce_rejects_bad_config() {
        let params = NoiseReductionParams::new().with_window_size(1000);
        let err = reduce(&[0.0; 4096], &hiss(8192), 44100, &params);
        assert!(matches!(err, Err(ReduceError::ConfigInvalid(_))));
    }
}
