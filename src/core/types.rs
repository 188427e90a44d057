//! Core types shared across the crate: samples, buffers, and effect parameters.

use crate::core::window::WindowPairKind;
use crate::error::ReduceError;

/// A single audio sample (32-bit float, range -1.0 to 1.0).
pub type Sample = f32;

/// Converts a decibel value to a linear amplitude factor.
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0f64.powf(db / 20.0)
}

/// Converts a linear amplitude factor to decibels.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    20.0 * linear.log10()
}

/// Number of audio channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Mono,
    Stereo,
}

impl Channels {
    /// Returns the number of channels as a usize.
    #[inline]
    pub fn count(self) -> usize {
        match self {
            Channels::Mono => 1,
            Channels::Stereo => 2,
        }
    }
}

/// An audio track held in memory as interleaved sample data.
///
/// This is the crate's stand-in for a host track: reduction reads it by
/// slicing and produces a new buffer of exactly the same length.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Interleaved sample data.
    pub data: Vec<Sample>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel layout.
    pub channels: Channels,
}

impl AudioBuffer {
    /// Creates a new audio buffer.
    pub fn new(data: Vec<Sample>, sample_rate: u32, channels: Channels) -> Self {
        Self {
            data,
            sample_rate,
            channels,
        }
    }

    /// Creates a mono buffer.
    pub fn from_mono(data: Vec<Sample>, sample_rate: u32) -> Self {
        Self::new(data, sample_rate, Channels::Mono)
    }

    /// Creates a stereo buffer from interleaved L/R data.
    pub fn from_stereo(data: Vec<Sample>, sample_rate: u32) -> Self {
        Self::new(data, sample_rate, Channels::Stereo)
    }

    /// Interleaves separate channel vectors into a single buffer.
    ///
    /// Channels are truncated to the shortest one.
    pub fn from_channels(channels_data: &[Vec<Sample>], sample_rate: u32) -> Self {
        let nc = channels_data.len();
        let channels = if nc == 1 {
            Channels::Mono
        } else {
            Channels::Stereo
        };
        let num_frames = channels_data.iter().map(|c| c.len()).min().unwrap_or(0);
        let mut data = Vec::with_capacity(num_frames * nc);
        for i in 0..num_frames {
            for ch in channels_data {
                data.push(ch[i]);
            }
        }
        Self::new(data, sample_rate, channels)
    }

    /// Returns the number of frames (samples per channel).
    #[inline]
    pub fn num_frames(&self) -> usize {
        if self.data.is_empty() {
            return 0;
        }
        self.data.len() / self.channels.count()
    }

    /// Returns the duration in seconds.
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Extracts a single channel from the interleaved data.
    pub fn channel(&self, ch: usize) -> Vec<Sample> {
        let nc = self.channels.count();
        assert!(ch < nc, "channel index out of range");
        self.data.iter().skip(ch).step_by(nc).copied().collect()
    }
}

/// What the effect writes back for classified bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReductionMode {
    /// Suppress noise bands by the configured gain; keep everything else.
    Reduce,
    /// Keep only the noise (gain 1 for noise bands, 0 elsewhere).
    Isolate,
    /// Output what reduction would remove, phase-flipped.
    Residue,
}

/// How a band is judged against the profile over the examination neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationMethod {
    /// Discard the single highest excursion; compare the second greatest.
    SecondGreatest,
    /// Compare the median. Only defined for 2 or 4 steps per window.
    Median,
}

/// Smallest accepted analysis window, in samples.
pub const MIN_WINDOW_SIZE: usize = 8;
/// Largest accepted analysis window, in samples.
pub const MAX_WINDOW_SIZE: usize = 16384;
/// Largest accepted steps-per-window value.
pub const MAX_STEPS_PER_WINDOW: usize = 32;

/// Parameters for the noise reduction effect.
#[derive(Debug, Clone)]
pub struct NoiseReductionParams {
    /// Suppression applied to noise bands, in positive dB.
    pub noise_gain_db: f64,
    /// -log10 of the probability that noise is allowed to stray above the
    /// classification threshold.
    pub sensitivity: f64,
    /// Half-width of the frequency-gain smoothing window, in bins.
    pub freq_smoothing_bands: usize,
    /// Attack time in seconds (gain rise before detected signal).
    pub attack_time: f64,
    /// Release time in seconds (gain decay after detected signal).
    pub release_time: f64,
    /// Reduction output mode.
    pub mode: ReductionMode,
    /// Analysis/synthesis window pair.
    pub window_pair: WindowPairKind,
    /// Analysis window size in samples (power of two).
    pub window_size: usize,
    /// Number of window starts per window length (power of two).
    pub steps_per_window: usize,
    /// Band classification method.
    pub method: ClassificationMethod,
    /// Optional band of interest in Hz; bands outside it are never noise.
    pub spectral_range: Option<(f64, f64)>,
}

impl Default for NoiseReductionParams {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseReductionParams {
    /// Creates parameters with the standard defaults (12 dB reduction,
    /// Hann/Hann windows of 2048 samples, 4 steps per window).
    pub fn new() -> Self {
        Self {
            noise_gain_db: 12.0,
            sensitivity: 6.0,
            freq_smoothing_bands: 3,
            attack_time: 0.02,
            release_time: 0.10,
            mode: ReductionMode::Reduce,
            window_pair: WindowPairKind::HannHann,
            window_size: 2048,
            steps_per_window: 4,
            method: ClassificationMethod::SecondGreatest,
            spectral_range: None,
        }
    }

    /// Sets the suppression applied to noise bands, in positive dB.
    pub fn with_noise_gain_db(mut self, db: f64) -> Self {
        self.noise_gain_db = db;
        self
    }

    /// Sets the sensitivity (-log10 of the allowed over-threshold probability).
    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Sets the frequency smoothing half-width in bins. Zero disables smoothing.
    pub fn with_freq_smoothing_bands(mut self, bands: usize) -> Self {
        self.freq_smoothing_bands = bands;
        self
    }

    /// Sets the attack time in seconds.
    pub fn with_attack_time(mut self, secs: f64) -> Self {
        self.attack_time = secs;
        self
    }

    /// Sets the release time in seconds.
    pub fn with_release_time(mut self, secs: f64) -> Self {
        self.release_time = secs;
        self
    }

    /// Sets the reduction output mode.
    pub fn with_mode(mut self, mode: ReductionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the analysis/synthesis window pair.
    pub fn with_window_pair(mut self, pair: WindowPairKind) -> Self {
        self.window_pair = pair;
        self
    }

    /// Sets the analysis window size in samples.
    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Sets the number of window starts per window length.
    pub fn with_steps_per_window(mut self, steps: usize) -> Self {
        self.steps_per_window = steps;
        self
    }

    /// Sets the band classification method.
    pub fn with_method(mut self, method: ClassificationMethod) -> Self {
        self.method = method;
        self
    }

    /// Restricts the affected band to `[low_hz, high_hz)`.
    pub fn with_spectral_range(mut self, low_hz: f64, high_hz: f64) -> Self {
        self.spectral_range = Some((low_hz, high_hz));
        self
    }

    /// Hop size between successive window starts, in samples.
    #[inline]
    pub fn step_size(&self) -> usize {
        self.window_size / self.steps_per_window
    }

    /// Number of positive-frequency bins including DC and Nyquist.
    #[inline]
    pub fn spectrum_size(&self) -> usize {
        self.window_size / 2 + 1
    }

    /// Checks the parameters before any sample is read.
    pub fn validate(&self) -> Result<(), ReduceError> {
        if !self.window_size.is_power_of_two()
            || !(MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&self.window_size)
        {
            return Err(ReduceError::ConfigInvalid(format!(
                "window size must be a power of two between {} and {}, got {}",
                MIN_WINDOW_SIZE, MAX_WINDOW_SIZE, self.window_size
            )));
        }
        if !self.steps_per_window.is_power_of_two()
            || !(2..=MAX_STEPS_PER_WINDOW).contains(&self.steps_per_window)
        {
            return Err(ReduceError::ConfigInvalid(format!(
                "steps per window must be a power of two between 2 and {}, got {}",
                MAX_STEPS_PER_WINDOW, self.steps_per_window
            )));
        }
        if self.steps_per_window > self.window_size {
            return Err(ReduceError::ConfigInvalid(
                "steps per window cannot exceed the window size".to_string(),
            ));
        }
        if self.steps_per_window < self.window_pair.min_steps() {
            return Err(ReduceError::ConfigInvalid(format!(
                "{:?} windows require at least {} steps per window",
                self.window_pair,
                self.window_pair.min_steps()
            )));
        }
        if self.method == ClassificationMethod::Median && self.steps_per_window > 4 {
            return Err(ReduceError::ConfigInvalid(
                "median method is not implemented for more than four steps per window"
                    .to_string(),
            ));
        }
        if !self.noise_gain_db.is_finite() || self.noise_gain_db <= 0.0 {
            return Err(ReduceError::ConfigInvalid(format!(
                "noise gain must be positive dB, got {}",
                self.noise_gain_db
            )));
        }
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(ReduceError::ConfigInvalid(format!(
                "sensitivity must be positive, got {}",
                self.sensitivity
            )));
        }
        if self.attack_time < 0.0 || self.release_time < 0.0 {
            return Err(ReduceError::ConfigInvalid(
                "attack and release times cannot be negative".to_string(),
            ));
        }
        if let Some((low, high)) = self.spectral_range {
            if !(low >= 0.0 && high > low) {
                return Err(ReduceError::ConfigInvalid(format!(
                    "spectral range must satisfy 0 <= low < high, got {}..{}",
                    low, high
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_conversions() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-12);
        assert!((db_to_linear(-20.0) - 0.1).abs() < 1e-12);
        assert!((linear_to_db(0.5) + 6.0206).abs() < 1e-3);
    }

    #[test]
    fn test_audio_buffer_frames_and_channels() {
        let buf = AudioBuffer::from_stereo(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 44100);
        assert_eq!(buf.num_frames(), 3);
        assert_eq!(buf.channel(0), vec![1.0, 3.0, 5.0]);
        assert_eq!(buf.channel(1), vec![2.0, 4.0, 6.0]);

        let mono = AudioBuffer::from_mono(vec![0.0; 44100], 44100);
        assert!((mono.duration_secs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_channels_interleaves() {
        let buf = AudioBuffer::from_channels(&[vec![1.0, 2.0], vec![3.0, 4.0]], 48000);
        assert_eq!(buf.data, vec![1.0, 3.0, 2.0, 4.0]);
        assert_eq!(buf.channels, Channels::Stereo);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(NoiseReductionParams::new().validate().is_ok());
    }

    #[test]
    fn test_step_and_spectrum_size() {
        let params = NoiseReductionParams::new()
            .with_window_size(2048)
            .with_steps_per_window(4);
        assert_eq!(params.step_size(), 512);
        assert_eq!(params.spectrum_size(), 1025);
    }

    #[test]
    fn test_rejects_bad_window_size() {
        let params = NoiseReductionParams::new().with_window_size(1000);
        assert!(matches!(
            params.validate(),
            Err(ReduceError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_rejects_too_few_steps_for_window_pair() {
        // Hann/Hann needs at least 4 steps per window.
        let params = NoiseReductionParams::new()
            .with_window_pair(WindowPairKind::HannHann)
            .with_steps_per_window(2);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_median_with_many_steps() {
        let params = NoiseReductionParams::new()
            .with_method(ClassificationMethod::Median)
            .with_steps_per_window(8);
        assert!(matches!(
            params.validate(),
            Err(ReduceError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_rejects_nonpositive_gain() {
        let params = NoiseReductionParams::new().with_noise_gain_db(0.0);
        assert!(params.validate().is_err());
    }
}
