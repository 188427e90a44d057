//! Two-pass orchestration: capture a profile, then reduce tracks against it.

use crate::core::types::{AudioBuffer, NoiseReductionParams};
use crate::error::ReduceError;
use crate::reduce::engine::{Pass, StftEngine};
use crate::reduce::profile::NoiseProfile;

/// Feed the engine in bounded blocks, the way a host would stream a track.
const BLOCK_SIZE: usize = 8192;

/// The noise reduction effect.
///
/// Holds the validated parameters and the profile statistics between the two
/// passes. A fresh reducer is "armed" for profiling: [`apply`](Self::apply)
/// captures on its first use and reduces on every use after that, matching a
/// repeat-last-effect gesture. [`capture_profile`](Self::capture_profile)
/// and [`reduce`](Self::reduce) are also available directly.
pub struct NoiseReducer {
    params: NoiseReductionParams,
    profile: Option<NoiseProfile>,
    do_profile: bool,
}

impl NoiseReducer {
    /// Validates the parameters and creates the effect.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::ConfigInvalid`] before any sample is read when
    /// the parameters are inconsistent (see
    /// [`NoiseReductionParams::validate`]).
    pub fn new(params: NoiseReductionParams) -> Result<Self, ReduceError> {
        params.validate()?;
        Ok(Self {
            params,
            profile: None,
            do_profile: true,
        })
    }

    /// The parameters this effect was created with.
    #[inline]
    pub fn params(&self) -> &NoiseReductionParams {
        &self.params
    }

    /// The captured profile, if any.
    #[inline]
    pub fn profile(&self) -> Option<&NoiseProfile> {
        self.profile.as_ref()
    }

    /// Installs a previously captured profile, disarming the profile pass.
    pub fn set_profile(&mut self, profile: NoiseProfile) {
        self.profile = Some(profile);
        self.do_profile = false;
    }

    /// Removes and returns the stored profile, re-arming the profile pass.
    pub fn take_profile(&mut self) -> Option<NoiseProfile> {
        self.do_profile = true;
        self.profile.take()
    }

    /// Captures the noise profile from the selection `[t0, t1)` seconds of
    /// `track`. The selection is quantized to whole samples at the track's
    /// rate; every channel is folded into the statistics as its own source.
    ///
    /// Any previously stored profile is discarded, even on failure, so a
    /// failed capture forces a recapture before reduction.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::ProfileTooShort`] when the selection does not
    /// fill a single analysis window.
    pub fn capture_profile(
        &mut self,
        track: &AudioBuffer,
        t0: f64,
        t1: f64,
    ) -> Result<(), ReduceError> {
        self.profile = None;

        let rate = track.sample_rate as f64;
        let frames = track.num_frames();
        let start = ((t0.max(0.0) * rate).round() as usize).min(frames);
        let end = ((t1.max(0.0) * rate).round() as usize).clamp(start, frames);

        let mut profile = NoiseProfile::new(rate, self.params.window_size, self.params.window_pair);
        for ch in 0..track.channels.count() {
            let samples = track.channel(ch);
            let selection = &samples[start..end];

            let mut engine = StftEngine::new(&self.params, rate, true);
            engine.begin();
            let mut pass = Pass::Profile(&mut profile);
            for block in selection.chunks(BLOCK_SIZE) {
                engine.feed(&mut pass, block);
            }
            profile.finish_source();
        }

        if profile.total_windows() == 0 {
            return Err(ReduceError::ProfileTooShort);
        }

        log::debug!(
            "captured noise profile: {} windows of {} samples at {} Hz",
            profile.total_windows(),
            self.params.window_size,
            rate
        );
        self.profile = Some(profile);
        self.do_profile = false;
        Ok(())
    }

    /// Reduces the whole track against the stored profile, returning a new
    /// buffer of exactly the input length.
    ///
    /// # Errors
    ///
    /// Returns [`ReduceError::NoProfile`] before a successful capture,
    /// [`ReduceError::ProfileRateMismatch`] when the track's rate differs
    /// from the profiled rate, and
    /// [`ReduceError::ProfileWindowSizeMismatch`] when the profile was
    /// captured with a different window size. Differing window *types* are
    /// only warned about.
    pub fn reduce(&self, track: &AudioBuffer) -> Result<AudioBuffer, ReduceError> {
        let profile = self.profile.as_ref().ok_or(ReduceError::NoProfile)?;
        let rate = track.sample_rate as f64;
        if profile.rate() != rate {
            return Err(ReduceError::ProfileRateMismatch {
                profile: profile.rate(),
                track: rate,
            });
        }
        if profile.window_size() != self.params.window_size {
            return Err(ReduceError::ProfileWindowSizeMismatch {
                profile: profile.window_size(),
                requested: self.params.window_size,
            });
        }
        if profile.window_pair() != self.params.window_pair {
            log::warn!(
                "window types differ from the profiling pass ({:?} vs {:?})",
                self.params.window_pair,
                profile.window_pair()
            );
        }

        let mut channel_outputs = Vec::with_capacity(track.channels.count());
        for ch in 0..track.channels.count() {
            let samples = track.channel(ch);

            let mut engine = StftEngine::new(&self.params, rate, false);
            engine.begin();
            let mut output = Vec::with_capacity(samples.len() + self.params.window_size);
            {
                let mut pass = Pass::Reduce {
                    profile,
                    output: &mut output,
                };
                for block in samples.chunks(BLOCK_SIZE) {
                    engine.feed(&mut pass, block);
                }
                engine.finish(&mut pass);
            }
            // The flush emits at most one extra hop; trim the tail so the
            // output replaces the input exactly.
            output.truncate(samples.len());
            channel_outputs.push(output);
        }

        Ok(AudioBuffer::from_channels(
            &channel_outputs,
            track.sample_rate,
        ))
    }

    /// Runs whichever pass is due: the profile pass while armed (returning
    /// `None`), reduction afterwards.
    pub fn apply(
        &mut self,
        track: &AudioBuffer,
        t0: f64,
        t1: f64,
    ) -> Result<Option<AudioBuffer>, ReduceError> {
        if self.do_profile {
            self.capture_profile(track, t0, t1)?;
            Ok(None)
        } else {
            self.reduce(track).map(Some)
        }
    }
}
