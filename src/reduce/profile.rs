//! The noise profile: per-band power statistics gathered on the first pass.

use crate::core::window::WindowPairKind;

/// Per-band statistics of a noise-only selection.
///
/// Built by the profile pass, read-only during reduction. A profile may be
/// kept and reused across effect invocations; reduction validates the sample
/// rate and window size against it.
#[derive(Debug, Clone)]
pub struct NoiseProfile {
    rate: f64,
    window_size: usize,
    window_pair: WindowPairKind,
    sums: Vec<f32>,
    means: Vec<f32>,
    total_windows: u32,
    track_windows: u32,
}

impl NoiseProfile {
    pub(crate) fn new(rate: f64, window_size: usize, window_pair: WindowPairKind) -> Self {
        let spectrum_size = window_size / 2 + 1;
        Self {
            rate,
            window_size,
            window_pair,
            sums: vec![0.0; spectrum_size],
            means: vec![0.0; spectrum_size],
            total_windows: 0,
            track_windows: 0,
        }
    }

    /// Sample rate of the profiled source(s).
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Window size the profile was captured with.
    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Window pair the profile was captured with.
    #[inline]
    pub fn window_pair(&self) -> WindowPairKind {
        self.window_pair
    }

    /// Per-band mean power of the noise.
    #[inline]
    pub fn means(&self) -> &[f32] {
        &self.means
    }

    /// Number of windows folded into the means so far.
    #[inline]
    pub fn total_windows(&self) -> u32 {
        self.total_windows
    }

    /// Adds one window's power spectrum to the running sums.
    pub(crate) fn accumulate(&mut self, power: &[f32]) {
        debug_assert_eq!(power.len(), self.sums.len());
        self.track_windows += 1;
        for (sum, &p) in self.sums.iter_mut().zip(power) {
            *sum += p;
        }
    }

    /// Folds the current source's sums into the means.
    ///
    /// Combining as a weighted mean keeps precision when several sources are
    /// profiled one after another; the sums are divided only once per source.
    pub(crate) fn finish_source(&mut self) {
        let windows = self.track_windows;
        let prior = self.total_windows;
        let denom = windows + prior;
        if windows > 0 {
            for (mean, sum) in self.means.iter_mut().zip(self.sums.iter_mut()) {
                *mean = (*mean * prior as f32 + *sum) / denom as f32;
                *sum = 0.0;
            }
        }
        self.track_windows = 0;
        self.total_windows = denom;
    }
}
