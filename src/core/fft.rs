//! Real FFT bridge used by the STFT engine.
//!
//! Wraps `realfft` plans for one window size and presents the half spectrum
//! as `window_size / 2 + 1` ordered complex bins, DC first and Nyquist last,
//! both purely real. The inverse is scaled by `1 / window_size` so that a
//! forward/inverse round trip is the identity.

use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Forward and inverse real FFT plans of a fixed size.
pub struct RealFft {
    size: usize,
    forward_plan: Arc<dyn RealToComplex<f32>>,
    inverse_plan: Arc<dyn ComplexToReal<f32>>,
    scratch_forward: Vec<Complex<f32>>,
    scratch_inverse: Vec<Complex<f32>>,
}

impl RealFft {
    /// Plans transforms for the given window size (must be a power of two).
    pub fn new(size: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let forward_plan = planner.plan_fft_forward(size);
        let inverse_plan = planner.plan_fft_inverse(size);
        let scratch_forward = forward_plan.make_scratch_vec();
        let scratch_inverse = inverse_plan.make_scratch_vec();
        Self {
            size,
            forward_plan,
            inverse_plan,
            scratch_forward,
            scratch_inverse,
        }
    }

    /// The transform length in samples.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of positive-frequency bins including DC and Nyquist.
    #[inline]
    pub fn spectrum_size(&self) -> usize {
        self.size / 2 + 1
    }

    /// Forward transform of one window. `time` is clobbered as scratch.
    pub fn forward(&mut self, time: &mut [f32], spectrum: &mut [Complex<f32>]) {
        self.forward_plan
            .process_with_scratch(time, spectrum, &mut self.scratch_forward)
            .expect("forward FFT with planned buffer sizes");
    }

    /// Inverse transform into `time`, scaled so that `forward` then
    /// `inverse` reproduces the input. `spectrum` is clobbered as scratch;
    /// DC and Nyquist must be purely real.
    pub fn inverse(&mut self, spectrum: &mut [Complex<f32>], time: &mut [f32]) {
        self.inverse_plan
            .process_with_scratch(spectrum, time, &mut self.scratch_inverse)
            .expect("inverse FFT with real DC and Nyquist bins");
        let scale = 1.0 / self.size as f32;
        for sample in time.iter_mut() {
            *sample *= scale;
        }
    }
}
