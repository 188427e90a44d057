//! The STFT engine: sliding analysis windows in, overlap-added samples out.
//!
//! Samples accumulate in a wave buffer until a full window is ready, which
//! is then windowed, transformed, and pushed onto the history ring. In a
//! profile pass the window's power goes straight into the statistics; in a
//! reduce pass the center of the ring is classified, the gain envelopes are
//! shaped, and the oldest record is synthesized back into the overlap-add
//! buffer. The step counter starts negative so the ring primes itself on
//! zero-padded windows before real output begins.

use crate::core::fft::RealFft;
use crate::core::types::{NoiseReductionParams, ReductionMode, Sample};
use crate::core::window::WindowPair;
use crate::reduce::classify::Classifier;
use crate::reduce::gain::GainShaper;
use crate::reduce::history::HistoryRing;
use crate::reduce::profile::NoiseProfile;
use realfft::num_complex::Complex;

/// Which pass the engine is running, and where its results go.
pub(crate) enum Pass<'a> {
    /// Accumulate window power into the profile statistics.
    Profile(&'a mut NoiseProfile),
    /// Classify against the profile and emit reconstructed samples.
    Reduce {
        profile: &'a NoiseProfile,
        output: &'a mut Vec<Sample>,
    },
}

pub(crate) struct StftEngine {
    window_size: usize,
    spectrum_size: usize,
    steps_per_window: usize,
    step_size: usize,
    mode: ReductionMode,
    do_profile: bool,
    /// Affected band of interest; bands outside are never noise.
    bin_low: usize,
    bin_high: usize,
    center: usize,

    fft: RealFft,
    windows: WindowPair,
    classifier: Classifier,
    shaper: GainShaper,
    history: HistoryRing,

    fft_buffer: Vec<f32>,
    spectrum_buffer: Vec<Complex<f32>>,
    in_wave_buffer: Vec<f32>,
    out_overlap_buffer: Vec<f32>,

    /// Samples accepted so far this pass.
    in_sample_count: u64,
    /// Hops emitted so far; negative while the ring primes.
    out_step_count: i64,
    /// Fill position in the wave buffer.
    in_wave_pos: usize,
}

impl StftEngine {
    pub fn new(params: &NoiseReductionParams, sample_rate: f64, do_profile: bool) -> Self {
        let window_size = params.window_size;
        let spectrum_size = window_size / 2 + 1;
        let steps_per_window = params.steps_per_window;
        let step_size = window_size / steps_per_window;
        let n_examine = 1 + steps_per_window;
        let center = n_examine / 2;
        // The release rule writes one window past the center.
        debug_assert!(center >= 1);

        let shaper = GainShaper::new(
            params.noise_gain_db,
            params.attack_time,
            params.release_time,
            sample_rate,
            step_size,
            center,
            params.freq_smoothing_bands,
            spectrum_size,
        );

        // The ring must be long enough both to inspect the middle and to
        // hold the whole attack envelope past it.
        let history_len = if do_profile {
            1
        } else {
            n_examine.max(center + shaper.attack_blocks())
        };

        let (bin_low, bin_high) = match params.spectral_range {
            Some((low_hz, high_hz)) => {
                let bin_width = sample_rate / window_size as f64;
                (
                    ((low_hz / bin_width).floor() as usize).min(spectrum_size),
                    ((high_hz / bin_width).ceil() as usize).min(spectrum_size),
                )
            }
            None => (0, spectrum_size),
        };

        Self {
            window_size,
            spectrum_size,
            steps_per_window,
            step_size,
            mode: params.mode,
            do_profile,
            bin_low,
            bin_high,
            center,
            fft: RealFft::new(window_size),
            windows: WindowPair::build(
                params.window_pair,
                window_size,
                steps_per_window,
                !do_profile,
            ),
            classifier: Classifier::new(params.method, params.sensitivity, n_examine),
            shaper,
            history: HistoryRing::new(history_len, spectrum_size),
            fft_buffer: vec![0.0; window_size],
            spectrum_buffer: vec![Complex::new(0.0, 0.0); spectrum_size],
            in_wave_buffer: vec![0.0; window_size],
            out_overlap_buffer: vec![0.0; window_size],
            in_sample_count: 0,
            out_step_count: 0,
            in_wave_pos: 0,
        }
    }

    /// Resets the engine at the start of a pass.
    pub fn begin(&mut self) {
        self.history.reset(self.shaper.atten_floor());
        self.out_overlap_buffer.fill(0.0);
        self.in_wave_buffer.fill(0.0);

        let history_len = self.history.len() as i64;
        if self.do_profile {
            // No leading zero-padded windows when only gathering statistics.
            self.in_wave_pos = 0;
            self.out_step_count = -(history_len - 1);
        } else {
            // Prime the ring with zero-padded windows, the first carrying
            // one hop of real samples; the counter also has to pass over
            // those padded windows before real output begins.
            self.in_wave_pos = self.window_size - self.step_size;
            self.out_step_count = -(history_len - 1) - (self.steps_per_window as i64 - 1);
        }
        self.in_sample_count = 0;
    }

    /// Accepts a block of input samples.
    pub fn feed(&mut self, pass: &mut Pass<'_>, samples: &[Sample]) {
        self.in_sample_count += samples.len() as u64;
        self.process(pass, samples);
    }

    /// Pushes hops of silence through until every accepted sample has been
    /// matched by output. At most one extra hop of samples results; the
    /// driver trims it against the input length.
    pub fn finish(&mut self, pass: &mut Pass<'_>) {
        let silence = vec![0.0; self.step_size];
        while self.out_step_count * (self.step_size as i64) < self.in_sample_count as i64 {
            self.process(pass, &silence);
        }
    }

    fn process(&mut self, pass: &mut Pass<'_>, mut samples: &[Sample]) {
        while !samples.is_empty()
            && self.out_step_count * (self.step_size as i64) < self.in_sample_count as i64
        {
            let avail = samples.len().min(self.window_size - self.in_wave_pos);
            self.in_wave_buffer[self.in_wave_pos..self.in_wave_pos + avail]
                .copy_from_slice(&samples[..avail]);
            samples = &samples[avail..];
            self.in_wave_pos += avail;

            if self.in_wave_pos == self.window_size {
                self.analyze_window();
                match pass {
                    Pass::Profile(profile) => {
                        profile.accumulate(&self.history.record(0).spectrum)
                    }
                    Pass::Reduce { profile, output } => {
                        self.reduce_step(profile.means(), output)
                    }
                }
                self.out_step_count += 1;
                self.history.rotate();

                // Slide one hop: keep the trailing window_size - step_size
                // samples for the next overlapping window.
                self.in_wave_buffer.copy_within(self.step_size.., 0);
                self.in_wave_pos = self.window_size - self.step_size;
            }
        }
    }

    /// Transforms the current wave buffer into the newest history record.
    fn analyze_window(&mut self) {
        if let Some(window) = &self.windows.analysis {
            for ((out, &sample), &w) in self
                .fft_buffer
                .iter_mut()
                .zip(&self.in_wave_buffer)
                .zip(window)
            {
                *out = sample * w;
            }
        } else {
            self.fft_buffer.copy_from_slice(&self.in_wave_buffer);
        }
        self.fft.forward(&mut self.fft_buffer, &mut self.spectrum_buffer);

        let atten = self.shaper.atten_floor();
        let record = self.history.record_mut(0);
        record.bins.copy_from_slice(&self.spectrum_buffer);
        for (power, bin) in record.spectrum.iter_mut().zip(&record.bins) {
            *power = bin.norm_sqr();
        }
        if self.mode != ReductionMode::Isolate {
            // Default every band to the suppression floor; classification
            // raises the ones that hold signal.
            record.gains.fill(atten);
        }
    }

    /// Classifies the center window, shapes the envelopes, and synthesizes
    /// the oldest record once the priming windows have cleared.
    fn reduce_step(&mut self, means: &[f32], output: &mut Vec<Sample>) {
        let center = self.center;
        let isolate = self.mode == ReductionMode::Isolate;

        let outside = if isolate { 0.0 } else { 1.0 };
        for band in (0..self.bin_low).chain(self.bin_high..self.spectrum_size) {
            self.history.record_mut(center).gains[band] = outside;
        }
        for band in self.bin_low..self.bin_high {
            let is_noise = self.classifier.is_noise(&self.history, means, band);
            let gain = &mut self.history.record_mut(center).gains[band];
            if isolate {
                *gain = if is_noise { 1.0 } else { 0.0 };
            } else if !is_noise {
                *gain = 1.0;
            }
        }

        if !isolate {
            self.shaper.apply_attack_release(&mut self.history);
        }

        // The initial zero-padded windows produce no output.
        if self.out_step_count < -(self.steps_per_window as i64 - 1) {
            return;
        }

        let tail = self.history.len() - 1;
        if !isolate {
            // Gains here are never below the attenuation floor, so the
            // log-domain smoothing is safe.
            self.shaper
                .smooth_frequencies(&mut self.history.record_mut(tail).gains);
        }

        let residue = self.mode == ReductionMode::Residue;
        let record = self.history.record(tail);
        for ((out, &bin), &gain) in self
            .spectrum_buffer
            .iter_mut()
            .zip(&record.bins)
            .zip(&record.gains)
        {
            // Residue subtracts the cleaned signal from the original with a
            // phase flip, leaving what reduction removed.
            let g = if residue { gain - 1.0 } else { gain };
            *out = bin * g;
        }

        self.fft.inverse(&mut self.spectrum_buffer, &mut self.fft_buffer);

        if let Some(window) = &self.windows.synthesis {
            for ((out, &sample), &w) in self
                .out_overlap_buffer
                .iter_mut()
                .zip(&self.fft_buffer)
                .zip(window)
            {
                *out += sample * w;
            }
        } else {
            for (out, &sample) in self.out_overlap_buffer.iter_mut().zip(&self.fft_buffer) {
                *out += sample;
            }
        }

        if self.out_step_count >= 0 {
            // The first hop of the overlap buffer is complete.
            output.extend_from_slice(&self.out_overlap_buffer[..self.step_size]);
        }
        self.out_overlap_buffer.copy_within(self.step_size.., 0);
        self.out_overlap_buffer[self.window_size - self.step_size..].fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::NoiseReductionParams;
    use crate::core::window::WindowPairKind;

    fn small_params() -> NoiseReductionParams {
        NoiseReductionParams::new()
            .with_window_size(64)
            .with_steps_per_window(4)
            .with_freq_smoothing_bands(0)
    }

    fn silent_profile(params: &NoiseReductionParams, rate: f64) -> NoiseProfile {
        let mut profile = NoiseProfile::new(rate, params.window_size, params.window_pair);
        let mut engine = StftEngine::new(params, rate, true);
        engine.begin();
        let silence = vec![0.0f32; params.window_size * 4];
        {
            let mut pass = Pass::Profile(&mut profile);
            engine.feed(&mut pass, &silence);
        }
        profile.finish_source();
        profile
    }

    #[test]
    fn test_profile_pass_counts_windows() {
        let params = small_params();
        let profile = silent_profile(&params, 8000.0);
        // 4 windows of input at hop 16: windows at 64, 80, ..., 256.
        assert_eq!(profile.total_windows(), 13);
        assert!(profile.means().iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_unity_gain_reconstruction() {
        // Against a silent profile every non-silent band classifies as
        // signal, so the pass is unity gain and must reconstruct the input.
        let params = small_params();
        let rate = 8000.0;
        let profile = silent_profile(&params, rate);

        let input: Vec<f32> = (0..2048)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / rate as f32).sin() * 0.5)
            .collect();

        let mut engine = StftEngine::new(&params, rate, false);
        engine.begin();
        let mut output = Vec::new();
        {
            let mut pass = Pass::Reduce {
                profile: &profile,
                output: &mut output,
            };
            engine.feed(&mut pass, &input);
            engine.finish(&mut pass);
        }
        assert!(output.len() >= input.len());
        output.truncate(input.len());

        for (i, (&a, &b)) in input.iter().zip(&output).enumerate() {
            assert!(
                (a - b).abs() < 1e-4,
                "sample {}: input {} output {}",
                i,
                a,
                b
            );
        }
    }

    #[test]
    fn test_unity_gain_for_every_window_pair() {
        let rate = 8000.0;
        for kind in WindowPairKind::ALL {
            let params = small_params()
                .with_window_pair(kind)
                .with_steps_per_window(kind.min_steps().max(4));
            let profile = silent_profile(&params, rate);

            let input: Vec<f32> = (0..1024)
                .map(|i| {
                    (2.0 * std::f32::consts::PI * 500.0 * i as f32 / rate as f32).sin() * 0.25
                })
                .collect();

            let mut engine = StftEngine::new(&params, rate, false);
            engine.begin();
            let mut output = Vec::new();
            {
                let mut pass = Pass::Reduce {
                    profile: &profile,
                    output: &mut output,
                };
                engine.feed(&mut pass, &input);
                engine.finish(&mut pass);
            }
            output.truncate(input.len());
            for (i, (&a, &b)) in input.iter().zip(&output).enumerate() {
                assert!(
                    (a - b).abs() < 1e-4,
                    "{:?} sample {}: input {} output {}",
                    kind,
                    i,
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_feed_is_chunk_size_invariant() {
        let params = small_params();
        let rate = 8000.0;
        let profile = silent_profile(&params, rate);
        let input: Vec<f32> = (0..1500)
            .map(|i| ((i * 7919) % 1000) as f32 / 1000.0 - 0.5)
            .collect();

        let mut outputs = Vec::new();
        for chunk_size in [1500usize, 64, 17] {
            let mut engine = StftEngine::new(&params, rate, false);
            engine.begin();
            let mut output = Vec::new();
            {
                let mut pass = Pass::Reduce {
                    profile: &profile,
                    output: &mut output,
                };
                for block in input.chunks(chunk_size) {
                    engine.feed(&mut pass, block);
                }
                engine.finish(&mut pass);
            }
            output.truncate(input.len());
            outputs.push(output);
        }
        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[0], outputs[2]);
    }
}
