//! Gain shaping in time (attack/release) and frequency (smoothing).

use crate::core::types::db_to_linear;
use crate::reduce::history::HistoryRing;

/// Shapes the per-band gain vectors held in the history ring.
///
/// The attack envelope raises gains in windows *after* the classified center
/// (later in input time, sooner to be synthesized) so that suppression backs
/// off before a detected signal arrives; the release extends the decay one
/// window at a time as the center advances.
pub(crate) struct GainShaper {
    atten_floor: f32,
    one_block_attack: f32,
    one_block_release: f32,
    attack_blocks: usize,
    center: usize,
    spectrum_size: usize,
    freq_smoothing_bins: usize,
    scratch: Vec<f32>,
}

impl GainShaper {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        noise_gain_db: f64,
        attack_time: f64,
        release_time: f64,
        sample_rate: f64,
        step_size: usize,
        center: usize,
        freq_smoothing_bins: usize,
        spectrum_size: usize,
    ) -> Self {
        let noise_gain = -noise_gain_db;
        let attack_blocks = 1 + (attack_time * sample_rate / step_size as f64) as usize;
        let release_blocks = 1 + (release_time * sample_rate / step_size as f64) as usize;
        Self {
            atten_floor: db_to_linear(noise_gain) as f32,
            one_block_attack: db_to_linear(noise_gain / attack_blocks as f64) as f32,
            one_block_release: db_to_linear(noise_gain / release_blocks as f64) as f32,
            attack_blocks,
            center,
            spectrum_size,
            freq_smoothing_bins,
            scratch: vec![0.0; spectrum_size],
        }
    }

    /// The gain floor for suppressed bands.
    #[inline]
    pub fn atten_floor(&self) -> f32 {
        self.atten_floor
    }

    /// How many history steps the attack envelope spans; the ring must be
    /// long enough to hold them past the center.
    #[inline]
    pub fn attack_blocks(&self) -> usize {
        self.attack_blocks
    }

    /// Applies the attack and release envelopes around the center window.
    ///
    /// Gains are only ever raised, so every value stays in
    /// `[atten_floor, 1]`.
    pub fn apply_attack_release(&self, ring: &mut HistoryRing) {
        let history_len = ring.len();
        let spectrum_size = self.spectrum_size;

        // Attack: walk from the center toward the newest records. Stop as
        // soon as the existing curve already covers the decay; it was set by
        // an earlier center and extends further than this one can.
        for band in 0..spectrum_size {
            for age in (self.center + 1)..history_len {
                let minimum = self
                    .atten_floor
                    .max(ring.record(age - 1).gains[band] * self.one_block_attack);
                let gain = &mut ring.record_mut(age).gains[band];
                if *gain < minimum {
                    *gain = minimum;
                } else {
                    break;
                }
            }
        }

        // Release: only one window ahead; this rule reapplies at every step
        // as the center advances, carrying the decay further.
        for band in 0..spectrum_size {
            let decayed = self
                .atten_floor
                .max(ring.record(self.center).gains[band] * self.one_block_release);
            let gain = &mut ring.record_mut(self.center - 1).gains[band];
            *gain = gain.max(decayed);
        }
    }

    /// Smooths a gain vector across frequency with a geometric mean.
    ///
    /// Multiplying and taking an nth root would underflow quickly, so the
    /// logs are averaged instead.
    pub fn smooth_frequencies(&mut self, gains: &mut [f32]) {
        if self.freq_smoothing_bins == 0 {
            return;
        }
        let n = gains.len();
        let half = self.freq_smoothing_bins;

        for gain in gains.iter_mut() {
            *gain = gain.ln();
        }
        for (i, out) in self.scratch[..n].iter_mut().enumerate() {
            let j0 = i.saturating_sub(half);
            let j1 = (i + half).min(n - 1);
            let sum: f32 = gains[j0..=j1].iter().sum();
            *out = sum / (j1 - j0 + 1) as f32;
        }
        for (gain, &smoothed) in gains.iter_mut().zip(&self.scratch[..n]) {
            *gain = smoothed.exp();
        }
    }
}
