use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

/// Generates a mono sine wave.
pub fn sine(freq_hz: f32, sample_rate: u32, n: usize, amplitude: f32) -> Vec<f32> {
    (0..n)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Deterministic white noise with the given RMS level.
pub fn white_noise(n: usize, rms: f32, seed: u64) -> Vec<f32> {
    let mut rng = SmallRng::seed_from_u64(seed);
    // Uniform noise on [-a, a) has RMS a/sqrt(3).
    let amplitude = rms * 3.0f32.sqrt();
    (0..n)
        .map(|_| rng.gen_range(-amplitude..amplitude))
        .collect()
}

/// Adds two signals sample-wise, truncating to the shorter.
pub fn mix(a: &[f32], b: &[f32]) -> Vec<f32> {
    a.iter().zip(b).map(|(&x, &y)| x + y).collect()
}

/// RMS over a slice.
pub fn rms(signal: &[f32]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = signal.iter().map(|&s| s as f64 * s as f64).sum();
    (sum_sq / signal.len() as f64).sqrt()
}

/// Amplitude of the signal's projection onto the given frequency.
pub fn energy_at_freq(signal: &[f32], sample_rate: u32, freq_hz: f32) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let mut re = 0.0f64;
    let mut im = 0.0f64;
    for (i, &s) in signal.iter().enumerate() {
        let angle = 2.0 * std::f64::consts::PI * freq_hz as f64 * i as f64 / sample_rate as f64;
        re += s as f64 * angle.cos();
        im -= s as f64 * angle.sin();
    }
    (re * re + im * im).sqrt() / signal.len() as f64
}

/// Ratio of two amplitudes in dB.
pub fn ratio_db(output: f64, input: f64) -> f64 {
    20.0 * (output / input).log10()
}
