//! Profile lifecycle: accumulation, multi-source merging, and reuse.

mod common;

use common::{sine, white_noise};
use denoise::{AudioBuffer, NoiseReducer, NoiseReductionParams, ReduceError};

const RATE: u32 = 44100;

fn capture_means(track: &AudioBuffer, t0: f64, t1: f64) -> Vec<f32> {
    let mut reducer = NoiseReducer::new(NoiseReductionParams::new()).unwrap();
    reducer.capture_profile(track, t0, t1).unwrap();
    reducer.profile().unwrap().means().to_vec()
}

#[test]
fn test_stereo_capture_averages_both_channels() {
    // Each channel is folded in as its own profile source with the same
    // window count, so the merged means are the average of the per-channel
    // means.
    let n = RATE as usize;
    let left = sine(500.0, RATE, n, 0.2);
    let right = sine(2000.0, RATE, n, 0.05);

    let mut interleaved = Vec::with_capacity(n * 2);
    for i in 0..n {
        interleaved.push(left[i]);
        interleaved.push(right[i]);
    }
    let stereo = AudioBuffer::from_stereo(interleaved, RATE);

    let merged = capture_means(&stereo, 0.0, 1.0);
    let left_means = capture_means(&AudioBuffer::from_mono(left, RATE), 0.0, 1.0);
    let right_means = capture_means(&AudioBuffer::from_mono(right, RATE), 0.0, 1.0);

    for (i, &m) in merged.iter().enumerate() {
        let expected = (left_means[i] + right_means[i]) / 2.0;
        let tolerance = 1e-5 + expected.abs() * 1e-4;
        assert!(
            (m - expected).abs() < tolerance,
            "bin {}: merged {} expected {}",
            i,
            m,
            expected
        );
    }
}

#[test]
fn test_profile_window_count_matches_selection() {
    let track = AudioBuffer::from_mono(white_noise(RATE as usize, 0.01, 11), RATE);
    let mut reducer = NoiseReducer::new(NoiseReductionParams::new()).unwrap();
    reducer.capture_profile(&track, 0.0, 1.0).unwrap();

    // With hop 512, windows complete at 2048, 2560, ... up to 44100.
    let expected = 1 + (RATE as usize - 2048) / 512;
    assert_eq!(
        reducer.profile().unwrap().total_windows(),
        expected as u32
    );
}

#[test]
fn test_zero_length_selection_is_too_short() {
    let track = AudioBuffer::from_mono(white_noise(RATE as usize, 0.01, 12), RATE);
    let mut reducer = NoiseReducer::new(NoiseReductionParams::new()).unwrap();
    assert_eq!(
        reducer.capture_profile(&track, 0.5, 0.5),
        Err(ReduceError::ProfileTooShort)
    );
    assert!(reducer.profile().is_none());
}

#[test]
fn test_recapture_replaces_profile() {
    let quiet = AudioBuffer::from_mono(white_noise(RATE as usize, 0.001, 13), RATE);
    let loud = AudioBuffer::from_mono(white_noise(RATE as usize, 0.1, 14), RATE);

    let mut reducer = NoiseReducer::new(NoiseReductionParams::new()).unwrap();
    reducer.capture_profile(&quiet, 0.0, 1.0).unwrap();
    let quiet_mean: f32 = reducer.profile().unwrap().means().iter().sum();
    reducer.capture_profile(&loud, 0.0, 1.0).unwrap();
    let loud_mean: f32 = reducer.profile().unwrap().means().iter().sum();

    // The second capture starts fresh rather than merging with the first.
    assert!(loud_mean > quiet_mean * 1000.0);
}

#[test]
fn test_profile_can_move_between_reducers() {
    let track = AudioBuffer::from_mono(white_noise(RATE as usize, 0.01, 15), RATE);
    let mut first = NoiseReducer::new(NoiseReductionParams::new()).unwrap();
    first.capture_profile(&track, 0.0, 1.0).unwrap();
    let profile = first.take_profile().unwrap();

    // Taking the profile re-arms the first reducer.
    assert!(matches!(first.reduce(&track), Err(ReduceError::NoProfile)));

    let mut second = NoiseReducer::new(NoiseReductionParams::new()).unwrap();
    second.set_profile(profile);
    let output = second.reduce(&track).unwrap();
    assert_eq!(output.data.len(), track.data.len());
}
