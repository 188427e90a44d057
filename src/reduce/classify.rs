//! Per-band noise classification over the examination neighborhood.

use crate::core::types::ClassificationMethod;
use crate::reduce::history::HistoryRing;

/// Decides whether a band of the center window is noise by examining the
/// band across the neighboring windows in the history ring.
pub(crate) struct Classifier {
    method: ClassificationMethod,
    /// Configured sensitivity converted from base-10 log to natural log.
    sensitivity_factor: f32,
    n_examine: usize,
}

impl Classifier {
    pub fn new(method: ClassificationMethod, sensitivity: f64, n_examine: usize) -> Self {
        // The noise power per bin is assumed exponentially distributed; the
        // quantile function of that distribution is -ln(1 - F) * mean, so the
        // threshold is just a multiple of the profiled mean.
        Self {
            method,
            sensitivity_factor: (sensitivity * std::f64::consts::LN_10) as f32,
            n_examine,
        }
    }

    /// True iff `band` of the center window looks like noise.
    pub fn is_noise(&self, ring: &HistoryRing, means: &[f32], band: usize) -> bool {
        let threshold = self.sensitivity_factor * means[band];
        match self.method {
            ClassificationMethod::SecondGreatest => {
                self.second_greatest(ring, band) <= threshold
            }
            ClassificationMethod::Median => match self.n_examine {
                // With three windows the median is the second greatest.
                3 => self.second_greatest(ring, band) <= threshold,
                5 => self.third_greatest(ring, band) <= threshold,
                _ => true,
            },
        }
    }

    /// Second-largest power of the band across the neighborhood. Throwing
    /// out the single highest excursion keeps one outlier spike from
    /// blocking suppression.
    fn second_greatest(&self, ring: &HistoryRing, band: usize) -> f32 {
        let mut greatest = 0.0f32;
        let mut second = 0.0f32;
        for age in 0..self.n_examine {
            let power = ring.record(age).spectrum[band];
            if power >= greatest {
                second = greatest;
                greatest = power;
            } else if power >= second {
                second = power;
            }
        }
        second
    }

    fn third_greatest(&self, ring: &HistoryRing, band: usize) -> f32 {
        let mut greatest = 0.0f32;
        let mut second = 0.0f32;
        let mut third = 0.0f32;
        for age in 0..self.n_examine {
            let power = ring.record(age).spectrum[band];
            if power >= greatest {
                third = second;
                second = greatest;
                greatest = power;
            } else if power >= second {
                third = second;
                second = power;
            } else if power >= third {
                third = power;
            }
        }
        third
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_with_powers(powers: &[f32]) -> HistoryRing {
        let mut ring = HistoryRing::new(powers.len(), 1);
        ring.reset(0.0);
        // Fill oldest-first so that age 0 holds the last value.
        for &p in powers {
            ring.rotate();
            ring.record_mut(0).spectrum[0] = p;
        }
        ring
    }

    #[test]
    fn test_single_spike_does_not_block_suppression() {
        let ring = ring_with_powers(&[0.1, 0.1, 9.0, 0.1, 0.1]);
        let classifier = Classifier::new(ClassificationMethod::SecondGreatest, 6.0, 5);
        // mean 0.05 -> threshold ~0.69; the 9.0 outlier is discarded.
        assert!(classifier.is_noise(&ring, &[0.05], 0));
    }

    #[test]
    fn test_two_high_windows_are_signal() {
        let ring = ring_with_powers(&[0.1, 9.0, 9.0, 0.1, 0.1]);
        let classifier = Classifier::new(ClassificationMethod::SecondGreatest, 6.0, 5);
        assert!(!classifier.is_noise(&ring, &[0.05], 0));
    }

    #[test]
    fn test_median_needs_three_high_windows() {
        let classifier = Classifier::new(ClassificationMethod::Median, 6.0, 5);
        let two_high = ring_with_powers(&[0.1, 9.0, 9.0, 0.1, 0.1]);
        assert!(classifier.is_noise(&two_high, &[0.05], 0));
        let three_high = ring_with_powers(&[0.1, 9.0, 9.0, 9.0, 0.1]);
        assert!(!classifier.is_noise(&three_high, &[0.05], 0));
    }

    #[test]
    fn test_median_of_three_matches_second_greatest() {
        let powers = [0.3, 2.0, 0.7];
        let ring = ring_with_powers(&powers);
        let median = Classifier::new(ClassificationMethod::Median, 6.0, 3);
        let second = Classifier::new(ClassificationMethod::SecondGreatest, 6.0, 3);
        for mean in [0.01, 0.05, 0.2] {
            assert_eq!(
                median.is_noise(&ring, &[mean], 0),
                second.is_noise(&ring, &[mean], 0)
            );
        }
    }

    #[test]
    fn test_zero_mean_classifies_only_silent_bands_as_noise() {
        let silent = ring_with_powers(&[0.0, 0.0, 0.0]);
        let active = ring_with_powers(&[1e-6, 1e-6, 1e-6]);
        let classifier = Classifier::new(ClassificationMethod::SecondGreatest, 6.0, 3);
        assert!(classifier.is_noise(&silent, &[0.0], 0));
        assert!(!classifier.is_noise(&active, &[0.0], 0));
    }
}
