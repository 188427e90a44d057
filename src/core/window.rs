//! Analysis/synthesis window pairs for the STFT engine.
//!
//! Each pair is a raised-cosine family window on either side, chosen so that
//! overlap-adding the product of the two windows over all hop offsets sums to
//! a constant. The synthesis side carries a scale of `1 / (K * steps)` where
//! `K` is the constant term of the window product; with that scale a
//! unit-gain pass through the engine reconstructs the input.

use std::f64::consts::PI;

/// The supported analysis/synthesis window combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPairKind {
    /// Rectangular analysis, Hann synthesis.
    RectangularHann,
    /// Hann analysis, rectangular synthesis.
    HannRectangular,
    /// Hann on both sides (default).
    HannHann,
    /// Blackman analysis, Hann synthesis.
    BlackmanHann,
    /// Hamming analysis, rectangular synthesis.
    HammingRectangular,
    /// Hamming analysis, Hann synthesis.
    HammingHann,
    /// Hamming analysis, reciprocal-Hamming synthesis.
    HammingReciprocal,
}

struct PairInfo {
    min_steps: usize,
    in_coefficients: [f64; 3],
    out_coefficients: [f64; 3],
    /// Constant term of the product of the two windows:
    /// `c0*d0 + (c1*d1)/2 + (c2*d2)/2`.
    product_constant: f64,
}

const PAIR_INFO: [PairInfo; 7] = [
    PairInfo {
        min_steps: 2,
        in_coefficients: [1.0, 0.0, 0.0],
        out_coefficients: [0.5, -0.5, 0.0],
        product_constant: 0.5,
    },
    PairInfo {
        min_steps: 2,
        in_coefficients: [0.5, -0.5, 0.0],
        out_coefficients: [1.0, 0.0, 0.0],
        product_constant: 0.5,
    },
    PairInfo {
        min_steps: 4,
        in_coefficients: [0.5, -0.5, 0.0],
        out_coefficients: [0.5, -0.5, 0.0],
        product_constant: 0.375,
    },
    PairInfo {
        min_steps: 4,
        in_coefficients: [0.42, -0.5, 0.08],
        out_coefficients: [0.5, -0.5, 0.0],
        product_constant: 0.335,
    },
    PairInfo {
        min_steps: 2,
        in_coefficients: [0.54, -0.46, 0.0],
        out_coefficients: [1.0, 0.0, 0.0],
        product_constant: 0.54,
    },
    PairInfo {
        min_steps: 4,
        in_coefficients: [0.54, -0.46, 0.0],
        out_coefficients: [0.5, -0.5, 0.0],
        product_constant: 0.385,
    },
    PairInfo {
        min_steps: 2,
        in_coefficients: [0.54, -0.46, 0.0],
        // The synthesis window is the scaled reciprocal of the analysis
        // window; these coefficients are unused.
        out_coefficients: [1.0, 0.0, 0.0],
        product_constant: 1.0,
    },
];

impl WindowPairKind {
    /// All kinds, in table order.
    pub const ALL: [WindowPairKind; 7] = [
        WindowPairKind::RectangularHann,
        WindowPairKind::HannRectangular,
        WindowPairKind::HannHann,
        WindowPairKind::BlackmanHann,
        WindowPairKind::HammingRectangular,
        WindowPairKind::HammingHann,
        WindowPairKind::HammingReciprocal,
    ];

    fn info(self) -> &'static PairInfo {
        &PAIR_INFO[self as usize]
    }

    /// The smallest steps-per-window value that lets the cosine terms of the
    /// window product cancel during overlap-add.
    #[inline]
    pub fn min_steps(self) -> usize {
        self.info().min_steps
    }

    /// True when the analysis side is rectangular (no window array needed).
    #[inline]
    pub fn rectangular_analysis(self) -> bool {
        matches!(self, WindowPairKind::RectangularHann)
    }

    /// True when the synthesis side is rectangular.
    #[inline]
    pub fn rectangular_synthesis(self) -> bool {
        matches!(
            self,
            WindowPairKind::HannRectangular | WindowPairKind::HammingRectangular
        )
    }
}

/// Precomputed window coefficient arrays for one engine instance.
///
/// A `None` side means rectangular: the engine skips the multiply entirely.
#[derive(Debug, Clone)]
pub struct WindowPair {
    pub analysis: Option<Vec<f32>>,
    pub synthesis: Option<Vec<f32>>,
}

impl WindowPair {
    /// Builds the window arrays for the given kind and geometry.
    ///
    /// The synthesis window is only needed when reconstructing output, so a
    /// profile-only pass passes `with_synthesis = false` and skips it.
    pub fn build(
        kind: WindowPairKind,
        window_size: usize,
        steps_per_window: usize,
        with_synthesis: bool,
    ) -> Self {
        let info = kind.info();
        // One or the other window is multiplied by this to correct for
        // overlap. Scales down as steps get smaller and overlaps larger.
        let multiplier = 1.0 / (info.product_constant * steps_per_window as f64);

        let analysis = if kind.rectangular_analysis() {
            None
        } else {
            let scale = if kind.rectangular_synthesis() {
                multiplier
            } else {
                1.0
            };
            Some(raised_cosine(
                window_size,
                info.in_coefficients,
                scale,
            ))
        };

        let synthesis = if !with_synthesis || kind.rectangular_synthesis() {
            None
        } else if kind == WindowPairKind::HammingReciprocal {
            let analysis = analysis
                .as_deref()
                .expect("reciprocal synthesis requires an analysis window");
            // Hamming never reaches zero, so the reciprocal is finite.
            Some(
                analysis
                    .iter()
                    .map(|&w| (multiplier / w as f64) as f32)
                    .collect(),
            )
        } else {
            Some(raised_cosine(
                window_size,
                info.out_coefficients,
                multiplier,
            ))
        };

        Self {
            analysis,
            synthesis,
        }
    }
}

fn raised_cosine(size: usize, coefficients: [f64; 3], scale: f64) -> Vec<f32> {
    let [c0, c1, c2] = coefficients;
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = i as f64 / n;
            (scale * (c0 + c1 * (2.0 * PI * x).cos() + c2 * (4.0 * PI * x).cos())) as f32
        })
        .collect()
}
