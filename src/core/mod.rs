//! Core types, window pairs, and the FFT bridge.

pub mod fft;
pub mod types;
pub mod window;

pub use types::*;
pub use window::{WindowPair, WindowPairKind};
