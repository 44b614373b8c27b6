//! Spectral analysis: one-shot spectra and time-frequency rendering

pub mod analysis;
pub mod fft;
pub mod stft;
pub mod windowing;

pub use analysis::{AnalyzerConfig, SpectrumAnalyzer};
pub use fft::FftEngine;
pub use stft::{NeverCancelled, RenderStatus, StftRenderer};
pub use windowing::apply_window;
