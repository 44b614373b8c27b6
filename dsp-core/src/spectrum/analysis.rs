//! One-shot windowed spectrum of a signal segment
//!
//! The workstation's FFT inspection tool: a single windowed transform of
//! the segment under the cursor, with optional amplitude correction for the
//! window's attenuation.

use super::fft::FftEngine;
use super::windowing::{apply_window, window_correction_factor};
use crate::filters::windows::WindowType;

/// Settings of the single-segment analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Transform size in samples.
    pub fft_size: usize,

    /// Window applied to the segment before the transform.
    pub window_type: WindowType,

    /// Sampling frequency of the recording in Hz.
    pub sampling_frequency: f64,

    /// Whether to undo the window's average amplitude attenuation.
    pub apply_correction: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            window_type: WindowType::Hamming,
            sampling_frequency: 128.0,
            apply_correction: true,
        }
    }
}

/// Windowed one-shot spectrum analyzer with a reusable FFT plan.
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    fft_engine: FftEngine,
    correction_factor: f64,
}

impl SpectrumAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let fft_engine = FftEngine::new(config.fft_size);
        let correction_factor = if config.apply_correction {
            window_correction_factor(config.window_type, config.fft_size)
        } else {
            1.0
        };

        Self {
            config,
            fft_engine,
            correction_factor,
        }
    }

    /// Windows the segment and returns its one-sided magnitude spectrum.
    pub fn analyze(&mut self, segment: &[f64]) -> Vec<f64> {
        let windowed = apply_window(segment, self.config.window_type);
        let mut spectrum = self.fft_engine.magnitude(&windowed);

        if self.config.apply_correction {
            for value in spectrum.iter_mut() {
                *value *= self.correction_factor;
            }
        }

        spectrum
    }

    /// Frequency in Hz of each spectrum bin.
    pub fn frequency_axis(&self) -> Vec<f64> {
        self.fft_engine
            .frequency_axis(self.config.sampling_frequency)
    }

    /// Replaces the settings, re-planning the transform only when the size
    /// changed.
    pub fn update_config(&mut self, config: AnalyzerConfig) {
        if config.fft_size != self.config.fft_size {
            self.fft_engine = FftEngine::new(config.fft_size);
        }
        self.correction_factor = if config.apply_correction {
            window_correction_factor(config.window_type, config.fft_size)
        } else {
            1.0
        };
        self.config = config;
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn bin_count(&self) -> usize {
        self.fft_engine.bin_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_sine_peak_frequency() {
        let config = AnalyzerConfig {
            fft_size: 1024,
            window_type: WindowType::Hamming,
            sampling_frequency: 128.0,
            apply_correction: true,
        };
        let mut analyzer = SpectrumAnalyzer::new(config);

        let f0 = 10.0;
        let segment: Vec<f64> = (0..1024)
            .map(|n| (2.0 * PI * f0 * n as f64 / 128.0).sin())
            .collect();

        let spectrum = analyzer.analyze(&segment);
        assert_eq!(spectrum.len(), 513);

        let axis = analyzer.frequency_axis();
        let (peak_bin, _) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();
        assert!((axis[peak_bin] - f0).abs() < 0.5);
    }

    #[test]
    fn test_update_config_changes_bin_count() {
        let mut analyzer = SpectrumAnalyzer::new(AnalyzerConfig::default());
        assert_eq!(analyzer.bin_count(), 513);

        analyzer.update_config(AnalyzerConfig {
            fft_size: 256,
            ..AnalyzerConfig::default()
        });
        assert_eq!(analyzer.bin_count(), 129);
    }

    #[test]
    fn test_correction_recovers_amplitude() {
        let config = AnalyzerConfig {
            fft_size: 512,
            window_type: WindowType::Hann,
            sampling_frequency: 128.0,
            apply_correction: true,
        };
        let mut analyzer = SpectrumAnalyzer::new(config);

        let f0 = 16.0;
        let segment: Vec<f64> = (0..512)
            .map(|n| (2.0 * PI * f0 * n as f64 / 128.0).sin())
            .collect();

        let spectrum = analyzer.analyze(&segment);
        let peak = spectrum.iter().cloned().fold(0.0f64, f64::max);
        // Corrected sine peak is about N/2
        assert!(peak > 200.0 && peak < 320.0, "peak {peak}");
    }
}
