//! Real-input FFT engine backed by realfft
//!
//! Produces one-sided spectra for the single-segment analysis tools. The
//! time-frequency renderer uses a full complex transform instead (see
//! [`super::stft`]).

use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// One-sided FFT of real-valued sample segments with reusable buffers.
pub struct FftEngine {
    fft_size: usize,
    r2c: Arc<dyn RealToComplex<f64>>,
    input_buffer: Vec<f64>,
    output_buffer: Vec<num_complex::Complex<f64>>,
}

impl FftEngine {
    pub fn new(fft_size: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_size);

        Self {
            fft_size,
            r2c,
            input_buffer: vec![0.0; fft_size],
            output_buffer: vec![num_complex::Complex::new(0.0, 0.0); fft_size / 2 + 1],
        }
    }

    /// Magnitude spectrum |X[k]| for the positive frequencies of `segment`.
    ///
    /// Segments shorter than the transform size are zero-padded; longer ones
    /// are truncated.
    pub fn magnitude(&mut self, segment: &[f64]) -> Vec<f64> {
        let copy_len = segment.len().min(self.fft_size);
        self.input_buffer[..copy_len].copy_from_slice(&segment[..copy_len]);
        if copy_len < self.fft_size {
            self.input_buffer[copy_len..].fill(0.0);
        }

        self.r2c
            .process(&mut self.input_buffer, &mut self.output_buffer)
            .expect("buffer sizes match the planned transform");

        self.output_buffer.iter().map(|c| c.norm()).collect()
    }

    /// Magnitude spectrum in dB relative to `reference`.
    pub fn magnitude_db(&mut self, segment: &[f64], reference: f64) -> Vec<f64> {
        self.magnitude(segment)
            .iter()
            .map(|&mag| 20.0 * (mag.max(1e-10) / reference).log10())
            .collect()
    }

    /// Power spectrum |X[k]|².
    pub fn power(&mut self, segment: &[f64]) -> Vec<f64> {
        self.magnitude(segment).iter().map(|&m| m * m).collect()
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of one-sided frequency bins (fft_size/2 + 1).
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Center frequency in Hz of bin `bin` at the given sampling frequency.
    pub fn bin_frequency(&self, bin: usize, sampling_frequency: f64) -> f64 {
        bin as f64 * sampling_frequency / self.fft_size as f64
    }

    /// Frequency axis in Hz for all one-sided bins.
    pub fn frequency_axis(&self, sampling_frequency: f64) -> Vec<f64> {
        (0..self.bin_count())
            .map(|bin| self.bin_frequency(bin, sampling_frequency))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_dc_segment() {
        let mut fft = FftEngine::new(1024);
        let spectrum = fft.magnitude(&vec![1.0; 1024]);

        assert_eq!(spectrum.len(), 513);
        assert!(spectrum[0] > 1000.0);
        assert!(spectrum[10] < 1e-6);
    }

    #[test]
    fn test_sine_peak_bin() {
        let mut fft = FftEngine::new(1024);
        let fs = 128.0;
        let f0 = 12.0;
        let segment: Vec<f64> = (0..1024)
            .map(|n| (2.0 * PI * f0 * n as f64 / fs).sin())
            .collect();

        let spectrum = fft.magnitude(&segment);
        let (peak_bin, &peak) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();

        assert!((fft.bin_frequency(peak_bin, fs) - f0).abs() < fs / 1024.0 * 1.5);
        // Sine magnitude is about N/2
        assert!(peak > 400.0 && peak < 600.0);
    }

    #[test]
    fn test_frequency_axis() {
        let fft = FftEngine::new(256);
        let axis = fft.frequency_axis(128.0);
        assert_eq!(axis.len(), 129);
        assert_eq!(axis[0], 0.0);
        assert!((axis[128] - 64.0).abs() < 1e-12);
    }

    #[test]
    fn test_power_is_magnitude_squared() {
        let mut fft = FftEngine::new(64);
        let segment: Vec<f64> = (0..64).map(|n| (n as f64 * 0.3).cos()).collect();
        let magnitude = fft.magnitude(&segment);
        let power = fft.power(&segment);
        for (m, p) in magnitude.iter().zip(&power) {
            assert!((m * m - p).abs() < 1e-9);
        }
    }
}
