//! Short-time Fourier transform rendering over a time-frequency grid
//!
//! Renders a grayscale magnitude raster of a single-channel signal: one
//! windowed, zero-padded transform per image column, rows mapped to
//! frequencies with row 0 at the top of the frequency range. Rendering is
//! cooperatively cancellable at column granularity so a stale render can be
//! abandoned as soon as parameters change.

use log::debug;
use ndarray::Array2;
use num_complex::Complex64;
use rustfft::FftPlanner;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Result;
use crate::filters::windows::{generate_window, WindowType};

/// Cancellation probe polled between image columns.
///
/// A cancelled render returns no image; the caller must treat that as
/// "stale, do not display" rather than as a failure.
pub trait RenderStatus {
    fn is_cancelled(&self) -> bool;
}

impl RenderStatus for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Render that can never be cancelled.
pub struct NeverCancelled;

impl RenderStatus for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Time-frequency magnitude renderer for a single-channel signal.
///
/// Parameter changes do not update a previous image incrementally; every
/// call to [`StftRenderer::render`] recomputes the full raster.
pub struct StftRenderer {
    samples: Vec<f64>,
    sampling_frequency: f64,
    window_type: WindowType,
    window_length: usize,
    pad_to_height: bool,
}

impl StftRenderer {
    pub fn new(samples: Vec<f64>, sampling_frequency: f64) -> Self {
        Self {
            samples,
            sampling_frequency,
            window_type: WindowType::Rectangular,
            window_length: 128,
            pad_to_height: false,
        }
    }

    pub fn set_window_type(&mut self, window_type: WindowType) {
        self.window_type = window_type;
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    /// Sets the analysis window length in samples; zero is ignored.
    pub fn set_window_length(&mut self, window_length: usize) {
        if window_length > 0 {
            self.window_length = window_length;
        }
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    /// When set, the transform is zero-padded (doubling the window length)
    /// until it is at least as long as the chart height, so every image row
    /// maps to a distinct frequency bin.
    pub fn set_pad_to_height(&mut self, pad_to_height: bool) {
        self.pad_to_height = pad_to_height;
    }

    pub fn pad_to_height(&self) -> bool {
        self.pad_to_height
    }

    /// Renders a `width` x `height` grayscale raster covering times
    /// `[t_min, t_max)` in seconds and frequencies `[f_min, f_max)` in Hz,
    /// with row 0 carrying the highest frequency.
    ///
    /// Returns `Ok(None)` when `status` signals cancellation before the
    /// render completes. The first axis of the result is the column (time)
    /// index, the second the row (frequency) index.
    pub fn render(
        &self,
        width: usize,
        height: usize,
        t_min: f64,
        t_max: f64,
        f_min: f64,
        f_max: f64,
        status: &dyn RenderStatus,
    ) -> Result<Option<Array2<u8>>> {
        let window_type = self.window_type;
        let window_length = self.window_length;
        let spectrum_length = if self.pad_to_height {
            padded_window_length(window_length, height)
        } else {
            window_length
        };
        debug!(
            "rendering {width}x{height} time-frequency raster, window {window_length}, \
             spectrum {spectrum_length}"
        );

        let sampling = self.sampling_frequency;
        let window = generate_window(window_type, window_length);
        let fft = FftPlanner::new().plan_fft_forward(spectrum_length);

        let mut result = Array2::<f64>::zeros((width, height));
        let mut buffer = vec![Complex64::new(0.0, 0.0); spectrum_length];
        let mut max = 0.0f64;

        for ix in 0..width {
            if status.is_cancelled() {
                return Ok(None);
            }
            let t = t_min + (t_max - t_min) * ix as f64 / width as f64;
            let i0 = (sampling * t).floor() as isize - (window_length / 2) as isize;

            for (wi, slot) in buffer.iter_mut().enumerate() {
                *slot = if wi < window_length {
                    let i = i0 + wi as isize;
                    let sample = if i >= 0 && (i as usize) < self.samples.len() {
                        self.samples[i as usize]
                    } else {
                        0.0
                    };
                    Complex64::new(sample * window[wi], 0.0)
                } else {
                    Complex64::new(0.0, 0.0)
                };
            }
            fft.process(&mut buffer);

            for iy in 0..height {
                let f = f_max + (f_min - f_max) * (height - 1 - iy) as f64 / height as f64;
                let bin = (spectrum_length as f64 * f / sampling).floor() as isize;
                let value = if bin >= 0 && (bin as usize) < spectrum_length {
                    buffer[bin as usize].norm()
                } else {
                    0.0
                };
                result[[ix, iy]] = value;
                max = max.max(value);
            }
        }

        // A silent signal renders as an all-black image instead of dividing
        // by a zero maximum.
        let mut image = Array2::<u8>::zeros((width, height));
        if max > 0.0 {
            for ix in 0..width {
                if status.is_cancelled() {
                    return Ok(None);
                }
                for iy in 0..height {
                    image[[ix, iy]] = (255.0 * result[[ix, iy]] / max).floor() as u8;
                }
            }
        }
        Ok(Some(image))
    }
}

/// Doubles the window length until it reaches the chart height.
fn padded_window_length(window_length: usize, chart_height: usize) -> usize {
    let mut length = window_length.max(1);
    while length < chart_height {
        length *= 2;
    }
    length
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(fs: f64, f0: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * f0 * i as f64 / fs).sin()).collect()
    }

    /// Frequency of row `iy` under the inverted-axis mapping.
    fn row_frequency(iy: usize, height: usize, f_min: f64, f_max: f64) -> f64 {
        f_max + (f_min - f_max) * (height - 1 - iy) as f64 / height as f64
    }

    #[test]
    fn test_padded_window_length() {
        assert_eq!(padded_window_length(128, 100), 128);
        assert_eq!(padded_window_length(128, 129), 256);
        assert_eq!(padded_window_length(100, 512), 800);
    }

    #[test]
    fn test_sine_energy_concentrates_at_its_frequency() {
        let fs = 128.0;
        let f0 = 20.0;
        let mut renderer = StftRenderer::new(sine(fs, f0, 2048), fs);
        renderer.set_window_type(WindowType::Hann);
        renderer.set_window_length(128);

        let (width, height) = (16, 64);
        let image = renderer
            .render(width, height, 2.0, 12.0, 0.0, fs / 2.0, &NeverCancelled)
            .unwrap()
            .expect("render not cancelled");

        for ix in 0..width {
            let mut best_row = 0;
            let mut best = 0u8;
            for iy in 0..height {
                if image[[ix, iy]] > best {
                    best = image[[ix, iy]];
                    best_row = iy;
                }
            }
            let f = row_frequency(best_row, height, 0.0, fs / 2.0);
            assert!(
                (f - f0).abs() <= 2.0 * fs / 128.0,
                "column {ix} peaks at {f} Hz"
            );
        }
    }

    #[test]
    fn test_longer_window_narrows_concentration() {
        let fs = 128.0;
        let f0 = 20.0;
        let samples = sine(fs, f0, 4096);

        let spread = |window_length: usize| -> f64 {
            let mut renderer = StftRenderer::new(samples.clone(), fs);
            renderer.set_window_type(WindowType::Hann);
            renderer.set_window_length(window_length);
            let (width, height) = (8, 64);
            let image = renderer
                .render(width, height, 8.0, 24.0, 0.0, fs / 2.0, &NeverCancelled)
                .unwrap()
                .unwrap();

            // Fraction of pixel mass away from the peak row, averaged over
            // columns
            let mut total_spread = 0.0;
            for ix in 0..width {
                let column: Vec<f64> = (0..height).map(|iy| image[[ix, iy]] as f64).collect();
                let sum: f64 = column.iter().sum();
                let peak = column.iter().cloned().fold(0.0f64, f64::max);
                total_spread += (sum - peak) / sum.max(1.0);
            }
            total_spread / width as f64
        };

        assert!(
            spread(256) < spread(32),
            "long window should concentrate energy in fewer rows"
        );
    }

    #[test]
    fn test_silent_signal_renders_black() {
        let renderer = StftRenderer::new(vec![0.0; 1024], 128.0);
        let image = renderer
            .render(8, 8, 0.0, 4.0, 0.0, 64.0, &NeverCancelled)
            .unwrap()
            .unwrap();
        assert!(image.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_cancellation_yields_no_image() {
        let fs = 128.0;
        let renderer = StftRenderer::new(sine(fs, 10.0, 2048), fs);
        let cancelled = AtomicBool::new(true);

        let result = renderer
            .render(32, 32, 0.0, 8.0, 0.0, 64.0, &cancelled)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_pad_to_height_extends_spectrum() {
        let fs = 128.0;
        let mut renderer = StftRenderer::new(sine(fs, 20.0, 2048), fs);
        renderer.set_window_length(32);
        renderer.set_pad_to_height(true);

        // With padding the render covers 64 rows from a 32-sample window
        let image = renderer
            .render(4, 64, 2.0, 10.0, 0.0, fs / 2.0, &NeverCancelled)
            .unwrap()
            .unwrap();
        assert_eq!(image.dim(), (4, 64));
        assert!(image.iter().any(|&v| v > 0));
    }

    #[test]
    fn test_window_length_setter_ignores_zero() {
        let mut renderer = StftRenderer::new(vec![0.0; 16], 128.0);
        renderer.set_window_length(0);
        assert_eq!(renderer.window_length(), 128);
        renderer.set_window_length(64);
        assert_eq!(renderer.window_length(), 64);
    }
}
