//! Applying window functions to signal segments

use crate::filters::windows::{generate_window, WindowType};

/// Returns a windowed copy of the segment.
pub fn apply_window(segment: &[f64], window_type: WindowType) -> Vec<f64> {
    let window = generate_window(window_type, segment.len());
    segment
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| s * w)
        .collect()
}

/// Applies the window in place.
pub fn apply_window_inplace(segment: &mut [f64], window_type: WindowType) {
    let window = generate_window(window_type, segment.len());
    for (s, w) in segment.iter_mut().zip(window.iter()) {
        *s *= w;
    }
}

/// Amplitude correction factor undoing the window's average attenuation.
///
/// Multiply FFT magnitudes by this factor to recover the amplitude a
/// rectangular window would have reported.
pub fn window_correction_factor(window_type: WindowType, length: usize) -> f64 {
    let window = generate_window(window_type, length);
    let sum: f64 = window.iter().sum();
    length as f64 / sum
}
