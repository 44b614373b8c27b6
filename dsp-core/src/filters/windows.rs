//! Window functions for spectral analysis
//!
//! Tapers applied to signal segments before a Fourier transform to reduce
//! spectral leakage.

use std::f64::consts::PI;

/// Window function types offered by the analysis tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// Rectangular window (no tapering)
    Rectangular,

    /// Bartlett (triangular) window: w[n] = 1 - |2n/(M-1) - 1|
    Bartlett,

    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    Blackman,

    /// Welch (parabolic) window: w[n] = 1 - ((n - (M-1)/2) / ((M-1)/2))²
    Welch,
}

/// Generate window coefficients w[n] for n = 0..M-1.
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length <= 1 {
        return vec![1.0; length];
    }

    let m = length as f64;
    let mut window = Vec::with_capacity(length);

    match window_type {
        WindowType::Rectangular => {
            window.resize(length, 1.0);
        }

        WindowType::Bartlett => {
            for n in 0..length {
                let x = 2.0 * n as f64 / (m - 1.0) - 1.0;
                window.push(1.0 - x.abs());
            }
        }

        WindowType::Hann => {
            for n in 0..length {
                let angle = 2.0 * PI * n as f64 / (m - 1.0);
                window.push(0.5 - 0.5 * angle.cos());
            }
        }

        WindowType::Hamming => {
            for n in 0..length {
                let angle = 2.0 * PI * n as f64 / (m - 1.0);
                window.push(0.54 - 0.46 * angle.cos());
            }
        }

        WindowType::Blackman => {
            for n in 0..length {
                let angle1 = 2.0 * PI * n as f64 / (m - 1.0);
                let angle2 = 4.0 * PI * n as f64 / (m - 1.0);
                window.push(0.42 - 0.5 * angle1.cos() + 0.08 * angle2.cos());
            }
        }

        WindowType::Welch => {
            let half = (m - 1.0) / 2.0;
            for n in 0..length {
                let x = (n as f64 - half) / half;
                window.push(1.0 - x * x);
            }
        }
    }

    window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_lengths() {
        for &wt in &[
            WindowType::Rectangular,
            WindowType::Bartlett,
            WindowType::Hann,
            WindowType::Hamming,
            WindowType::Blackman,
            WindowType::Welch,
        ] {
            assert_eq!(generate_window(wt, 65).len(), 65);
        }
    }

    #[test]
    fn test_windows_are_symmetric() {
        for &wt in &[
            WindowType::Bartlett,
            WindowType::Hann,
            WindowType::Hamming,
            WindowType::Blackman,
            WindowType::Welch,
        ] {
            let w = generate_window(wt, 101);
            for i in 0..w.len() / 2 {
                assert!(
                    (w[i] - w[w.len() - 1 - i]).abs() < 1e-12,
                    "{wt:?} not symmetric at {i}"
                );
            }
            // Center of an odd-length symmetric window peaks at 1.0
            assert!((w[50] - 1.0).abs() < 1e-12, "{wt:?} center not 1.0");
        }
    }

    #[test]
    fn test_rectangular_window() {
        let w = generate_window(WindowType::Rectangular, 100);
        assert!(w.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_hamming_endpoints() {
        let w = generate_window(WindowType::Hamming, 65);
        assert!(w[0] > 0.07 && w[0] < 0.09);
    }

    #[test]
    fn test_single_sample_window() {
        assert_eq!(generate_window(WindowType::Hann, 1), vec![1.0]);
        assert!(generate_window(WindowType::Hann, 0).is_empty());
    }
}
