//! Flat-array utilities used by filter design
//!
//! All functions allocate a fresh result and leave their inputs untouched,
//! except [`fill_with_value`], which mutates in place by contract.

use num_complex::Complex64;

use crate::error::{DspError, Result};

/// Returns the array extended to `new_size` with trailing zeros.
///
/// `new_size` must be greater than or equal to the current length.
pub fn pad_with_zeros_to_size(array: &[f64], new_size: usize) -> Result<Vec<f64>> {
    if new_size < array.len() {
        return Err(DspError::InvalidArgument(format!(
            "cannot pad an array of length {} down to {}",
            array.len(),
            new_size
        )));
    }
    let mut padded = array.to_vec();
    padded.resize(new_size, 0.0);
    Ok(padded)
}

/// Discrete linear convolution of two arrays.
///
/// Output length is `array1.len() + array2.len() - 1`. The direct double
/// loop is O(n*m), which is acceptable at filter-design sizes (tens of
/// taps).
pub fn convolve(array1: &[f64], array2: &[f64]) -> Result<Vec<f64>> {
    if array1.is_empty() || array2.is_empty() {
        return Err(DspError::InvalidArgument(
            "convolution inputs must not be empty".into(),
        ));
    }

    let n = array1.len() + array2.len() - 1;
    let f = pad_with_zeros_to_size(array1, n)?;
    let g = pad_with_zeros_to_size(array2, n)?;

    let mut result = vec![0.0; n];
    for (i, r) in result.iter_mut().enumerate() {
        for fpos in 0..=i {
            *r += f[fpos] * g[i - fpos];
        }
    }
    Ok(result)
}

/// Complex counterpart of [`convolve`], used when expanding pole/zero
/// factors into polynomial coefficients.
pub fn convolve_complex(array1: &[Complex64], array2: &[Complex64]) -> Result<Vec<Complex64>> {
    if array1.is_empty() || array2.is_empty() {
        return Err(DspError::InvalidArgument(
            "convolution inputs must not be empty".into(),
        ));
    }

    let n = array1.len() + array2.len() - 1;
    let mut result = vec![Complex64::new(0.0, 0.0); n];
    for (i, r) in result.iter_mut().enumerate() {
        for fpos in 0..=i {
            let gpos = i - fpos;
            let a = if fpos < array1.len() {
                array1[fpos]
            } else {
                Complex64::new(0.0, 0.0)
            };
            let b = if gpos < array2.len() {
                array2[gpos]
            } else {
                Complex64::new(0.0, 0.0)
            };
            *r += a * b;
        }
    }
    Ok(result)
}

/// Returns a reversed copy of the array.
pub fn reverse(array: &[f64]) -> Vec<f64> {
    array.iter().rev().copied().collect()
}

/// Returns the first `size` elements as a new array.
pub fn trim_to_size(array: &[f64], size: usize) -> Result<Vec<f64>> {
    if size > array.len() {
        return Err(DspError::InvalidArgument(format!(
            "cannot trim an array of length {} to {}",
            array.len(),
            size
        )));
    }
    Ok(array[..size].to_vec())
}

/// Returns a copy of the array with the first `count` elements removed.
pub fn remove_first_elements(array: &[f64], count: usize) -> Result<Vec<f64>> {
    if count >= array.len() {
        return Err(DspError::InvalidArgument(format!(
            "cannot remove {} elements from an array of length {}",
            count,
            array.len()
        )));
    }
    Ok(array[count..].to_vec())
}

/// Lifts a real array into the complex plane with zero imaginary parts.
pub fn to_complex(array: &[f64]) -> Vec<Complex64> {
    array.iter().map(|&x| Complex64::new(x, 0.0)).collect()
}

/// Writes `value` to `array[start_index..end_index]` in place.
pub fn fill_with_value(array: &mut [f64], value: f64, start_index: usize, end_index: usize) {
    for x in &mut array[start_index..end_index] {
        *x = value;
    }
}
