//! Polynomial-domain frequency transforms and the bilinear transform
//!
//! The analog lowpass prototype is expanded to transfer-function
//! polynomials via complex convolution, shifted to the target band by the
//! classical lp2lp/lp2hp/lp2bp/lp2bs substitutions, and finally discretized
//! with the bilinear transform. Binomial weights come from
//! [`crate::math::special::combinations`].

use num_complex::Complex64;

use crate::error::{DspError, Result};
use crate::math::arrays::convolve_complex;
use crate::math::special::combinations;

use super::prototype::AnalogPrototype;

/// Expands pole/zero factors into numerator/denominator polynomial
/// coefficients, highest degree first.
pub fn zpk_to_tf(prototype: &AnalogPrototype) -> Result<(Vec<f64>, Vec<f64>)> {
    let b: Vec<f64> = polynomial_from_roots(&prototype.zeros)?
        .iter()
        .map(|c| prototype.gain * c.re)
        .collect();
    let a: Vec<f64> = polynomial_from_roots(&prototype.poles)?
        .iter()
        .map(|c| c.re)
        .collect();
    Ok((b, a))
}

fn polynomial_from_roots(roots: &[Complex64]) -> Result<Vec<Complex64>> {
    let mut coefficients = vec![Complex64::new(1.0, 0.0)];
    for root in roots {
        coefficients = convolve_complex(&coefficients, &[Complex64::new(1.0, 0.0), -root])?;
    }
    Ok(coefficients)
}

/// Moves the unit-cutoff lowpass transfer function to cutoff `wo` (rad/s).
pub fn lowpass_to_lowpass(b: &[f64], a: &[f64], wo: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let d = a.len();
    let n = b.len();
    let m = d.max(n);
    let pwo: Vec<f64> = (0..m).rev().map(|i| wo.powi(i as i32)).collect();
    let start1 = n.saturating_sub(d);
    let start2 = d.saturating_sub(n);

    let b_out: Vec<f64> = b
        .iter()
        .zip(&pwo[start2..])
        .map(|(&c, &p)| c * pwo[start1] / p)
        .collect();
    let a_out: Vec<f64> = a
        .iter()
        .zip(&pwo[start1..])
        .map(|(&c, &p)| c * pwo[start1] / p)
        .collect();
    normalize(&b_out, &a_out)
}

/// Transforms the unit-cutoff lowpass into a highpass with cutoff `wo`
/// through the substitution s -> wo/s.
pub fn lowpass_to_highpass(b: &[f64], a: &[f64], wo: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let d = a.len();
    let n = b.len();
    let m = d.max(n);
    let pwo: Vec<f64> = (0..m).map(|i| wo.powi(i as i32)).collect();

    let (b_out, a_out) = if d >= n {
        let mut b_out = vec![0.0; d];
        for (i, (&c, &p)) in b.iter().rev().zip(&pwo).enumerate() {
            b_out[i] = c * p;
        }
        let a_out: Vec<f64> = a.iter().rev().zip(&pwo).map(|(&c, &p)| c * p).collect();
        (b_out, a_out)
    } else {
        let b_out: Vec<f64> = b.iter().rev().zip(&pwo).map(|(&c, &p)| c * p).collect();
        let mut a_out = vec![0.0; n];
        for (i, (&c, &p)) in a.iter().rev().zip(&pwo).enumerate() {
            a_out[i] = c * p;
        }
        (b_out, a_out)
    };
    normalize(&b_out, &a_out)
}

/// Transforms the unit-cutoff lowpass into a bandpass centered at `wo` with
/// bandwidth `bw` through the substitution s -> (s^2 + wo^2) / (bw * s).
pub fn lowpass_to_bandpass(b: &[f64], a: &[f64], wo: f64, bw: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let degree = (a.len().max(b.len())) - 1;
    let b_out = bandpass_polynomial(b, degree, wo, bw)?;
    let a_out = bandpass_polynomial(a, degree, wo, bw)?;
    normalize(&b_out, &a_out)
}

fn bandpass_polynomial(coeffs: &[f64], degree: usize, wo: f64, bw: f64) -> Result<Vec<f64>> {
    let np = 2 * degree;
    let wosq = wo * wo;
    let mut out = vec![0.0; np + 1];
    let own_degree = coeffs.len() - 1;
    for (idx, &c) in coeffs.iter().enumerate() {
        let m = own_degree - idx;
        // c*s^m  ->  c * bw^(D-m) * s^(D-m) * (s^2 + wo^2)^m
        for k in 0..=m {
            let g = degree - m + 2 * k;
            out[np - g] += c
                * bw.powi((degree - m) as i32)
                * combinations(m as i64, k as i64)? as f64
                * wosq.powi((m - k) as i32);
        }
    }
    Ok(out)
}

/// Transforms the unit-cutoff lowpass into a bandstop centered at `wo` with
/// bandwidth `bw` through the substitution s -> (bw * s) / (s^2 + wo^2).
pub fn lowpass_to_bandstop(b: &[f64], a: &[f64], wo: f64, bw: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let degree = (a.len().max(b.len())) - 1;
    let b_out = bandstop_polynomial(b, degree, wo, bw)?;
    let a_out = bandstop_polynomial(a, degree, wo, bw)?;
    normalize(&b_out, &a_out)
}

fn bandstop_polynomial(coeffs: &[f64], degree: usize, wo: f64, bw: f64) -> Result<Vec<f64>> {
    let np = 2 * degree;
    let wosq = wo * wo;
    let mut out = vec![0.0; np + 1];
    let own_degree = coeffs.len() - 1;
    for (idx, &c) in coeffs.iter().enumerate() {
        let m = own_degree - idx;
        // c*s^m  ->  c * bw^m * s^m * (s^2 + wo^2)^(D-m)
        for k in 0..=(degree - m) {
            let g = m + 2 * k;
            out[np - g] += c
                * bw.powi(m as i32)
                * combinations((degree - m) as i64, k as i64)? as f64
                * wosq.powi((degree - m - k) as i32);
        }
    }
    Ok(out)
}

/// Maps an analog transfer function to a digital one by the bilinear
/// substitution s -> 2*fs*(z-1)/(z+1).
///
/// Frequency pre-warping is the caller's responsibility (the designer warps
/// its edge frequencies before the analog band transform).
pub fn bilinear(b: &[f64], a: &[f64], fs: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let degree_a = a.len() - 1;
    let degree_b = b.len() - 1;
    let m = degree_a.max(degree_b);

    let transform = |coeffs: &[f64], degree: usize| -> Result<Vec<f64>> {
        let mut out = vec![0.0; m + 1];
        for (j, o) in out.iter_mut().enumerate() {
            let mut value = 0.0;
            for i in 0..=degree {
                for k in 0..=i {
                    for l in 0..=(m - i) {
                        if k + l == j {
                            value += combinations(i as i64, k as i64)? as f64
                                * combinations((m - i) as i64, l as i64)? as f64
                                * coeffs[degree - i]
                                * (2.0 * fs).powi(i as i32)
                                * if k % 2 == 0 { 1.0 } else { -1.0 };
                        }
                    }
                }
            }
            *o = value;
        }
        Ok(out)
    };

    let b_out = transform(b, degree_b)?;
    let a_out = transform(a, degree_a)?;
    normalize(&b_out, &a_out)
}

/// Rescales numerator and denominator so that a[0] is 1.
fn normalize(b: &[f64], a: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    let leading = a[0];
    if leading.abs() < 1e-300 {
        return Err(DspError::InvalidSpecification(
            "transformed denominator has a vanishing leading coefficient".into(),
        ));
    }
    Ok((
        b.iter().map(|c| c / leading).collect(),
        a.iter().map(|c| c / leading).collect(),
    ))
}
