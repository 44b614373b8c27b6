//! Analog lowpass prototype generation
//!
//! Each family produces the poles, zeros and gain of its normalized analog
//! lowpass prototype (cutoff 1 rad/s). The elliptic prototype solves the
//! degree equation with the elliptic-integral machinery from
//! [`crate::math::special`] and the constrained simplex search.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::error::{DspError, Result};
use crate::math::simplex::{minimize_function, minimize_function_constrained};
use crate::math::special::{
    complete_elliptic_integral_k, jacobian_elliptic_functions, MACHINE_EPSILON,
};

/// Poles, zeros and gain of an analog lowpass prototype.
#[derive(Debug, Clone)]
pub struct AnalogPrototype {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

/// Butterworth prototype: poles evenly spaced on the left half of the unit
/// circle, no finite zeros, unit gain.
pub fn butterworth_prototype(order: usize) -> Result<AnalogPrototype> {
    check_order(order)?;
    let n = order;
    let mut poles = Vec::with_capacity(n);
    for k in 0..n {
        let angle = PI * (2 * k + n + 1) as f64 / (2 * n) as f64;
        poles.push(Complex64::new(angle.cos(), angle.sin()));
    }
    Ok(AnalogPrototype {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    })
}

/// Chebyshev type I prototype with `ripple` dB of passband ripple.
pub fn chebyshev1_prototype(order: usize, ripple: f64) -> Result<AnalogPrototype> {
    check_order(order)?;
    if !(ripple > 0.0) {
        return Err(DspError::InvalidArgument(
            "passband ripple must be positive".into(),
        ));
    }

    let n = order;
    let eps = (10.0f64.powf(0.1 * ripple) - 1.0).sqrt();
    let mu = (1.0 / eps).asinh() / n as f64;

    let mut poles = Vec::with_capacity(n);
    for k in 1..=n {
        let theta = PI / 2.0 * (2 * k - 1) as f64 / n as f64;
        poles.push(Complex64::new(
            -mu.sinh() * theta.sin(),
            mu.cosh() * theta.cos(),
        ));
    }

    let mut gain = product_of_negated(&poles).re;
    if n % 2 == 0 {
        gain /= (1.0 + eps * eps).sqrt();
    }

    Ok(AnalogPrototype {
        zeros: Vec::new(),
        poles,
        gain,
    })
}

/// Chebyshev type II (inverse Chebyshev) prototype with `attenuation` dB of
/// stopband attenuation.
pub fn chebyshev2_prototype(order: usize, attenuation: f64) -> Result<AnalogPrototype> {
    check_order(order)?;
    if !(attenuation > 0.0) {
        return Err(DspError::InvalidArgument(
            "stopband attenuation must be positive".into(),
        ));
    }

    let n = order;
    let de = 1.0 / (10.0f64.powf(0.1 * attenuation) - 1.0).sqrt();
    let mu = (1.0 / de).asinh() / n as f64;

    // Purely imaginary zeros; for odd orders the middle index is skipped
    // because it would fall at infinity.
    let zero_indices: Vec<usize> = if n % 2 == 1 {
        (1..n).step_by(2).chain((n + 2..2 * n).step_by(2)).collect()
    } else {
        (1..2 * n).step_by(2).collect()
    };
    let zeros: Vec<Complex64> = zero_indices
        .iter()
        .map(|&k| {
            let c = (k as f64 * PI / (2.0 * n as f64)).cos();
            Complex64::new(0.0, 1.0 / c).conj()
        })
        .collect();

    let mut poles = Vec::with_capacity(n);
    for k in (1..2 * n).step_by(2) {
        let angle = PI * k as f64 / (2.0 * n as f64) + PI / 2.0;
        let p = Complex64::new(
            mu.sinh() * angle.cos(),
            mu.cosh() * angle.sin(),
        );
        poles.push(p.inv());
    }

    let gain = (product_of_negated(&poles) / product_of_negated(&zeros)).re;

    Ok(AnalogPrototype { zeros, poles, gain })
}

/// Elliptic (Cauer) prototype with `ripple` dB of passband ripple and
/// `attenuation` dB of stopband attenuation.
///
/// The modulus of the characteristic function is found by minimizing the
/// elliptic-integral ratio mismatch over the constrained parameter range;
/// poles then follow from the Jacobian elliptic functions at the solved
/// modulus.
pub fn elliptic_prototype(order: usize, ripple: f64, attenuation: f64) -> Result<AnalogPrototype> {
    check_order(order)?;
    if !(ripple > 0.0) || !(attenuation > 0.0) {
        return Err(DspError::InvalidArgument(
            "ripple and attenuation must be positive".into(),
        ));
    }

    if order == 1 {
        let p = -(1.0 / (10.0f64.powf(0.1 * ripple) - 1.0)).sqrt();
        return Ok(AnalogPrototype {
            zeros: Vec::new(),
            poles: vec![Complex64::new(p, 0.0)],
            gain: -p,
        });
    }

    let n = order;
    let eps = (10.0f64.powf(0.1 * ripple) - 1.0).sqrt();
    let ck1 = eps / (10.0f64.powf(0.1 * attenuation) - 1.0).sqrt();
    let ck1p = (1.0 - ck1 * ck1).sqrt();
    if ck1p == 1.0 {
        return Err(DspError::InvalidSpecification(
            "cannot design an elliptic filter with the given ripple and attenuation".into(),
        ));
    }

    let val0 = complete_elliptic_integral_k(ck1 * ck1)?;
    let val1 = complete_elliptic_integral_k(ck1p * ck1p)?;
    let krat = if (1.0 - ck1p * ck1p).abs() < MACHINE_EPSILON {
        0.0
    } else {
        n as f64 * val0 / val1
    };

    // Degree equation: find the modulus m whose quarter-period ratio matches
    // the required order.
    let kratio = |params: &[f64]| {
        let mut m = params[0];
        m = m.clamp(0.0, 1.0);
        if m.abs() > MACHINE_EPSILON && m.abs() + MACHINE_EPSILON < 1.0 {
            match (
                complete_elliptic_integral_k(m),
                complete_elliptic_integral_k(1.0 - m),
            ) {
                (Ok(k0), Ok(k1)) => (k0 / k1 - krat).abs(),
                _ => 1e20,
            }
        } else if m.abs() > MACHINE_EPSILON {
            krat.abs()
        } else {
            1e20
        }
    };
    let m = minimize_function_constrained(kratio, &[0.0], &[1.0], 250)?[0].clamp(0.0, 1.0);

    let capk = complete_elliptic_integral_k(m)?;

    // Zeros sit on the imaginary axis at the reciprocals of sqrt(m)*sn
    // evaluated over the odd (or even) grid of quarter periods.
    let j_values: Vec<f64> = (1 - (n % 2)..n).step_by(2).map(|j| j as f64).collect();
    let mut sn = Vec::with_capacity(j_values.len());
    let mut cn = Vec::with_capacity(j_values.len());
    let mut dn = Vec::with_capacity(j_values.len());
    for &j in &j_values {
        let v = jacobian_elliptic_functions(j * capk / n as f64, m)?;
        sn.push(v.sn);
        cn.push(v.cn);
        dn.push(v.dn);
    }

    let mut zeros = Vec::new();
    for &s in &sn {
        if s.abs() > MACHINE_EPSILON {
            let z = Complex64::new(0.0, 1.0 / (m.sqrt() * s));
            zeros.push(z);
            zeros.push(z.conj());
        }
    }

    // Locate the pole parameter on the imaginary quarter period.
    let ineps = 1.0 / eps;
    let ck1p_sq = ck1p * ck1p;
    let vratio = |params: &[f64]| match jacobian_elliptic_functions(params[0], ck1p_sq) {
        Ok(v) if v.cn.abs() > 0.0 => (ineps - v.sn / v.cn).abs(),
        _ => 1e20,
    };
    let r = minimize_function(vratio, &[capk], 250)[0];
    let v0 = capk * r / (n as f64 * val0);

    let v = jacobian_elliptic_functions(v0, 1.0 - m)?;
    let (sv, cv, dv) = (v.sn, v.cn, v.dn);

    let mut poles: Vec<Complex64> = Vec::with_capacity(n);
    for i in 0..j_values.len() {
        let denominator = 1.0 - (dn[i] * sv) * (dn[i] * sv);
        poles.push(Complex64::new(
            -(cn[i] * dn[i] * sv * cv) / denominator,
            -(sn[i] * dv) / denominator,
        ));
    }

    if n % 2 == 1 {
        // The real pole stays single; complex poles gain their conjugates.
        let norm: f64 = poles.iter().map(|p| p.norm_sqr()).sum::<f64>().sqrt();
        let conjugates: Vec<Complex64> = poles
            .iter()
            .filter(|p| p.im.abs() > MACHINE_EPSILON * norm)
            .map(|p| p.conj())
            .collect();
        poles.extend(conjugates);
    } else {
        let conjugates: Vec<Complex64> = poles.iter().map(|p| p.conj()).collect();
        poles.extend(conjugates);
    }

    let mut gain = (product_of_negated(&poles) / product_of_negated(&zeros)).re;
    if n % 2 == 0 {
        gain /= (1.0 + eps * eps).sqrt();
    }

    Ok(AnalogPrototype { zeros, poles, gain })
}

fn check_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(DspError::InvalidArgument(
            "filter order must be greater than zero".into(),
        ));
    }
    Ok(())
}

fn product_of_negated(values: &[Complex64]) -> Complex64 {
    values
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, v| acc * (-v))
}
