//! Special functions for elliptic filter design
//!
//! Elliptic integrals and Jacobian elliptic functions follow the rational
//! approximations of the Cephes Math Library; combinatorics use exact
//! integer arithmetic.

use crate::error::{DspError, Result};

/// The largest positive double that, when added to 1.0, still produces 1.0.
///
/// Computed once at compile time instead of being lazily derived at runtime;
/// it is half the distance between 1.0 and the next representable double.
pub const MACHINE_EPSILON: f64 = f64::EPSILON / 2.0;

/// Evaluates a polynomial at `x` by Horner's scheme.
///
/// Coefficients are ordered highest degree first. An empty coefficient list
/// evaluates to zero.
pub fn evaluate_polynomial(x: f64, coefficients: &[f64]) -> f64 {
    let mut value = 0.0;
    for &c in coefficients {
        value = value * x + c;
    }
    value
}

/// Values of the Jacobian elliptic functions at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobiElliptic {
    pub sn: f64,
    pub cn: f64,
    pub dn: f64,
    /// The amplitude of `u`.
    pub phi: f64,
}

/// Complete elliptic integral of the first kind K(m).
///
/// The parameter `m` must lie in [0, 1]; the integral diverges at `m = 1`.
/// Two 11-term rational/log approximations on the complementary parameter
/// are switched at machine epsilon to avoid cancellation.
pub fn complete_elliptic_integral_k(m: f64) -> Result<f64> {
    const P: [f64; 11] = [
        1.37982864606273237150E-4,
        2.28025724005875567385E-3,
        7.97404013220415179367E-3,
        9.85821379021226008714E-3,
        6.87489687449949877925E-3,
        6.18901033637687613229E-3,
        8.79078273952743772254E-3,
        1.49380448916805252718E-2,
        3.08851465246711995998E-2,
        9.65735902811690126535E-2,
        1.38629436111989062502E0,
    ];

    const Q: [f64; 11] = [
        2.94078955048598507511E-5,
        9.14184723865917226571E-4,
        5.94058303753167793257E-3,
        1.54850516649762399335E-2,
        2.39089602715924892727E-2,
        3.01204715227604046988E-2,
        3.73774314173823228969E-2,
        4.88280347570998239232E-2,
        7.03124996963957469739E-2,
        1.24999999999870820058E-1,
        4.99999999999999999821E-1,
    ];

    // log(4)
    const C1: f64 = 1.3862943611198906188E0;

    let m1 = 1.0 - m;

    if !(0.0..=1.0).contains(&m1) || m1.is_nan() {
        return Err(DspError::Domain(format!(
            "elliptic integral parameter must satisfy 0 <= m <= 1, got {m}"
        )));
    }

    if m1 > MACHINE_EPSILON {
        Ok(evaluate_polynomial(m1, &P) - m1.ln() * evaluate_polynomial(m1, &Q))
    } else if m1 == 0.0 {
        Err(DspError::Domain(
            "complete elliptic integral diverges at m = 1".into(),
        ))
    } else {
        Ok(C1 - 0.5 * m1.ln())
    }
}

/// Evaluates the Jacobian elliptic functions sn(u|m), cn(u|m) and dn(u|m)
/// for parameter `m` in [0, 1] and real argument `u`.
///
/// Uses a closed-form series for very small `m`, a hyperbolic approximation
/// for `m` close to 1, and otherwise an arithmetic-geometric-mean descent
/// followed by a backward trigonometric recurrence. The AGM descent is
/// bounded to 8 iterations; exceeding the bound means the scale is not
/// shrinking within machine precision and surfaces as a convergence error.
pub fn jacobian_elliptic_functions(u: f64, m: f64) -> Result<JacobiElliptic> {
    if !(0.0..=1.0).contains(&m) || m.is_nan() {
        return Err(DspError::Domain(format!(
            "Jacobian elliptic parameter must satisfy 0 <= m <= 1, got {m}"
        )));
    }

    if m < 1.0e-9 {
        let t = u.sin();
        let b = u.cos();
        let ai = 0.25 * m * (u - t * b);
        return Ok(JacobiElliptic {
            sn: t - ai * b,
            cn: b + ai * t,
            dn: 1.0 - 0.5 * m * t * t,
            phi: u - ai,
        });
    }

    if m >= 0.9999999999 {
        let mut ai = 0.25 * (1.0 - m);
        let b = u.cosh();
        let t = u.tanh();
        let phi = 1.0 / b;
        let twon = b * u.sinh();

        let sn = t + ai * (twon - u) / (b * b);
        let ph = 2.0 * u.exp().atan() - std::f64::consts::FRAC_PI_2 + ai * (twon - u) / b;
        ai *= t * phi;
        let cn = phi - ai * (twon - u);
        let dn = phi + ai * (twon + u);
        return Ok(JacobiElliptic { sn, cn, dn, phi: ph });
    }

    // A.G.M. scale
    let mut a = [0.0f64; 9];
    let mut c = [0.0f64; 9];
    a[0] = 1.0;
    let mut b = (1.0 - m).sqrt();
    c[0] = m.sqrt();
    let mut twon = 1.0;
    let mut i = 0usize;

    while (c[i] / a[i]).abs() > MACHINE_EPSILON {
        if i > 7 {
            return Err(DspError::Convergence(
                "AGM descent for Jacobian elliptic functions exceeded 8 iterations".into(),
            ));
        }
        let ai = a[i];
        i += 1;
        c[i] = (ai - b) / 2.0;
        let t = (ai * b).sqrt();
        a[i] = (ai + b) / 2.0;
        b = t;
        twon *= 2.0;
    }

    // backward recurrence
    let mut phi = twon * a[i] * u;
    let mut prev;
    loop {
        let t = c[i] * phi.sin() / a[i];
        prev = phi;
        phi = (t.asin() + phi) / 2.0;
        i -= 1;
        if i == 0 {
            break;
        }
    }

    let sn = phi.sin();
    let t = phi.cos();
    Ok(JacobiElliptic {
        sn,
        cn: t,
        dn: t / (phi - prev).cos(),
        phi,
    })
}

/// Exact factorial n!.
///
/// Fails for negative `n` and on overflow of the 64-bit result.
pub fn factorial(n: i64) -> Result<u64> {
    if n < 0 {
        return Err(DspError::InvalidArgument(format!(
            "factorial requires n >= 0, got {n}"
        )));
    }
    let mut value: u64 = 1;
    for i in 2..=(n as u64) {
        value = value.checked_mul(i).ok_or_else(|| {
            DspError::InvalidArgument(format!("factorial({n}) overflows 64 bits"))
        })?;
    }
    Ok(value)
}

/// Number of k-element subsets of an n-element set.
///
/// Fails unless `0 <= k <= n`.
pub fn combinations(n: i64, k: i64) -> Result<u64> {
    if !(0 <= k && k <= n) {
        return Err(DspError::InvalidArgument(format!(
            "combinations requires 0 <= k <= n, got n = {n}, k = {k}"
        )));
    }
    let mut numerator: u64 = 1;
    let mut i = n;
    while i > k {
        numerator = numerator.checked_mul(i as u64).ok_or_else(|| {
            DspError::InvalidArgument(format!("combinations({n}, {k}) overflows 64 bits"))
        })?;
        i -= 1;
    }
    Ok(numerator / factorial(n - k)?)
}

/// Returns a copy of the array with the order of its elements inverted.
pub fn invert_array(array: &[f64]) -> Vec<f64> {
    array.iter().rev().copied().collect()
}
