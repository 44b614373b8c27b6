//! IIR filter design: specification to digital recursion coefficients
//!
//! The classical pipeline: estimate the minimum analog prototype order that
//! satisfies the specification, generate the prototype, shift it to the
//! requested band at the pre-warped edge frequencies and discretize with the
//! bilinear transform.

use log::debug;
use std::f64::consts::PI;

use crate::error::{DspError, Result};
use crate::math::simplex::minimize_function_constrained;
use crate::math::special::complete_elliptic_integral_k;

use super::prototype::{
    butterworth_prototype, chebyshev1_prototype, chebyshev2_prototype, elliptic_prototype,
};
use super::specification::{BandType, FilterFamily, FilterSpecification};
use super::transform::{
    bilinear, lowpass_to_bandpass, lowpass_to_bandstop, lowpass_to_highpass, lowpass_to_lowpass,
    zpk_to_tf,
};

/// Digital IIR recursion coefficients.
///
/// `b` is the feedforward (numerator) sequence, `a` the feedback
/// (denominator) sequence with `a[0]` normalizing the recursion. Produced
/// once by the designer and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct IirCoefficients {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl IirCoefficients {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        if b.is_empty() || a.is_empty() {
            return Err(DspError::InvalidArgument(
                "coefficient arrays must not be empty".into(),
            ));
        }
        if a[0] == 0.0 {
            return Err(DspError::InvalidArgument(
                "a[0] must be non-zero to normalize the recursion".into(),
            ));
        }
        Ok(Self { b, a })
    }

    /// Identity coefficient set: the filter passes samples through.
    pub fn identity() -> Self {
        Self {
            b: vec![1.0],
            a: vec![1.0],
        }
    }

    pub fn feedforward(&self) -> &[f64] {
        &self.b
    }

    pub fn feedback(&self) -> &[f64] {
        &self.a
    }
}

/// Designs digital IIR coefficients satisfying the given specification.
pub fn design_filter(specification: &FilterSpecification) -> Result<IirCoefficients> {
    specification.validate()?;

    let (order, wn) = estimate_order(specification)?;
    debug!(
        "designing {:?} {:?} filter of order {} at wn {:?}",
        specification.family, specification.band_type, order, wn
    );

    let prototype = match specification.family {
        FilterFamily::Butterworth => butterworth_prototype(order)?,
        FilterFamily::ChebyshevI => {
            chebyshev1_prototype(order, specification.passband_ripple)?
        }
        FilterFamily::ChebyshevII => {
            chebyshev2_prototype(order, specification.stopband_attenuation)?
        }
        FilterFamily::Elliptic => elliptic_prototype(
            order,
            specification.passband_ripple,
            specification.stopband_attenuation,
        )?,
    };
    let (b, a) = zpk_to_tf(&prototype)?;

    // Digital design runs at a nominal fs of 2 so that the Nyquist frequency
    // maps to 1; the edges are pre-warped before the analog band transform.
    const FS: f64 = 2.0;
    let warped: Vec<f64> = wn.iter().map(|w| 2.0 * FS * (PI * w / FS).tan()).collect();

    let (b, a) = match specification.band_type {
        BandType::Lowpass => lowpass_to_lowpass(&b, &a, warped[0])?,
        BandType::Highpass => lowpass_to_highpass(&b, &a, warped[0])?,
        BandType::Bandpass => {
            let bw = warped[1] - warped[0];
            let wo = (warped[0] * warped[1]).sqrt();
            lowpass_to_bandpass(&b, &a, wo, bw)?
        }
        BandType::Bandstop => {
            let bw = warped[1] - warped[0];
            let wo = (warped[0] * warped[1]).sqrt();
            lowpass_to_bandstop(&b, &a, wo, bw)?
        }
    };

    let (b, a) = bilinear(&b, &a, FS)?;
    IirCoefficients::new(b, a)
}

/// Minimum prototype order and digital natural frequencies (normalized so
/// 1.0 is Nyquist) for the specification.
fn estimate_order(specification: &FilterSpecification) -> Result<(usize, Vec<f64>)> {
    let gpass = specification.passband_ripple;
    let gstop = specification.stopband_attenuation;
    let wp = specification.normalized_passband();
    let ws = specification.normalized_stopband();

    // Pre-warped analog edges
    let mut passb: Vec<f64> = wp.iter().map(|w| (PI * w / 2.0).tan()).collect();
    let stopb: Vec<f64> = ws.iter().map(|w| (PI * w / 2.0).tan()).collect();

    if specification.band_type == BandType::Bandstop {
        // The passband edges of a band-stop design are free parameters; pick
        // the pair that minimizes the required order.
        let family = specification.family;
        let edge0 = minimize_function_constrained(
            |x| {
                band_stop_order(&[x[0], passb[1]], &stopb, gpass, gstop, family)
            },
            &[passb[0]],
            &[stopb[0] - 1e-12],
            500,
        )?[0];
        passb[0] = edge0;
        let edge1 = minimize_function_constrained(
            |x| {
                band_stop_order(&[passb[0], x[0]], &stopb, gpass, gstop, family)
            },
            &[stopb[1] + 1e-12],
            &[passb[1]],
            500,
        )?[0];
        passb[1] = edge1;
    }

    let nat = selectivity(&passb, &stopb, specification.band_type);

    let order = match specification.family {
        FilterFamily::Butterworth | FilterFamily::ChebyshevI | FilterFamily::ChebyshevII => {
            let fractional = analytic_order(nat, gpass, gstop, specification.family)?;
            fractional.ceil() as usize
        }
        FilterFamily::Elliptic => elliptic_order(nat, gpass, gstop)?.ceil() as usize,
    };
    if order == 0 {
        return Err(DspError::InvalidSpecification(
            "specification is satisfied by a zero-order filter".into(),
        ));
    }

    let wn = match specification.family {
        FilterFamily::Butterworth => {
            butterworth_natural_frequencies(order, nat, gstop, &passb, specification.band_type)
        }
        FilterFamily::ChebyshevII => {
            chebyshev2_natural_frequencies(order, gpass, gstop, &passb, specification.band_type)
        }
        // Chebyshev I and elliptic designs are anchored at the passband edges
        FilterFamily::ChebyshevI | FilterFamily::Elliptic => specification.normalized_passband(),
    };

    Ok((order, wn))
}

/// Lowpass-prototype selectivity of the band edges.
fn selectivity(passb: &[f64], stopb: &[f64], band_type: BandType) -> f64 {
    match band_type {
        BandType::Lowpass => stopb[0] / passb[0],
        BandType::Highpass => passb[0] / stopb[0],
        BandType::Bandpass => stopb
            .iter()
            .map(|&s| ((s * s - passb[0] * passb[1]) / (s * (passb[0] - passb[1]))).abs())
            .fold(f64::INFINITY, f64::min),
        BandType::Bandstop => stopb
            .iter()
            .map(|&s| ((s * (passb[0] - passb[1])) / (s * s - passb[0] * passb[1])).abs())
            .fold(f64::INFINITY, f64::min),
    }
}

/// Required (real-valued) order of a band-stop design with trial passband
/// edges; objective of the edge search.
fn band_stop_order(
    passb: &[f64],
    stopb: &[f64],
    gpass: f64,
    gstop: f64,
    family: FilterFamily,
) -> f64 {
    let nat = selectivity(passb, stopb, BandType::Bandstop);
    let order = match family {
        FilterFamily::Elliptic => elliptic_order(nat, gpass, gstop),
        _ => analytic_order(nat, gpass, gstop, family),
    };
    order.unwrap_or(f64::INFINITY)
}

fn analytic_order(nat: f64, gpass: f64, gstop: f64, family: FilterFamily) -> Result<f64> {
    let g_stop = 10.0f64.powf(0.1 * gstop.abs());
    let g_pass = 10.0f64.powf(0.1 * gpass.abs());
    let ratio = (g_stop - 1.0) / (g_pass - 1.0);
    let order = match family {
        FilterFamily::Butterworth => ratio.log10() / (2.0 * nat.log10()),
        _ => ratio.sqrt().acosh() / nat.acosh(),
    };
    if !order.is_finite() || order < 0.0 {
        return Err(DspError::InvalidSpecification(format!(
            "cannot determine a filter order for selectivity {nat}"
        )));
    }
    Ok(order)
}

fn elliptic_order(nat: f64, gpass: f64, gstop: f64) -> Result<f64> {
    let g_stop = 10.0f64.powf(0.1 * gstop);
    let g_pass = 10.0f64.powf(0.1 * gpass);
    let arg1 = ((g_pass - 1.0) / (g_stop - 1.0)).sqrt();
    let arg0 = 1.0 / nat;
    let d0 = (
        complete_elliptic_integral_k(arg0 * arg0)?,
        complete_elliptic_integral_k(1.0 - arg0 * arg0)?,
    );
    let d1 = (
        complete_elliptic_integral_k(arg1 * arg1)?,
        complete_elliptic_integral_k(1.0 - arg1 * arg1)?,
    );
    Ok(d0.0 * d1.1 / (d0.1 * d1.0))
}

fn butterworth_natural_frequencies(
    order: usize,
    nat: f64,
    gstop: f64,
    passb: &[f64],
    band_type: BandType,
) -> Vec<f64> {
    let w0 = nat / (10.0f64.powf(0.1 * gstop.abs()) - 1.0).powf(1.0 / (2.0 * order as f64));
    let warped = match band_type {
        BandType::Lowpass => vec![w0 * passb[0]],
        BandType::Highpass => vec![passb[0] / w0],
        BandType::Bandpass => {
            let half = w0 * (passb[1] - passb[0]) / 2.0;
            let center = (w0 * w0 / 4.0 * (passb[1] - passb[0]).powi(2)
                + passb[0] * passb[1])
                .sqrt();
            let mut wn = vec![(-half + center).abs(), (half + center).abs()];
            wn.sort_by(|x, y| x.partial_cmp(y).unwrap());
            wn
        }
        BandType::Bandstop => {
            let diff = passb[1] - passb[0];
            let discriminant = (diff * diff + 4.0 * w0 * w0 * passb[0] * passb[1]).sqrt();
            let mut wn = vec![
                ((diff + discriminant) / (2.0 * w0)).abs(),
                ((diff - discriminant) / (2.0 * w0)).abs(),
            ];
            wn.sort_by(|x, y| x.partial_cmp(y).unwrap());
            wn
        }
    };
    warped.iter().map(|w| 2.0 / PI * w.atan()).collect()
}

fn chebyshev2_natural_frequencies(
    order: usize,
    gpass: f64,
    gstop: f64,
    passb: &[f64],
    band_type: BandType,
) -> Vec<f64> {
    let g_stop = 10.0f64.powf(0.1 * gstop.abs());
    let g_pass = 10.0f64.powf(0.1 * gpass.abs());
    let new_freq =
        1.0 / (1.0 / order as f64 * ((g_stop - 1.0) / (g_pass - 1.0)).sqrt().acosh()).cosh();

    let warped = match band_type {
        BandType::Lowpass => vec![passb[0] / new_freq],
        BandType::Highpass => vec![passb[0] * new_freq],
        BandType::Bandstop => {
            let first = new_freq / 2.0 * (passb[0] - passb[1])
                + (new_freq * new_freq * (passb[1] - passb[0]).powi(2) / 4.0
                    + passb[1] * passb[0])
                    .sqrt();
            vec![first, passb[1] * passb[0] / first]
        }
        BandType::Bandpass => {
            let first = 1.0 / (2.0 * new_freq) * (passb[0] - passb[1])
                + ((passb[1] - passb[0]).powi(2) / (4.0 * new_freq * new_freq)
                    + passb[1] * passb[0])
                    .sqrt();
            vec![first, passb[0] * passb[1] / first]
        }
    };
    let mut wn: Vec<f64> = warped.iter().map(|w| 2.0 / PI * w.atan()).collect();
    if wn.len() == 2 {
        wn.sort_by(|x, y| x.partial_cmp(y).unwrap());
    }
    wn
}
