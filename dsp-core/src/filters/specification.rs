//! User-facing IIR filter specification
//!
//! A specification is consumed once by [`crate::filters::design`] to produce
//! an immutable coefficient set; edge frequencies are given in Hz together
//! with the recording's sampling frequency.

use crate::error::{DspError, Result};

/// Analog approximation family used for the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterFamily {
    /// Maximally flat magnitude
    Butterworth,
    /// Equiripple passband, monotonic stopband
    ChebyshevI,
    /// Monotonic passband, equiripple stopband
    ChebyshevII,
    /// Equiripple in both bands (Cauer)
    Elliptic,
}

/// Frequency-selective behavior of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandType {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
}

impl BandType {
    /// Number of edge frequencies per band for this type.
    pub fn edge_count(&self) -> usize {
        match self {
            BandType::Lowpass | BandType::Highpass => 1,
            BandType::Bandpass | BandType::Bandstop => 2,
        }
    }
}

/// Complete description of the filter to design.
///
/// `passband_edges` and `stopband_edges` hold one frequency for
/// lowpass/highpass designs and two for bandpass/bandstop designs, all in
/// Hz. `passband_ripple` is the maximum loss allowed in the passband and
/// `stopband_attenuation` the minimum loss required in the stopband, both
/// in dB.
#[derive(Debug, Clone)]
pub struct FilterSpecification {
    pub family: FilterFamily,
    pub band_type: BandType,
    pub passband_edges: Vec<f64>,
    pub stopband_edges: Vec<f64>,
    pub passband_ripple: f64,
    pub stopband_attenuation: f64,
    pub sampling_frequency: f64,
}

impl FilterSpecification {
    /// Checks internal consistency before any numeric work starts.
    pub fn validate(&self) -> Result<()> {
        if !(self.sampling_frequency > 0.0) {
            return Err(DspError::InvalidArgument(
                "sampling frequency must be positive".into(),
            ));
        }
        let expected = self.band_type.edge_count();
        if self.passband_edges.len() != expected || self.stopband_edges.len() != expected {
            return Err(DspError::InvalidArgument(format!(
                "{:?} designs require {} passband and {} stopband edge frequencies",
                self.band_type, expected, expected
            )));
        }

        let nyquist = self.sampling_frequency / 2.0;
        for &edge in self.passband_edges.iter().chain(&self.stopband_edges) {
            if !(edge > 0.0 && edge < nyquist) {
                return Err(DspError::InvalidArgument(format!(
                    "edge frequency {edge} Hz outside (0, {nyquist}) Hz"
                )));
            }
        }

        if !(self.passband_ripple > 0.0) || !(self.stopband_attenuation > 0.0) {
            return Err(DspError::InvalidArgument(
                "ripple and attenuation must be positive".into(),
            ));
        }
        if self.passband_ripple >= self.stopband_attenuation {
            return Err(DspError::InvalidSpecification(format!(
                "passband ripple ({} dB) must be below stopband attenuation ({} dB)",
                self.passband_ripple, self.stopband_attenuation
            )));
        }

        let wp = &self.passband_edges;
        let ws = &self.stopband_edges;
        let ordered = match self.band_type {
            BandType::Lowpass => wp[0] < ws[0],
            BandType::Highpass => ws[0] < wp[0],
            BandType::Bandpass => ws[0] < wp[0] && wp[0] < wp[1] && wp[1] < ws[1],
            BandType::Bandstop => wp[0] < ws[0] && ws[0] < ws[1] && ws[1] < wp[1],
        };
        if !ordered {
            return Err(DspError::InvalidSpecification(format!(
                "edge frequencies are not ordered as a {:?} band requires",
                self.band_type
            )));
        }
        Ok(())
    }

    /// Passband edges normalized so that 1.0 is the Nyquist frequency.
    pub(crate) fn normalized_passband(&self) -> Vec<f64> {
        let nyquist = self.sampling_frequency / 2.0;
        self.passband_edges.iter().map(|f| f / nyquist).collect()
    }

    /// Stopband edges normalized so that 1.0 is the Nyquist frequency.
    pub(crate) fn normalized_stopband(&self) -> Vec<f64> {
        let nyquist = self.sampling_frequency / 2.0;
        self.stopband_edges.iter().map(|f| f / nyquist).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lowpass() -> FilterSpecification {
        FilterSpecification {
            family: FilterFamily::Butterworth,
            band_type: BandType::Lowpass,
            passband_edges: vec![20.0],
            stopband_edges: vec![30.0],
            passband_ripple: 3.0,
            stopband_attenuation: 40.0,
            sampling_frequency: 128.0,
        }
    }

    #[test]
    fn test_valid_lowpass_passes() {
        assert!(lowpass().validate().is_ok());
    }

    #[test]
    fn test_edge_beyond_nyquist_rejected() {
        let mut spec = lowpass();
        spec.stopband_edges = vec![70.0];
        assert!(matches!(
            spec.validate(),
            Err(DspError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_ripple_above_attenuation_rejected() {
        let mut spec = lowpass();
        spec.passband_ripple = 50.0;
        assert!(matches!(
            spec.validate(),
            Err(DspError::InvalidSpecification(_))
        ));
    }

    #[test]
    fn test_misordered_highpass_rejected() {
        let spec = FilterSpecification {
            family: FilterFamily::ChebyshevI,
            band_type: BandType::Highpass,
            passband_edges: vec![10.0],
            stopband_edges: vec![20.0],
            passband_ripple: 1.0,
            stopband_attenuation: 30.0,
            sampling_frequency: 128.0,
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_bandpass_edge_count_enforced() {
        let spec = FilterSpecification {
            family: FilterFamily::Elliptic,
            band_type: BandType::Bandpass,
            passband_edges: vec![10.0],
            stopband_edges: vec![5.0, 30.0],
            passband_ripple: 1.0,
            stopband_attenuation: 30.0,
            sampling_frequency: 128.0,
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_normalization() {
        let spec = lowpass();
        let wp = spec.normalized_passband();
        assert!((wp[0] - 20.0 / 64.0).abs() < 1e-12);
    }
}
