//! Multivariate autoregressive modeling and directed transfer functions
//!
//! A vector AR model is estimated from a multichannel window by the block
//! Yule-Walker equations; its frequency-domain transfer matrix yields the
//! directed-transfer-function magnitudes used for channel-causality
//! analysis.

use log::debug;
use nalgebra::{DMatrix, DVector};
use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

use crate::error::{DspError, Result};
use crate::math::linalg::{determinant, invert_complex, solve_real};
use crate::source::MultichannelSignal;

/// One `(frequency, value)` series of the spectral grid.
#[derive(Debug, Clone, Default)]
pub struct ArSpectrum {
    pub frequencies: Vec<f64>,
    pub values: Vec<f64>,
}

/// Fitted multivariate AR model.
///
/// Holds the coefficient matrices `A[0..=order]` with `A[0] = -I` by
/// convention, the residual-noise covariance `V` and the sampling frequency
/// of the estimation window. Immutable after construction.
pub struct ArModel {
    channel_count: usize,
    coefficients: Vec<DMatrix<f64>>,
    noise_covariance: DMatrix<f64>,
    error_determinant: f64,
    sampling_frequency: f64,
}

impl ArModel {
    /// Builds a model from explicit coefficient matrices.
    ///
    /// Every matrix in `coefficients` and the covariance must be
    /// `channel_count` square.
    pub fn new(
        channel_count: usize,
        coefficients: Vec<DMatrix<f64>>,
        noise_covariance: DMatrix<f64>,
        sampling_frequency: f64,
    ) -> Result<Self> {
        for matrix in coefficients.iter().chain(std::iter::once(&noise_covariance)) {
            if matrix.nrows() != channel_count || matrix.ncols() != channel_count {
                return Err(DspError::InvalidArgument(
                    "coefficient matrix dimensions must match the channel count".into(),
                ));
            }
        }
        if coefficients.is_empty() {
            return Err(DspError::InvalidArgument(
                "a model needs at least the zero-lag coefficient matrix".into(),
            ));
        }
        let error_determinant = determinant(&noise_covariance);
        Ok(Self {
            channel_count,
            coefficients,
            noise_covariance,
            error_determinant,
            sampling_frequency,
        })
    }

    /// Estimates a model of the given order from a multichannel window.
    ///
    /// Channels are mean/std whitened, lag correlations accumulated with the
    /// causal `(t, t+s)` convention and the block Yule-Walker normal
    /// equations solved by LU decomposition. A singular normal-equations
    /// matrix fails fast with [`DspError::SingularMatrix`]; no pseudo-inverse
    /// fallback is attempted.
    pub fn compute(signal: &MultichannelSignal, order: usize) -> Result<ArModel> {
        if order == 0 {
            return Err(DspError::InvalidArgument(
                "model order must be at least 1".into(),
            ));
        }
        let n = signal.sample_count();
        let c = signal.channel_count();
        if n <= order {
            return Err(DspError::InvalidArgument(format!(
                "window of {n} samples cannot support order {order}"
            )));
        }
        debug!("estimating AR({order}) model over {c} channels, {n} samples");

        // Whitened data matrix, one row per channel
        let mut whitened = DMatrix::<f64>::zeros(c, n);
        for channel in 0..c {
            let data = signal.channel(channel);
            let mean = data.iter().sum::<f64>() / n as f64;
            let variance = data.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
            let std = variance.sqrt();
            if std == 0.0 {
                return Err(DspError::InvalidArgument(format!(
                    "channel {channel} is constant and cannot be whitened"
                )));
            }
            for t in 0..n {
                whitened[(channel, t)] = (data[t] - mean) / std;
            }
        }

        // Lag correlations R[s][i][j], channel i leading channel j by s
        let mut lag_correlations = Vec::with_capacity(order + 1);
        for s in 0..=order {
            let mut r = DMatrix::<f64>::zeros(c, c);
            for i in 0..c {
                for j in 0..c {
                    let mut sum = 0.0;
                    for t in 0..n - s {
                        sum += whitened[(i, t)] * whitened[(j, t + s)];
                    }
                    r[(i, j)] = sum / n as f64;
                }
            }
            lag_correlations.push(r);
        }

        // Block Yule-Walker normal equations
        let mut big_matrix = DMatrix::<f64>::zeros(order * c, order * c);
        for i in 0..order {
            for j in 0..order {
                let block = if i >= j {
                    lag_correlations[i - j].clone()
                } else {
                    lag_correlations[j - i].transpose()
                };
                big_matrix.view_mut((i * c, j * c), (c, c)).copy_from(&block);
            }
        }
        let mut big_column = DMatrix::<f64>::zeros(order * c, c);
        for i in 0..order {
            big_column
                .view_mut((i * c, 0), (c, c))
                .copy_from(&lag_correlations[i + 1]);
        }

        let solution = solve_real(&big_matrix, &big_column)?;

        let mut coefficients = Vec::with_capacity(order + 1);
        coefficients.push(-DMatrix::<f64>::identity(c, c));
        for s in 1..=order {
            coefficients.push(solution.view(((s - 1) * c, 0), (c, c)).into_owned());
        }

        // Residual covariance from running the fitted model over the window
        let mut covariance = DMatrix::<f64>::zeros(c, c);
        for t in order..n {
            let mut residual = DVector::<f64>::zeros(c);
            for (s, a) in coefficients.iter().enumerate() {
                residual += a * whitened.column(t - s);
            }
            covariance += &residual * residual.transpose();
        }
        covariance /= n as f64;

        ArModel::new(c, coefficients, covariance, signal.sampling_frequency())
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    pub fn sampling_frequency(&self) -> f64 {
        self.sampling_frequency
    }

    /// Determinant of the residual-noise covariance.
    pub fn error_determinant(&self) -> f64 {
        self.error_determinant
    }

    pub fn noise_covariance(&self) -> &DMatrix<f64> {
        &self.noise_covariance
    }

    pub fn coefficient(&self, lag: usize) -> &DMatrix<f64> {
        &self.coefficients[lag]
    }

    /// DTF magnitude matrix at `frequency` Hz.
    ///
    /// Entry `(i, j)` carries the squared transfer magnitude for causality
    /// `i -> j`; with `normalize` each target channel's incoming values are
    /// rescaled to sum to 1. Diagonal entries are replaced by the
    /// auto-spectral power `|(H V H*)[i][i]|` after normalization.
    pub fn transfer_matrix(&self, frequency: f64, normalize: bool) -> Result<DMatrix<f64>> {
        let (mut dtf, transfer) = self.dtf_magnitudes(frequency, normalize)?;

        let complex_covariance =
            self.noise_covariance.map(|v| Complex64::new(v, 0.0));
        let spectrum = &transfer * complex_covariance * transfer.adjoint();
        for i in 0..self.channel_count {
            dtf[(i, i)] = spectrum[(i, i)].norm();
        }
        Ok(dtf)
    }

    /// Squared transfer magnitudes before the diagonal auto-power
    /// substitution, together with the complex transfer matrix H(f).
    fn dtf_magnitudes(
        &self,
        frequency: f64,
        normalize: bool,
    ) -> Result<(DMatrix<f64>, DMatrix<Complex64>)> {
        let c = self.channel_count;
        let mut s = DMatrix::<Complex64>::zeros(c, c);
        for (lag, a) in self.coefficients.iter().enumerate() {
            let exponent = Complex64::new(
                0.0,
                -2.0 * PI * lag as f64 * frequency / self.sampling_frequency,
            )
            .exp();
            for i in 0..c {
                for j in 0..c {
                    s[(i, j)] += exponent * a[(i, j)];
                }
            }
        }

        let transfer = invert_complex(&s)?;

        let mut dtf = DMatrix::<f64>::zeros(c, c);
        for i in 0..c {
            for j in 0..c {
                dtf[(i, j)] = transfer[(i, j)].norm_sqr();
            }
        }
        if normalize {
            // Entry (i, j) is causality i -> j: normalize each target
            // channel's incoming column
            for j in 0..c {
                let mut norm = 0.0;
                for i in 0..c {
                    norm += dtf[(i, j)];
                }
                let norm = 1.0 / norm;
                for i in 0..c {
                    dtf[(i, j)] *= norm;
                }
            }
        }
        Ok((dtf, transfer))
    }

    /// Samples the transfer matrix at `spectrum_size` equally spaced
    /// frequencies from 0 up to the Nyquist frequency, one series per
    /// ordered channel pair.
    pub fn spectral_data(
        &self,
        spectrum_size: usize,
        normalized: bool,
    ) -> Result<Array2<ArSpectrum>> {
        let c = self.channel_count;
        let mut grid = Array2::<ArSpectrum>::default((c, c));
        for series in grid.iter_mut() {
            series.frequencies.reserve(spectrum_size);
            series.values.reserve(spectrum_size);
        }

        let nyquist = 0.5 * self.sampling_frequency;
        for f in 0..spectrum_size {
            let frequency = f as f64 * nyquist / spectrum_size as f64;
            let transfer = self.transfer_matrix(frequency, normalized)?;
            for i in 0..c {
                for j in 0..c {
                    let series = &mut grid[[i, j]];
                    series.frequencies.push(frequency);
                    series.values.push(transfer[(i, j)]);
                }
            }
        }
        Ok(grid)
    }
}
