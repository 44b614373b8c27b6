//! ECG artifact scoring by correlation against a reference channel
//!
//! Scores each channel with the absolute Pearson correlation against the
//! ECG reference over a fixed block; a thresholding layer outside this core
//! turns scores into artifact flags. Detrending/normalization of the block
//! is the caller's concern.

use crate::error::{DspError, Result};
use crate::source::MultichannelSignal;

/// Pearson correlation coefficient of two equally sized blocks.
///
/// Returns 0.0 when either block has zero variance, since the coefficient
/// is undefined there.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(DspError::InvalidArgument(format!(
            "correlation inputs must have equal lengths, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(DspError::InvalidArgument(
            "correlation inputs must not be empty".into(),
        ));
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 {
        return Ok(0.0);
    }
    Ok(covariance / denominator)
}

/// Per-channel ECG correlation scorer.
///
/// The result buffer is owned by the scorer and overwritten on every call;
/// callers must not assume its contents survive the next invocation.
pub struct EcgArtifactScorer {
    scores: Vec<f64>,
}

impl EcgArtifactScorer {
    pub fn new(channel_count: usize) -> Self {
        Self {
            scores: vec![0.0; channel_count],
        }
    }

    /// Scores every channel of `signal` against `ecg_channel` over the
    /// block `[offset, offset + block_length)`.
    ///
    /// Returns a view of the internal result buffer, one score per channel.
    pub fn score(
        &mut self,
        signal: &MultichannelSignal,
        ecg_channel: usize,
        offset: usize,
        block_length: usize,
    ) -> Result<&[f64]> {
        if signal.channel_count() != self.scores.len() {
            return Err(DspError::InvalidArgument(format!(
                "scorer sized for {} channels received {}",
                self.scores.len(),
                signal.channel_count()
            )));
        }
        if ecg_channel >= signal.channel_count() {
            return Err(DspError::InvalidArgument(format!(
                "reference channel {ecg_channel} out of range"
            )));
        }
        if block_length == 0 || offset + block_length > signal.sample_count() {
            return Err(DspError::InvalidArgument(format!(
                "block [{offset}, {}) outside the signal window",
                offset + block_length
            )));
        }

        let reference = &signal.channel(ecg_channel)[offset..offset + block_length];
        for channel in 0..signal.channel_count() {
            let block = &signal.channel(channel)[offset..offset + block_length];
            self.scores[channel] = pearson_correlation(block, reference)?.abs();
        }
        Ok(&self.scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal() -> MultichannelSignal {
        let ecg: Vec<f64> = (0..200).map(|i| (i as f64 * 0.21).sin()).collect();
        let correlated: Vec<f64> = ecg.iter().map(|x| -2.0 * x + 0.5).collect();
        let unrelated: Vec<f64> = (0..200).map(|i| (i as f64 * 1.7 + 0.4).cos()).collect();
        MultichannelSignal::new(vec![ecg, correlated, unrelated], 128.0).unwrap()
    }

    #[test]
    fn test_reference_scores_itself_as_one() {
        let signal = signal();
        let mut scorer = EcgArtifactScorer::new(3);
        let scores = scorer.score(&signal, 0, 0, 200).unwrap();
        assert!((scores[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scaled_channel_scores_one() {
        // Correlation is invariant under affine maps, sign folded by abs
        let signal = signal();
        let mut scorer = EcgArtifactScorer::new(3);
        let scores = scorer.score(&signal, 0, 0, 200).unwrap();
        assert!((scores[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unrelated_channel_scores_low() {
        let signal = signal();
        let mut scorer = EcgArtifactScorer::new(3);
        let scores = scorer.score(&signal, 0, 0, 200).unwrap();
        assert!(scores[2] < 0.3, "unrelated score {}", scores[2]);
    }

    #[test]
    fn test_buffer_is_overwritten_across_calls() {
        let signal = signal();
        let mut scorer = EcgArtifactScorer::new(3);
        scorer.score(&signal, 0, 0, 200).unwrap();
        let second = scorer.score(&signal, 2, 0, 200).unwrap();
        assert!((second[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_block_rejected() {
        let signal = signal();
        let mut scorer = EcgArtifactScorer::new(3);
        assert!(scorer.score(&signal, 0, 150, 100).is_err());
        assert!(scorer.score(&signal, 5, 0, 100).is_err());
        assert!(scorer.score(&signal, 0, 0, 0).is_err());
    }

    #[test]
    fn test_pearson_rejects_mismatched_lengths() {
        assert!(pearson_correlation(&[1.0, 2.0], &[1.0]).is_err());
        assert!(pearson_correlation(&[], &[]).is_err());
    }

    #[test]
    fn test_pearson_constant_input_is_zero() {
        let r = pearson_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(r, 0.0);
    }
}
