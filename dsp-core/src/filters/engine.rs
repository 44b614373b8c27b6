//! Causal time-domain IIR filtering over a sample source
//!
//! The engine recomputes every requested window from scratch, pulling up to
//! 100 samples of left context from the source so the recursion has settled
//! by the time the requested range starts. There is no cross-call state;
//! a coarse per-instance lock serializes overlapping window requests from
//! concurrent display threads.

use log::trace;
use std::sync::{Arc, Mutex};

use crate::error::{DspError, Result};
use crate::source::SampleSource;

use super::design::IirCoefficients;

/// Number of left-context samples requested ahead of the window (fewer when
/// the window starts near the beginning of the signal).
const MAX_LEFT_CONTEXT: usize = 100;

/// Applies an immutable IIR coefficient set to windows of an unfiltered
/// sample source.
pub struct TimeDomainFilterEngine {
    source: Arc<dyn SampleSource>,
    coefficients: IirCoefficients,
    lock: Mutex<()>,
}

impl TimeDomainFilterEngine {
    /// Creates an engine over `source` with the given coefficients.
    ///
    /// The feedback array must span at least as many taps as the feedforward
    /// array; the recursion indexes feedback coefficients over the
    /// feedforward tap window.
    pub fn new(source: Arc<dyn SampleSource>, coefficients: IirCoefficients) -> Result<Self> {
        if coefficients.feedback().len() < coefficients.feedforward().len() {
            return Err(DspError::InvalidArgument(
                "feedback coefficients must cover the feedforward tap span; \
                 pad the feedback array with zeros explicitly"
                    .into(),
            ));
        }
        Ok(Self {
            source,
            coefficients,
            lock: Mutex::new(()),
        })
    }

    /// Filters `count` samples starting at `signal_offset` and writes them
    /// into `target[target_offset..target_offset + count]`.
    ///
    /// The recursion runs over the extended window from time zero, indexing
    /// coefficients by distance `i - j` within the feedforward tap window:
    ///
    /// ```text
    /// filtered[i] = (1/a[0]) * ( sum_{j} b[i-j]*cache[j] - sum_{j<i} a[i-j]*filtered[j] )
    /// ```
    ///
    /// For short histories (`i` below the tap count) the sums simply start
    /// at zero, which is the settling behavior the recompute-with-context
    /// strategy relies on. This indexing is a compatibility requirement and
    /// intentionally differs from a fixed-tap direct-form recursion.
    pub fn get_samples(
        &self,
        target: &mut [f64],
        signal_offset: usize,
        count: usize,
        target_offset: usize,
    ) -> Result<()> {
        if count == 0 {
            return Err(DspError::InvalidArgument(
                "sample count must be positive".into(),
            ));
        }
        if target_offset + count > target.len() {
            return Err(DspError::InvalidArgument(format!(
                "target of length {} cannot hold {} samples at offset {}",
                target.len(),
                count,
                target_offset
            )));
        }

        let _guard = self.lock.lock().unwrap();

        let add_left = signal_offset.min(MAX_LEFT_CONTEXT);
        let new_offset = signal_offset - add_left;
        let new_count = count + add_left;
        trace!(
            "filtering {count} samples at offset {signal_offset} with {add_left} context samples"
        );

        let mut cache = vec![0.0; new_count];
        let mut filtered = vec![0.0; new_count];
        self.source.get_samples(&mut cache, new_offset, new_count, 0);

        let b = self.coefficients.feedforward();
        let a = self.coefficients.feedback();
        for i in 0..new_count {
            let first = (i + 1).saturating_sub(b.len());
            let mut accumulated = 0.0;
            for j in first..=i {
                accumulated += cache[j] * b[i - j];
                if j < i {
                    accumulated -= filtered[j] * a[i - j];
                }
            }
            filtered[i] = accumulated / a[0];
        }

        target[target_offset..target_offset + count].copy_from_slice(&filtered[add_left..]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::VecSampleSource;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64 * 0.37).sin() + 0.01 * i as f64).collect()
    }

    #[test]
    fn test_identity_filter_passes_input_through() {
        let samples = ramp(300);
        let source = Arc::new(VecSampleSource::new(samples.clone()));
        let engine =
            TimeDomainFilterEngine::new(source, IirCoefficients::identity()).unwrap();

        for &(offset, count) in &[(0usize, 50usize), (17, 40), (250, 60)] {
            let mut target = vec![0.0; count];
            engine.get_samples(&mut target, offset, count, 0).unwrap();
            for i in 0..count {
                let expected = if offset + i < samples.len() {
                    samples[offset + i]
                } else {
                    0.0
                };
                assert!(
                    (target[i] - expected).abs() < 1e-12,
                    "mismatch at offset {offset} index {i}"
                );
            }
        }
    }

    #[test]
    fn test_windowed_request_matches_full_computation() {
        // When the requested offset is within the context reach, the engine
        // sees the whole prefix and the output is bit-identical to filtering
        // from time zero.
        let samples = ramp(200);
        let source = Arc::new(VecSampleSource::new(samples));
        let coefficients =
            IirCoefficients::new(vec![0.2, 0.3, 0.1], vec![1.0, -0.4, 0.05]).unwrap();
        let engine = TimeDomainFilterEngine::new(source, coefficients).unwrap();

        let mut full = vec![0.0; 150];
        engine.get_samples(&mut full, 0, 150, 0).unwrap();

        let mut windowed = vec![0.0; 50];
        engine.get_samples(&mut windowed, 80, 50, 0).unwrap();

        for i in 0..50 {
            assert_eq!(windowed[i], full[80 + i], "divergence at {i}");
        }
    }

    #[test]
    fn test_moving_average_via_zero_feedback() {
        let source = Arc::new(VecSampleSource::new(vec![3.0, 3.0, 3.0, 3.0]));
        let coefficients =
            IirCoefficients::new(vec![0.5, 0.5], vec![1.0, 0.0]).unwrap();
        let engine = TimeDomainFilterEngine::new(source, coefficients).unwrap();

        let mut target = vec![0.0; 4];
        engine.get_samples(&mut target, 0, 4, 0).unwrap();
        // First output only sees one tap of history
        assert!((target[0] - 1.5).abs() < 1e-12);
        assert!((target[1] - 3.0).abs() < 1e-12);
        assert!((target[3] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_target_offset_is_respected() {
        let source = Arc::new(VecSampleSource::new(vec![1.0, 2.0, 3.0]));
        let engine =
            TimeDomainFilterEngine::new(source, IirCoefficients::identity()).unwrap();

        let mut target = vec![-1.0; 5];
        engine.get_samples(&mut target, 0, 3, 2).unwrap();
        assert_eq!(target, vec![-1.0, -1.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_rejects_zero_count_and_short_target() {
        let source = Arc::new(VecSampleSource::new(vec![1.0]));
        let engine =
            TimeDomainFilterEngine::new(source, IirCoefficients::identity()).unwrap();

        let mut target = vec![0.0; 2];
        assert!(engine.get_samples(&mut target, 0, 0, 0).is_err());
        assert!(engine.get_samples(&mut target, 0, 3, 0).is_err());
    }

    #[test]
    fn test_rejects_short_feedback_array() {
        let source = Arc::new(VecSampleSource::new(vec![1.0]));
        let coefficients = IirCoefficients::new(vec![0.5, 0.5], vec![1.0]).unwrap();
        assert!(TimeDomainFilterEngine::new(source, coefficients).is_err());
    }

    #[test]
    fn test_concurrent_requests_serialize() {
        use std::thread;

        let samples = ramp(500);
        let source = Arc::new(VecSampleSource::new(samples));
        let coefficients =
            IirCoefficients::new(vec![0.25, 0.5, 0.25], vec![1.0, -0.3, 0.2]).unwrap();
        let engine = Arc::new(TimeDomainFilterEngine::new(source, coefficients).unwrap());

        let mut reference = vec![0.0; 400];
        engine.get_samples(&mut reference, 50, 400, 0).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let engine = Arc::clone(&engine);
                let expected = reference.clone();
                thread::spawn(move || {
                    // Offsets at or below the context reach see the whole
                    // prefix, so outputs are bit-identical to the reference
                    let offset = 50 + t * 10;
                    let mut target = vec![0.0; 100];
                    engine.get_samples(&mut target, offset, 100, 0).unwrap();
                    for i in 0..100 {
                        assert_eq!(target[i], expected[offset - 50 + i]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
