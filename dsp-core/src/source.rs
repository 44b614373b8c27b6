//! Sample-source boundary between the DSP core and signal documents
//!
//! The core never owns recordings. Callers hand it a [`SampleSource`] (a
//! conceptually infinite, zero-extended stream of doubles) or a
//! [`MultichannelSignal`] window copied out of a document.

use std::sync::RwLock;

use crate::error::{DspError, Result};

/// Read-only access to a single channel of raw samples.
///
/// Implementations must behave as an infinite signal that is zero outside
/// the recorded range: a read at any offset succeeds, and positions past the
/// end of the data are filled with `0.0`. Implementations are expected to be
/// shared across display and worker threads, hence the `Send + Sync` bound.
pub trait SampleSource: Send + Sync {
    /// Fills `count` samples starting at `offset` into
    /// `target[target_offset..target_offset + count]`.
    fn get_samples(&self, target: &mut [f64], offset: usize, count: usize, target_offset: usize);

    /// Number of samples actually recorded so far.
    fn sample_count(&self) -> usize;
}

/// In-memory sample source backed by a plain vector.
pub struct VecSampleSource {
    samples: Vec<f64>,
}

impl VecSampleSource {
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples }
    }
}

impl SampleSource for VecSampleSource {
    fn get_samples(&self, target: &mut [f64], offset: usize, count: usize, target_offset: usize) {
        copy_zero_extended(&self.samples, target, offset, count, target_offset);
    }

    fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Growable sample buffer safe for concurrent append-while-read.
///
/// This is the collaborator a live acquisition feeds: the acquisition thread
/// appends while display or analysis threads read arbitrary windows. Reads
/// see a consistent snapshot of whatever had been appended when the read
/// lock was taken.
pub struct SharedSampleBuffer {
    samples: RwLock<Vec<f64>>,
}

impl SharedSampleBuffer {
    pub fn new() -> Self {
        Self {
            samples: RwLock::new(Vec::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: RwLock::new(Vec::with_capacity(capacity)),
        }
    }

    /// Appends freshly acquired samples at the end of the buffer.
    pub fn append(&self, samples: &[f64]) {
        self.samples.write().unwrap().extend_from_slice(samples);
    }
}

impl Default for SharedSampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for SharedSampleBuffer {
    fn get_samples(&self, target: &mut [f64], offset: usize, count: usize, target_offset: usize) {
        let samples = self.samples.read().unwrap();
        copy_zero_extended(&samples, target, offset, count, target_offset);
    }

    fn sample_count(&self) -> usize {
        self.samples.read().unwrap().len()
    }
}

fn copy_zero_extended(
    samples: &[f64],
    target: &mut [f64],
    offset: usize,
    count: usize,
    target_offset: usize,
) {
    let out = &mut target[target_offset..target_offset + count];
    out.fill(0.0);
    if offset < samples.len() {
        let available = (samples.len() - offset).min(count);
        out[..available].copy_from_slice(&samples[offset..offset + available]);
    }
}

/// A fixed multichannel window of samples with its sampling frequency.
///
/// Input to AR model estimation and artifact scoring. All channels must have
/// the same length; the window is immutable once constructed.
pub struct MultichannelSignal {
    channels: Vec<Vec<f64>>,
    sampling_frequency: f64,
}

impl MultichannelSignal {
    pub fn new(channels: Vec<Vec<f64>>, sampling_frequency: f64) -> Result<Self> {
        if channels.is_empty() {
            return Err(DspError::InvalidArgument(
                "signal must have at least one channel".into(),
            ));
        }
        let length = channels[0].len();
        if length == 0 {
            return Err(DspError::InvalidArgument(
                "signal channels must not be empty".into(),
            ));
        }
        if channels.iter().any(|c| c.len() != length) {
            return Err(DspError::InvalidArgument(
                "all channels must have the same number of samples".into(),
            ));
        }
        if !(sampling_frequency > 0.0) {
            return Err(DspError::InvalidArgument(
                "sampling frequency must be positive".into(),
            ));
        }
        Ok(Self {
            channels,
            sampling_frequency,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn sample_count(&self) -> usize {
        self.channels[0].len()
    }

    pub fn sampling_frequency(&self) -> f64 {
        self.sampling_frequency
    }

    pub fn channel(&self, index: usize) -> &[f64] {
        &self.channels[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_source_zero_extension() {
        let source = VecSampleSource::new(vec![1.0, 2.0, 3.0]);
        let mut target = vec![9.0; 6];

        source.get_samples(&mut target, 1, 4, 1);

        // One sample of untouched prefix, then data, then zero extension
        assert_eq!(target, vec![9.0, 2.0, 3.0, 0.0, 0.0, 9.0]);
    }

    #[test]
    fn test_vec_source_read_past_end() {
        let source = VecSampleSource::new(vec![1.0, 2.0]);
        let mut target = vec![7.0; 3];

        source.get_samples(&mut target, 10, 3, 0);

        assert_eq!(target, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shared_buffer_append_then_read() {
        let buffer = SharedSampleBuffer::new();
        buffer.append(&[1.0, 2.0]);
        buffer.append(&[3.0]);

        assert_eq!(buffer.sample_count(), 3);

        let mut target = vec![0.0; 3];
        buffer.get_samples(&mut target, 0, 3, 0);
        assert_eq!(target, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_multichannel_rejects_ragged_channels() {
        let result = MultichannelSignal::new(vec![vec![1.0, 2.0], vec![1.0]], 128.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_multichannel_accessors() {
        let signal =
            MultichannelSignal::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]], 256.0).unwrap();
        assert_eq!(signal.channel_count(), 2);
        assert_eq!(signal.sample_count(), 3);
        assert_eq!(signal.sampling_frequency(), 256.0);
        assert_eq!(signal.channel(1), &[4.0, 5.0, 6.0]);
    }
}
