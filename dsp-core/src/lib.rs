//! Offline DSP core for multichannel biomedical recordings
//!
//! IIR filter design and causal filtering, multivariate AR estimation with
//! directed-transfer-function decomposition, short-time Fourier rendering
//! and ECG artifact scoring. The surrounding application supplies raw
//! sample buffers and consumes the computed numeric results.

pub mod artifact;
pub mod dtf;
pub mod error;
pub mod filters;
pub mod math;
pub mod source;
pub mod spectrum;

pub use artifact::EcgArtifactScorer;
pub use dtf::ArModel;
pub use error::{DspError, Result};
pub use filters::{
    design_filter, BandType, FilterFamily, FilterSpecification, IirCoefficients,
    TimeDomainFilterEngine, WindowType,
};
pub use source::{MultichannelSignal, SampleSource, SharedSampleBuffer, VecSampleSource};
pub use spectrum::{SpectrumAnalyzer, StftRenderer};
