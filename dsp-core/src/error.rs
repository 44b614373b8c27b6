//! Error taxonomy shared by the whole DSP core
//!
//! Numeric failures are never retried internally; they propagate to the
//! immediate caller, which owns user-facing messaging. Cancellation of a
//! long-running render is not an error (see [`crate::spectrum::stft`]).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DspError {
    /// Malformed caller input: negative sizes, mismatched array lengths,
    /// out-of-domain parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An argument outside the mathematical domain of a special function,
    /// e.g. an elliptic-function parameter outside [0, 1].
    #[error("domain error: {0}")]
    Domain(String),

    /// An iteration bound was exceeded before reaching machine precision
    /// (AGM descent, simplex search).
    #[error("did not converge: {0}")]
    Convergence(String),

    /// A filter specification that cannot be realized, e.g. passband ripple
    /// exceeding the stopband attenuation.
    #[error("unrealizable filter specification: {0}")]
    InvalidSpecification(String),

    /// A matrix required to be invertible was singular or numerically
    /// indistinguishable from singular.
    #[error("singular matrix: {0}")]
    SingularMatrix(String),
}

pub type Result<T> = std::result::Result<T, DspError>;
