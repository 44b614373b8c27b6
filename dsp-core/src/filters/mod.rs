//! IIR filter design and the causal time-domain filtering engine

pub mod design;
pub mod engine;
pub mod prototype;
pub mod specification;
pub mod transform;
pub mod windows;

pub use design::{design_filter, IirCoefficients};
pub use engine::TimeDomainFilterEngine;
pub use specification::{BandType, FilterFamily, FilterSpecification};
pub use windows::{generate_window, WindowType};
