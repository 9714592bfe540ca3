//! Resampling pipeline
//!
//! Raw chip-rate samples are interpolated onto an oversampled grid, decimated
//! to the output rate through a windowed-sinc FIR, then DC-corrected:
//!
//! ```text
//! mixer -> Interpolator -> (x M) -> DecimationFilter -> BiasFilter -> host
//! ```

pub mod bias;
pub mod fir;
pub mod interpolator;

pub use bias::BiasFilter;
pub use fir::{blackman_harris, DecimationFilter, FirDesign};
pub use interpolator::Interpolator;
