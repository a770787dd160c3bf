//! Spectrum extraction and smoothing.

mod extractor;
mod smoother;

pub use extractor::{hann_window, mean_intensity, RustFftTransform, SpectrumExtractor, Transform};
pub use smoother::SpectrumSmoother;
