//! Parameter definitions with units and documented semantics.
//!
//! All tunable numbers are collected here with:
//! - Units (pixels, ticks, Hz, etc.)
//! - Documented ranges and meanings
//! - A `validate()` per struct where bad values are possible

mod audio;
mod bindings;
mod particles;
mod render;

// Re-export all types
pub use audio::{AnalysisMode, SpectrumConfig, WindowFunction};
pub use bindings::{Action, KeyBindings};
pub use particles::ParticleConfig;
pub use render::{RecordingConfig, RenderConfig};
