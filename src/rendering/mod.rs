//! GPU presentation of recorded frames.

mod gpu;
mod tessellate;

pub use gpu::RenderSystem;
pub use tessellate::{tessellate, Tessellation, Vertex};
