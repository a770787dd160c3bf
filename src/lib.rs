//! Pulsewave library - audio-reactive spectrum visualizer

pub mod audio;
pub mod cli;
pub mod error;
pub mod frame_loop;
pub mod params;
pub mod particles;
pub mod rendering;
pub mod spectrum;
pub mod surface;
pub mod visualizer;
