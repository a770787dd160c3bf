//! Rendering and recording configuration.

use std::time::Duration;

use crate::error::ConfigError;
use crate::visualizer::{Rgb, ShapeMode};

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Initial window width (pixels)
    pub window_width: u32,

    /// Initial window height (pixels)
    pub window_height: u32,

    /// Fixed tick rate (frames per second)
    pub fps: u32,

    /// Horizontal slots the smoothed vector is laid out across
    pub slot_count: usize,

    /// Empty pixels between adjacent slots
    pub slot_gap_px: f32,

    /// Opacity of the fade overlay when trails are on (0-255).
    /// Lower = longer afterimage.
    pub trail_alpha: u8,

    pub background: Rgb,

    pub initial_color: Rgb,

    pub initial_shape: ShapeMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            fps: 30,
            slot_count: 60,
            slot_gap_px: 2.0,
            trail_alpha: 40,
            background: Rgb::BLACK,
            initial_color: Rgb::WHITE,
            initial_shape: ShapeMode::Bars,
        }
    }
}

impl RenderConfig {
    /// Duration of one tick
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::NonPositive("fps"));
        }
        if self.slot_count == 0 {
            return Err(ConfigError::NonPositive("slot_count"));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::NonPositive("window size"));
        }
        Ok(())
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds of ticks, not wall time)
    pub duration_secs: f32,

    /// Output directory for frames
    pub output_dir: String,

    /// Tick rate frames are captured at
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32, fps: u32) -> Self {
        Self {
            duration_secs,
            output_dir: "recording".to_string(),
            fps,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }

    pub fn frame_path(&self, frame_num: usize) -> String {
        format!("{}/frame_{:05}.png", self.frames_dir(), frame_num)
    }
}
