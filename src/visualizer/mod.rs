//! Presentation state and the per-frame shape layout pass.

mod color;
mod shapes;

pub use color::{Rgb, PALETTE};
pub use shapes::{ShapeMode, Slot};

use glam::Vec2;
use log::{info, warn};

use crate::error::InputError;
use crate::params::RenderConfig;
use crate::surface::RenderSurface;

/// Shape, color, trail and viewport state consumed by the render pass.
///
/// Only the setters below mutate it.
#[derive(Debug, Clone)]
pub struct VisualizerState {
    shape: ShapeMode,
    color: Rgb,
    trail: bool,
    width: u32,
    height: u32,
    slot_count: usize,
    slot_gap_px: f32,
    trail_alpha: u8,
    background: Rgb,
}

impl VisualizerState {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            shape: config.initial_shape,
            color: config.initial_color,
            trail: false,
            width: config.window_width,
            height: config.window_height,
            slot_count: config.slot_count.max(1),
            slot_gap_px: config.slot_gap_px,
            trail_alpha: config.trail_alpha,
            background: config.background,
        }
    }

    pub fn shape_mode(&self) -> ShapeMode {
        self.shape
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn trail(&self) -> bool {
        self.trail
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_shape_mode(&mut self, mode: ShapeMode) {
        if mode != self.shape {
            info!("Shape: {}", mode);
        }
        self.shape = mode;
    }

    /// Set the shape by name; unknown names leave the mode unchanged
    pub fn set_shape_mode_named(&mut self, name: &str) -> Result<(), InputError> {
        let mode = name.parse::<ShapeMode>().inspect_err(|e| warn!("{}", e))?;
        self.set_shape_mode(mode);
        Ok(())
    }

    pub fn set_color(&mut self, color: Rgb) {
        if color != self.color {
            info!("Color: {}", color);
        }
        self.color = color;
    }

    /// Set the color by palette name or `#rrggbb`; unknown input leaves it unchanged
    pub fn set_color_named(&mut self, name: &str) -> Result<(), InputError> {
        let color = name.parse::<Rgb>().inspect_err(|e| warn!("{}", e))?;
        self.set_color(color);
        Ok(())
    }

    /// Flip the trail effect, returning the new state
    pub fn toggle_trail(&mut self) -> bool {
        self.trail = !self.trail;
        info!("Trail: {}", if self.trail { "on" } else { "off" });
        self.trail
    }

    /// Replace the viewport size (both dimensions at once)
    pub fn update_dimensions(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            info!("Viewport: {}x{}", width, height);
        }
        self.width = width;
        self.height = height;
    }

    /// Width of one slot in pixels, gap included
    pub fn slot_width(&self) -> f32 {
        self.width as f32 / self.slot_count as f32
    }

    /// Smoothed component shown in slot `index`.
    ///
    /// Slots map one-to-one onto the leading bins; vectors shorter than the
    /// slot count are stretched across all slots.
    pub fn slot_value(&self, smoothed: &[f32], index: usize) -> f32 {
        if smoothed.is_empty() {
            return 0.0;
        }
        let bin = if smoothed.len() >= self.slot_count {
            index
        } else {
            index * smoothed.len() / self.slot_count
        };
        smoothed[bin].clamp(0.0, 1.0)
    }

    /// Start a frame: full clear, or a translucent fade when trails are on
    pub fn begin_frame<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        if self.trail {
            surface.overlay(self.background, self.trail_alpha);
        } else {
            surface.clear(self.background);
        }
    }

    /// Layout pass: one shape pair per slot, height = value * half the viewport
    pub fn render<S: RenderSurface + ?Sized>(&self, surface: &mut S, smoothed: &[f32]) {
        let slot_width = self.slot_width();
        let drawn_width = (slot_width - self.slot_gap_px).max(1.0);
        let center_y = self.height as f32 / 2.0;

        for i in 0..self.slot_count {
            let slot = Slot {
                x: i as f32 * slot_width,
                width: drawn_width,
                center_y,
                height: self.slot_value(smoothed, i) * center_y,
            };
            self.shape.draw_slot(surface, &slot, self.color);
        }
    }

    /// Two-bar pause glyph in the middle of the viewport
    pub fn render_paused_indicator<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        let size = (self.width.min(self.height) as f32 / 6.0).max(12.0);
        let bar = Vec2::new(size / 3.0, size);
        let center = Vec2::new(self.width as f32, self.height as f32) / 2.0;
        let top = center.y - size / 2.0;

        surface.overlay(self.background, 128);
        surface.fill_rect(Vec2::new(center.x - size / 2.0, top), bar, Rgb::WHITE, 230);
        surface.fill_rect(
            Vec2::new(center.x + size / 2.0 - bar.x, top),
            bar,
            Rgb::WHITE,
            230,
        );
    }
}
