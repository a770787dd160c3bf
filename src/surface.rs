//! Render surface contract and a recording implementation.
//!
//! The core only ever talks to [`RenderSurface`]. [`DrawList`] records the
//! calls as [`DrawCommand`]s; the GPU presenter tessellates a recorded list,
//! and tests inspect it directly.

use glam::Vec2;

use crate::visualizer::Rgb;

/// Primitive draw operations with per-call alpha (0 = transparent, 255 = opaque)
pub trait RenderSurface {
    /// Current pixel dimensions (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Replace the whole frame with `color`
    fn clear(&mut self, color: Rgb);

    /// Blend `color` at `alpha` over the whole previous frame
    fn overlay(&mut self, color: Rgb, alpha: u8);

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgb, alpha: u8);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: u8);

    /// Convex polygon, vertices in winding order
    fn fill_polygon(&mut self, points: &[Vec2], color: Rgb, alpha: u8);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        color: Rgb,
    },
    Overlay {
        color: Rgb,
        alpha: u8,
    },
    Rect {
        origin: Vec2,
        size: Vec2,
        color: Rgb,
        alpha: u8,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgb,
        alpha: u8,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Rgb,
        alpha: u8,
    },
}

/// Surface that records commands for one frame
#[derive(Debug, Clone)]
pub struct DrawList {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Change reported dimensions (width and height together)
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop recorded commands, keeping the allocation for the next frame
    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl RenderSurface for DrawList {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgb) {
        // Everything before a clear is invisible
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color });
    }

    fn overlay(&mut self, color: Rgb, alpha: u8) {
        self.commands.push(DrawCommand::Overlay { color, alpha });
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Rgb, alpha: u8) {
        self.commands.push(DrawCommand::Rect {
            origin,
            size,
            color,
            alpha,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: u8) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            alpha,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgb, alpha: u8) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
            alpha,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_discards_earlier_commands() {
        let mut list = DrawList::new(10, 10);
        list.fill_circle(Vec2::ZERO, 1.0, Rgb::WHITE, 255);
        list.clear(Rgb::BLACK);
        assert_eq!(list.commands(), &[DrawCommand::Clear { color: Rgb::BLACK }]);
    }

    #[test]
    fn test_resize_updates_both_dimensions() {
        let mut list = DrawList::new(800, 600);
        list.resize(1024, 768);
        assert_eq!(list.dimensions(), (1024, 768));
    }
}
