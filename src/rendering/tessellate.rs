//! Turns recorded draw commands into GPU triangles.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::surface::DrawCommand;
use crate::visualizer::Rgb;

/// Segments used to approximate a circle
const CIRCLE_SEGMENTS: usize = 24;

/// Vertex data for 2D shapes (clip-space position + RGBA color)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Triangles for one frame
#[derive(Debug, Default)]
pub struct Tessellation {
    /// Clear color if the frame starts from scratch; `None` keeps the previous frame
    pub clear: Option<Rgb>,
    pub vertices: Vec<Vertex>,
}

/// Pixel → clip space mapping for a viewport
struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    #[inline]
    fn to_ndc(&self, p: Vec2) -> [f32; 2] {
        [(p.x / self.width) * 2.0 - 1.0, 1.0 - (p.y / self.height) * 2.0]
    }

    fn push_triangle(&self, out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
        for p in [a, b, c] {
            out.push(Vertex {
                position: self.to_ndc(p),
                color,
            });
        }
    }

    /// Fan triangulation, valid for convex polygons
    fn push_fan(&self, out: &mut Vec<Vertex>, points: &[Vec2], color: [f32; 4]) {
        if points.len() < 3 {
            return;
        }
        for pair in points[1..].windows(2) {
            self.push_triangle(out, points[0], pair[0], pair[1], color);
        }
    }

    fn push_rect(&self, out: &mut Vec<Vertex>, origin: Vec2, size: Vec2, color: [f32; 4]) {
        let corners = [
            origin,
            origin + Vec2::new(size.x, 0.0),
            origin + size,
            origin + Vec2::new(0.0, size.y),
        ];
        self.push_fan(out, &corners, color);
    }
}

/// Tessellate a frame's commands for a `width` × `height` viewport
pub fn tessellate(commands: &[DrawCommand], width: u32, height: u32) -> Tessellation {
    let viewport = Viewport {
        width: width.max(1) as f32,
        height: height.max(1) as f32,
    };
    let mut frame = Tessellation::default();

    for command in commands {
        match command {
            DrawCommand::Clear { color } => {
                // Anything recorded before a clear is invisible
                frame.clear = Some(*color);
                frame.vertices.clear();
            }
            DrawCommand::Overlay { color, alpha } => {
                let full = Vec2::new(viewport.width, viewport.height);
                viewport.push_rect(
                    &mut frame.vertices,
                    Vec2::ZERO,
                    full,
                    color.to_rgba_f32(*alpha),
                );
            }
            DrawCommand::Rect {
                origin,
                size,
                color,
                alpha,
            } => {
                if size.x > 0.0 && size.y > 0.0 {
                    viewport.push_rect(&mut frame.vertices, *origin, *size, color.to_rgba_f32(*alpha));
                }
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
                alpha,
            } => {
                if *radius > 0.0 {
                    let points: Vec<Vec2> = (0..CIRCLE_SEGMENTS)
                        .map(|i| {
                            let angle = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
                            *center + Vec2::new(angle.cos(), angle.sin()) * *radius
                        })
                        .collect();
                    viewport.push_fan(&mut frame.vertices, &points, color.to_rgba_f32(*alpha));
                }
            }
            DrawCommand::Polygon {
                points,
                color,
                alpha,
            } => {
                viewport.push_fan(&mut frame.vertices, points, color.to_rgba_f32(*alpha));
            }
        }
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_maps_to_clip_space() {
        let commands = [DrawCommand::Rect {
            origin: Vec2::ZERO,
            size: Vec2::new(100.0, 50.0),
            color: Rgb::WHITE,
            alpha: 255,
        }];
        let frame = tessellate(&commands, 100, 100);
        assert_eq!(frame.clear, None);
        assert_eq!(frame.vertices.len(), 6);

        // Top-left pixel corner is (-1, 1); bottom edge of the rect is y = 0
        assert_eq!(frame.vertices[0].position, [-1.0, 1.0]);
        assert!(frame.vertices.iter().all(|v| v.position[1] >= 0.0));
        assert_eq!(frame.vertices[0].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_circle_and_polygon_triangle_counts() {
        let commands = [
            DrawCommand::Circle {
                center: Vec2::new(50.0, 50.0),
                radius: 5.0,
                color: Rgb::WHITE,
                alpha: 128,
            },
            DrawCommand::Polygon {
                points: vec![
                    Vec2::new(0.0, 0.0),
                    Vec2::new(10.0, 0.0),
                    Vec2::new(10.0, 10.0),
                    Vec2::new(0.0, 10.0),
                ],
                color: Rgb::WHITE,
                alpha: 255,
            },
        ];
        let frame = tessellate(&commands, 100, 100);
        assert_eq!(frame.vertices.len(), (CIRCLE_SEGMENTS - 2) * 3 + 2 * 3);
        assert!((frame.vertices[0].color[3] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_clear_and_overlay() {
        let commands = [
            DrawCommand::Clear { color: Rgb::BLACK },
            DrawCommand::Overlay {
                color: Rgb::BLACK,
                alpha: 40,
            },
        ];
        let frame = tessellate(&commands, 640, 480);
        assert_eq!(frame.clear, Some(Rgb::BLACK));
        assert_eq!(frame.vertices.len(), 6);

        let frame = tessellate(&commands[1..], 640, 480);
        assert_eq!(frame.clear, None);
    }

    #[test]
    fn test_degenerate_shapes_are_skipped() {
        let commands = [
            DrawCommand::Rect {
                origin: Vec2::ZERO,
                size: Vec2::new(10.0, 0.0),
                color: Rgb::WHITE,
                alpha: 255,
            },
            DrawCommand::Polygon {
                points: vec![Vec2::ZERO, Vec2::ONE],
                color: Rgb::WHITE,
                alpha: 255,
            },
        ];
        assert!(tessellate(&commands, 10, 10).vertices.is_empty());
    }
}
