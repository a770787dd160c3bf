//! Shape modes and their per-slot geometry.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;

use super::Rgb;
use crate::error::InputError;
use crate::surface::RenderSurface;

/// How each slot of the smoothed vector is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeMode {
    /// Mirrored vertical bars
    #[default]
    Bars,
    /// Circle pair above and below center
    Circles,
    /// Diamond pair spanning from center to the slot height
    Diamonds,
    /// Octagon pair above and below center
    Octagons,
}

impl ShapeMode {
    pub const ALL: [ShapeMode; 4] = [
        ShapeMode::Bars,
        ShapeMode::Circles,
        ShapeMode::Diamonds,
        ShapeMode::Octagons,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeMode::Bars => "bars",
            ShapeMode::Circles => "circles",
            ShapeMode::Diamonds => "diamonds",
            ShapeMode::Octagons => "octagons",
        }
    }

    /// Following mode, wrapping after octagons
    pub fn next(self) -> ShapeMode {
        let idx = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Emit the mirrored geometry for one slot
    pub fn draw_slot<S: RenderSurface + ?Sized>(self, surface: &mut S, slot: &Slot, color: Rgb) {
        let cx = slot.x + slot.width / 2.0;
        let cy = slot.center_y;
        let h = slot.height;
        let half_w = slot.width / 2.0;

        match self {
            ShapeMode::Bars => {
                let size = Vec2::new(slot.width, h);
                surface.fill_rect(Vec2::new(slot.x, cy - h), size, color, 255);
                surface.fill_rect(Vec2::new(slot.x, cy), size, color, 255);
            }
            ShapeMode::Circles => {
                surface.fill_circle(Vec2::new(cx, cy - h), half_w, color, 255);
                surface.fill_circle(Vec2::new(cx, cy + h), half_w, color, 255);
            }
            ShapeMode::Diamonds => {
                for dir in [-1.0, 1.0] {
                    let points = [
                        Vec2::new(cx, cy + dir * h),
                        Vec2::new(cx + half_w, cy + dir * h / 2.0),
                        Vec2::new(cx, cy),
                        Vec2::new(cx - half_w, cy + dir * h / 2.0),
                    ];
                    surface.fill_polygon(&points, color, 255);
                }
            }
            ShapeMode::Octagons => {
                for dir in [-1.0, 1.0] {
                    let points = octagon(Vec2::new(cx, cy + dir * h), half_w);
                    surface.fill_polygon(&points, color, 255);
                }
            }
        }
    }
}

/// Regular octagon with flat top, vertices counter-clockwise
fn octagon(center: Vec2, radius: f32) -> [Vec2; 8] {
    let mut points = [Vec2::ZERO; 8];
    for (i, p) in points.iter_mut().enumerate() {
        let angle = std::f32::consts::FRAC_PI_8 + i as f32 * std::f32::consts::FRAC_PI_4;
        *p = center + Vec2::new(angle.cos(), angle.sin()) * radius;
    }
    points
}

/// Layout of one slot in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Left edge
    pub x: f32,
    /// Drawn width (slot width minus gap)
    pub width: f32,
    /// Vertical center of the viewport
    pub center_y: f32,
    /// Extent above (and below) center
    pub height: f32,
}

impl FromStr for ShapeMode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bars" | "bar" => Ok(ShapeMode::Bars),
            "circles" | "circle" => Ok(ShapeMode::Circles),
            "diamonds" | "diamond" => Ok(ShapeMode::Diamonds),
            "octagons" | "octagon" => Ok(ShapeMode::Octagons),
            _ => Err(InputError::UnknownShape(s.to_string())),
        }
    }
}

impl fmt::Display for ShapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
