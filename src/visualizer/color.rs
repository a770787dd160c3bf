//! Draw colors and the named palette accepted by the color setter.

use std::fmt;
use std::str::FromStr;

use crate::error::InputError;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalized RGBA for the GPU, alpha in 0..=255
    pub fn to_rgba_f32(self, alpha: u8) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha as f32 / 255.0,
        ]
    }
}

/// Colors selectable by name (and by key binding)
pub const PALETTE: [(&str, Rgb); 7] = [
    ("white", Rgb::WHITE),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
];

impl Rgb {
    /// Next palette entry after this color (first entry if not in the palette)
    pub fn next_in_palette(self) -> Rgb {
        let idx = PALETTE.iter().position(|(_, c)| *c == self);
        match idx {
            Some(i) => PALETTE[(i + 1) % PALETTE.len()].1,
            None => PALETTE[0].1,
        }
    }
}

/// Accepts palette names and `#rrggbb` hex
impl FromStr for Rgb {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        if let Some((_, color)) = PALETTE.iter().find(|(n, _)| *n == name) {
            return Ok(*color);
        }

        let hex = name
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| InputError::UnknownColor(s.to_string()))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| InputError::UnknownColor(s.to_string()))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match PALETTE.iter().find(|(_, c)| c == self) {
            Some((name, _)) => write!(f, "{}", name),
            None => write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b),
        }
    }
}
