//! Named color palettes.
//!
//! Each palette is a fixed, ordered list of colors that the generators
//! cycle through or sample from. Palettes are process-wide constants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` value.
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xff) as u8,
            g: ((packed >> 8) & 0xff) as u8,
            b: (packed & 0xff) as u8,
        }
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('#');
        if s.len() != 6 {
            return None;
        }
        let packed = u32::from_str_radix(s, 16).ok()?;
        Some(Self::from_u32(packed))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

const RAINBOW: &[Color] = &[
    Color::from_u32(0xff0000),
    Color::from_u32(0xff7f00),
    Color::from_u32(0xffff00),
    Color::from_u32(0x00ff00),
    Color::from_u32(0x0000ff),
    Color::from_u32(0x4b0082),
    Color::from_u32(0x9400d3),
];

const NEON: &[Color] = &[
    Color::from_u32(0xff006e),
    Color::from_u32(0xfb5607),
    Color::from_u32(0xffbe0b),
    Color::from_u32(0x8338ec),
    Color::from_u32(0x3a86ff),
];

const PASTEL: &[Color] = &[
    Color::from_u32(0xffc8dd),
    Color::from_u32(0xffafcc),
    Color::from_u32(0xbde0fe),
    Color::from_u32(0xa2d2ff),
    Color::from_u32(0xcdb4db),
];

const DARK: &[Color] = &[
    Color::from_u32(0x1a1a2e),
    Color::from_u32(0x16213e),
    Color::from_u32(0x0f3460),
    Color::from_u32(0x533483),
    Color::from_u32(0xe94560),
];

/// The palettes a piece can be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaletteKind {
    #[default]
    Rainbow,
    Neon,
    Pastel,
    Dark,
}

impl PaletteKind {
    pub const ALL: [PaletteKind; 4] = [
        PaletteKind::Rainbow,
        PaletteKind::Neon,
        PaletteKind::Pastel,
        PaletteKind::Dark,
    ];

    /// Resolve a palette by name.
    ///
    /// Matching ignores case and surrounding whitespace. Unknown names
    /// resolve to [`PaletteKind::Rainbow`] instead of failing.
    pub fn lookup(name: &str) -> Self {
        Self::find(name).unwrap_or_default()
    }

    /// Strict variant of [`PaletteKind::lookup`].
    pub fn find(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            PaletteKind::Rainbow => "Rainbow",
            PaletteKind::Neon => "Neon",
            PaletteKind::Pastel => "Pastel",
            PaletteKind::Dark => "Dark",
        }
    }

    /// The palette's colors, never empty.
    pub fn colors(self) -> &'static [Color] {
        match self {
            PaletteKind::Rainbow => RAINBOW,
            PaletteKind::Neon => NEON,
            PaletteKind::Pastel => PASTEL,
            PaletteKind::Dark => DARK,
        }
    }

    pub fn contains(self, color: Color) -> bool {
        self.colors().contains(&color)
    }

    /// Color at `index`, wrapping around the palette.
    pub fn cycle(self, index: usize) -> Color {
        let colors = self.colors();
        colors[index % colors.len()]
    }
}

impl fmt::Display for PaletteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
