//! Inputs to a single render.

use crate::palette::PaletteKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl ArtError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ArtError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Which drawing algorithm runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleKind {
    /// Concentric rings with dots around each ring
    Psychedelic,
    /// Translucent squares and circles scattered at random
    Abstract,
    /// One shape per grid cell
    Geometric,
    /// Neon grid on black with glowing squares
    Cyberpunk,
}

impl StyleKind {
    pub const ALL: [StyleKind; 4] = [
        StyleKind::Psychedelic,
        StyleKind::Abstract,
        StyleKind::Geometric,
        StyleKind::Cyberpunk,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StyleKind::Psychedelic => "Psychedelic",
            StyleKind::Abstract => "Abstract",
            StyleKind::Geometric => "Geometric",
            StyleKind::Cyberpunk => "Cyberpunk",
        }
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StyleKind {
    type Err = ArtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ArtError::invalid("style", "must not be empty"));
        }
        Self::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ArtError::invalid(
                    "style",
                    format!(
                        "unknown style {s:?}, expected one of Psychedelic, Abstract, Geometric, Cyberpunk"
                    ),
                )
            })
    }
}

/// Complexity level in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Complexity(u8);

impl Complexity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, ArtError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ArtError::invalid(
                "complexity",
                format!("{value} is outside {}..={}", Self::MIN, Self::MAX),
            ))
        }
    }

    /// Clamp any value into range instead of rejecting it.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> u32 {
        self.0 as u32
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Self(5)
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Complexity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Complexity::new(value).map_err(serde::de::Error::custom)
    }
}

/// Everything one render needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub style: StyleKind,
    pub palette: PaletteKind,
    pub complexity: Complexity,
}

impl GenerationRequest {
    pub fn new(style: StyleKind, palette: PaletteKind, complexity: Complexity) -> Self {
        Self {
            style,
            palette,
            complexity,
        }
    }

    /// Build a request from loosely typed input.
    ///
    /// `style` and `complexity` are validated; an unknown palette name
    /// resolves to the default palette.
    pub fn parse(style: &str, palette: &str, complexity: i64) -> Result<Self, ArtError> {
        Ok(Self {
            style: style.parse()?,
            palette: PaletteKind::lookup(palette),
            complexity: Complexity::new(complexity)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_parses_case_insensitively() {
        assert_eq!("psychedelic".parse::<StyleKind>(), Ok(StyleKind::Psychedelic));
        assert_eq!(" Cyberpunk ".parse::<StyleKind>(), Ok(StyleKind::Cyberpunk));
    }

    #[test]
    fn unknown_or_empty_style_is_rejected() {
        assert!(matches!(
            "Baroque".parse::<StyleKind>(),
            Err(ArtError::InvalidParameter { name: "style", .. })
        ));
        assert!("".parse::<StyleKind>().is_err());
    }

    #[test]
    fn complexity_bounds() {
        assert!(Complexity::new(0).is_err());
        assert!(Complexity::new(11).is_err());
        assert_eq!(Complexity::new(1).unwrap().get(), 1);
        assert_eq!(Complexity::new(10).unwrap().get(), 10);
        assert_eq!(Complexity::clamped(-3).get(), 1);
        assert_eq!(Complexity::clamped(42).get(), 10);
    }

    #[test]
    fn complexity_deserializes_with_validation() {
        let ok: Complexity = serde_json::from_str("7").unwrap();
        assert_eq!(ok.get(), 7);
        assert!(serde_json::from_str::<Complexity>("12").is_err());
    }

    #[test]
    fn parse_substitutes_default_palette() {
        let request = GenerationRequest::parse("Abstract", "Ultraviolet", 3).unwrap();
        assert_eq!(request.palette, PaletteKind::Rainbow);
        assert_eq!(request.style, StyleKind::Abstract);
    }
}
