//! Named colors and color schemes.
//!
//! Names are parsed into a closed set of variants; an unknown name is an
//! [`UnknownColor`] error at the parsing boundary, resolved to a default
//! with a warning by [`ArtColor::resolve`].

use std::fmt;
use std::str::FromStr;

use crossterm::style::Color;
use thiserror::Error;
use tracing::warn;

/// Color used when a name cannot be resolved
pub const DEFAULT_COLOR: ArtColor = ArtColor::White;

/// Scheme used when a scheme name cannot be resolved
pub const DEFAULT_SCHEME: ColorScheme = ColorScheme::Rainbow;

/// A color name that is not in [`ArtColor::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown color: {0}")]
pub struct UnknownColor(pub String);

/// A color scheme name that is not in [`ColorScheme::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown color scheme: {0}")]
pub struct UnknownScheme(pub String);

/// Supported foreground colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    Orange,
    Pink,
    Purple,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
}

impl ArtColor {
    pub const ALL: [ArtColor; 18] = [
        ArtColor::Black,
        ArtColor::Red,
        ArtColor::Green,
        ArtColor::Yellow,
        ArtColor::Blue,
        ArtColor::Magenta,
        ArtColor::Cyan,
        ArtColor::White,
        ArtColor::Gray,
        ArtColor::Orange,
        ArtColor::Pink,
        ArtColor::Purple,
        ArtColor::BrightRed,
        ArtColor::BrightGreen,
        ArtColor::BrightYellow,
        ArtColor::BrightBlue,
        ArtColor::BrightMagenta,
        ArtColor::BrightCyan,
    ];

    /// Parse a name, falling back to [`DEFAULT_COLOR`] with a warning
    pub fn resolve(name: &str) -> ArtColor {
        name.parse().unwrap_or_else(|e: UnknownColor| {
            warn!("{}; using {}", e, DEFAULT_COLOR);
            DEFAULT_COLOR
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ArtColor::Black => "black",
            ArtColor::Red => "red",
            ArtColor::Green => "green",
            ArtColor::Yellow => "yellow",
            ArtColor::Blue => "blue",
            ArtColor::Magenta => "magenta",
            ArtColor::Cyan => "cyan",
            ArtColor::White => "white",
            ArtColor::Gray => "gray",
            ArtColor::Orange => "orange",
            ArtColor::Pink => "pink",
            ArtColor::Purple => "purple",
            ArtColor::BrightRed => "bright-red",
            ArtColor::BrightGreen => "bright-green",
            ArtColor::BrightYellow => "bright-yellow",
            ArtColor::BrightBlue => "bright-blue",
            ArtColor::BrightMagenta => "bright-magenta",
            ArtColor::BrightCyan => "bright-cyan",
        }
    }

    /// 24-bit value
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            ArtColor::Black => (0, 0, 0),
            ArtColor::Red => (205, 49, 49),
            ArtColor::Green => (13, 188, 121),
            ArtColor::Yellow => (229, 229, 16),
            ArtColor::Blue => (36, 114, 200),
            ArtColor::Magenta => (188, 63, 188),
            ArtColor::Cyan => (17, 168, 205),
            ArtColor::White => (229, 229, 229),
            ArtColor::Gray => (128, 128, 128),
            ArtColor::Orange => (255, 165, 0),
            ArtColor::Pink => (255, 105, 180),
            ArtColor::Purple => (148, 0, 211),
            ArtColor::BrightRed => (241, 76, 76),
            ArtColor::BrightGreen => (35, 209, 139),
            ArtColor::BrightYellow => (245, 245, 67),
            ArtColor::BrightBlue => (59, 142, 234),
            ArtColor::BrightMagenta => (214, 112, 214),
            ArtColor::BrightCyan => (41, 184, 219),
        }
    }

    /// Nearest 16-color terminal equivalent
    pub fn basic(self) -> Color {
        match self {
            ArtColor::Black => Color::Black,
            ArtColor::Red => Color::DarkRed,
            ArtColor::Green => Color::DarkGreen,
            ArtColor::Yellow => Color::DarkYellow,
            ArtColor::Blue => Color::DarkBlue,
            ArtColor::Magenta => Color::DarkMagenta,
            ArtColor::Cyan => Color::DarkCyan,
            ArtColor::White => Color::White,
            ArtColor::Gray => Color::Grey,
            ArtColor::Orange => Color::Yellow,
            ArtColor::Pink => Color::Magenta,
            ArtColor::Purple => Color::DarkMagenta,
            ArtColor::BrightRed => Color::Red,
            ArtColor::BrightGreen => Color::Green,
            ArtColor::BrightYellow => Color::Yellow,
            ArtColor::BrightBlue => Color::Blue,
            ArtColor::BrightMagenta => Color::Magenta,
            ArtColor::BrightCyan => Color::Cyan,
        }
    }

    /// 24-bit color scaled by `brightness` (clamped to 0.0..=1.0)
    pub fn scaled(self, brightness: f64) -> Color {
        let factor = brightness.clamp(0.0, 1.0);
        let (r, g, b) = self.rgb();
        let scale = |c: u8| (f64::from(c) * factor).round() as u8;
        Color::Rgb {
            r: scale(r),
            g: scale(g),
            b: scale(b),
        }
    }
}

impl fmt::Display for ArtColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ArtColor {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "black" => Ok(ArtColor::Black),
            "red" => Ok(ArtColor::Red),
            "green" => Ok(ArtColor::Green),
            "yellow" => Ok(ArtColor::Yellow),
            "blue" => Ok(ArtColor::Blue),
            "magenta" => Ok(ArtColor::Magenta),
            "cyan" => Ok(ArtColor::Cyan),
            "white" => Ok(ArtColor::White),
            "gray" | "grey" => Ok(ArtColor::Gray),
            "orange" => Ok(ArtColor::Orange),
            "pink" => Ok(ArtColor::Pink),
            "purple" | "violet" => Ok(ArtColor::Purple),
            "bright-red" | "redbright" => Ok(ArtColor::BrightRed),
            "bright-green" | "greenbright" => Ok(ArtColor::BrightGreen),
            "bright-yellow" | "yellowbright" => Ok(ArtColor::BrightYellow),
            "bright-blue" | "bluebright" => Ok(ArtColor::BrightBlue),
            "bright-magenta" | "magentabright" => Ok(ArtColor::BrightMagenta),
            "bright-cyan" | "cyanbright" => Ok(ArtColor::BrightCyan),
            _ => Err(UnknownColor(s.to_string())),
        }
    }
}

/// Named palettes for multi-color output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Rainbow,
    Fire,
    Ocean,
    Forest,
    Sunset,
    Neon,
    Mono,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 7] = [
        ColorScheme::Rainbow,
        ColorScheme::Fire,
        ColorScheme::Ocean,
        ColorScheme::Forest,
        ColorScheme::Sunset,
        ColorScheme::Neon,
        ColorScheme::Mono,
    ];

    /// Parse a name, falling back to [`DEFAULT_SCHEME`] with a warning
    pub fn resolve(name: &str) -> ColorScheme {
        name.parse().unwrap_or_else(|e: UnknownScheme| {
            warn!("{}; using {}", e, DEFAULT_SCHEME);
            DEFAULT_SCHEME
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorScheme::Rainbow => "rainbow",
            ColorScheme::Fire => "fire",
            ColorScheme::Ocean => "ocean",
            ColorScheme::Forest => "forest",
            ColorScheme::Sunset => "sunset",
            ColorScheme::Neon => "neon",
            ColorScheme::Mono => "mono",
        }
    }

    pub fn palette(self) -> Vec<ArtColor> {
        use ArtColor::*;
        match self {
            ColorScheme::Rainbow => vec![Red, Orange, Yellow, Green, Blue, Purple],
            ColorScheme::Fire => vec![BrightRed, Red, Orange, BrightYellow],
            ColorScheme::Ocean => vec![Blue, BrightBlue, Cyan, BrightCyan],
            ColorScheme::Forest => vec![Green, BrightGreen, Yellow],
            ColorScheme::Sunset => vec![Orange, Pink, Magenta, Purple],
            ColorScheme::Neon => vec![BrightMagenta, BrightCyan, BrightGreen, BrightYellow],
            ColorScheme::Mono => vec![White, Gray],
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ColorScheme {
    type Err = UnknownScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        ColorScheme::ALL
            .into_iter()
            .find(|scheme| scheme.name() == normalized)
            .or(match normalized.as_str() {
                "monochrome" => Some(ColorScheme::Mono),
                _ => None,
            })
            .ok_or_else(|| UnknownScheme(s.to_string()))
    }
}

/// Colors for one render: a single color or a cycled palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSource {
    Single(ArtColor),
    Palette(Vec<ArtColor>),
}

impl Default for ColorSource {
    fn default() -> Self {
        ColorSource::Single(DEFAULT_COLOR)
    }
}

impl ColorSource {
    /// Palette from a scheme
    pub fn scheme(scheme: ColorScheme) -> Self {
        ColorSource::Palette(scheme.palette())
    }

    /// Color for line `index` (palettes cycle round-robin)
    pub fn for_line(&self, index: usize) -> ArtColor {
        match self {
            ColorSource::Single(color) => *color,
            ColorSource::Palette(colors) if colors.is_empty() => DEFAULT_COLOR,
            ColorSource::Palette(colors) => colors[index % colors.len()],
        }
    }

    /// Leading color, used by single-color effects
    pub fn primary(&self) -> ArtColor {
        self.for_line(0)
    }

    /// Colors to cycle through (a single color yields one entry)
    pub fn cycle(&self) -> Vec<ArtColor> {
        match self {
            ColorSource::Single(color) => vec![*color],
            ColorSource::Palette(colors) if colors.is_empty() => vec![DEFAULT_COLOR],
            ColorSource::Palette(colors) => colors.clone(),
        }
    }

    pub fn is_palette(&self) -> bool {
        matches!(self, ColorSource::Palette(colors) if colors.len() > 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_colors() {
        assert_eq!("Cyan".parse::<ArtColor>(), Ok(ArtColor::Cyan));
        assert_eq!("grey".parse::<ArtColor>(), Ok(ArtColor::Gray));
        assert_eq!("bright_red".parse::<ArtColor>(), Ok(ArtColor::BrightRed));
        assert_eq!("redBright".parse::<ArtColor>(), Ok(ArtColor::BrightRed));
    }

    #[test]
    fn test_every_color_roundtrips_by_name() {
        for color in ArtColor::ALL {
            assert_eq!(color.name().parse::<ArtColor>(), Ok(color));
        }
    }

    #[test]
    fn test_unknown_color_resolves_to_default() {
        assert_eq!(
            "chartreuse".parse::<ArtColor>(),
            Err(UnknownColor("chartreuse".to_string()))
        );
        assert_eq!(ArtColor::resolve("chartreuse"), DEFAULT_COLOR);
    }

    #[test]
    fn test_scheme_resolution() {
        assert_eq!(ColorScheme::resolve("ocean"), ColorScheme::Ocean);
        assert_eq!(ColorScheme::resolve("monochrome"), ColorScheme::Mono);
        assert_eq!(ColorScheme::resolve("plaid"), DEFAULT_SCHEME);
    }

    #[test]
    fn test_palette_round_robin() {
        let source = ColorSource::Palette(vec![ArtColor::Red, ArtColor::Blue]);

        assert_eq!(source.for_line(0), ArtColor::Red);
        assert_eq!(source.for_line(1), ArtColor::Blue);
        assert_eq!(source.for_line(2), ArtColor::Red);
        assert!(source.is_palette());
        assert!(!ColorSource::Single(ArtColor::Red).is_palette());
    }

    #[test]
    fn test_scaled_brightness() {
        assert_eq!(
            ArtColor::White.scaled(0.0),
            Color::Rgb { r: 0, g: 0, b: 0 }
        );
        assert_eq!(
            ArtColor::Orange.scaled(1.0),
            Color::Rgb { r: 255, g: 165, b: 0 }
        );
        assert_eq!(
            ArtColor::Gray.scaled(0.5),
            Color::Rgb { r: 64, g: 64, b: 64 }
        );
    }
}
