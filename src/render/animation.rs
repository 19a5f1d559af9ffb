//! Display options for one render call.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use super::color::ColorSource;

/// Default delay per unit of animation progress
pub const DEFAULT_SPEED: Duration = Duration::from_millis(50);

/// Render modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Animation {
    #[default]
    Static,
    Typewriter,
    FadeIn,
    SlideIn,
    Matrix,
    Pulse,
    Wave,
}

impl Animation {
    /// Every animated mode (excludes `Static`)
    pub const ANIMATED: [Animation; 6] = [
        Animation::Typewriter,
        Animation::FadeIn,
        Animation::SlideIn,
        Animation::Matrix,
        Animation::Pulse,
        Animation::Wave,
    ];

    /// Parse a name, falling back to static display with a warning
    pub fn resolve(name: &str) -> Animation {
        name.parse().unwrap_or_else(|e: anyhow::Error| {
            warn!("{}; showing static art", e);
            Animation::Static
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Animation::Static => "static",
            Animation::Typewriter => "typewriter",
            Animation::FadeIn => "fade",
            Animation::SlideIn => "slide",
            Animation::Matrix => "matrix",
            Animation::Pulse => "pulse",
            Animation::Wave => "wave",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Animation::Static => "Print the art once",
            Animation::Typewriter => "Type the art one character at a time",
            Animation::FadeIn => "Reveal the art column by column while brightening",
            Animation::SlideIn => "Slide the art in from an edge",
            Animation::Matrix => "Digital rain, then the art",
            Animation::Pulse => "Cycle the whole art through a palette",
            Animation::Wave => "Ripple the lines sideways",
        }
    }

    pub fn is_animated(self) -> bool {
        self != Animation::Static
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Animation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "static" | "none" => Ok(Animation::Static),
            "typewriter" | "type" => Ok(Animation::Typewriter),
            "fade" | "fadein" | "fade-in" => Ok(Animation::FadeIn),
            "slide" | "slidein" | "slide-in" => Ok(Animation::SlideIn),
            "matrix" | "rain" => Ok(Animation::Matrix),
            "pulse" => Ok(Animation::Pulse),
            "wave" => Ok(Animation::Wave),
            _ => anyhow::bail!("Unknown animation: {}", s),
        }
    }
}

/// Edge a slide-in enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideDirection {
    Left,
    #[default]
    Right,
    Top,
    Bottom,
}

impl SlideDirection {
    /// Parse a name, falling back to `Right` with a warning
    pub fn resolve(name: &str) -> SlideDirection {
        name.parse().unwrap_or_else(|e: anyhow::Error| {
            warn!("{}; sliding from the right", e);
            SlideDirection::Right
        })
    }
}

impl FromStr for SlideDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(SlideDirection::Left),
            "right" => Ok(SlideDirection::Right),
            "top" | "up" => Ok(SlideDirection::Top),
            "bottom" | "down" => Ok(SlideDirection::Bottom),
            _ => anyhow::bail!("Unknown slide direction: {}", s),
        }
    }
}

/// Mode-specific knobs
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationParams {
    /// Slide-in entry edge
    pub direction: SlideDirection,

    /// Fade-in steps (default: 10)
    pub steps: usize,

    /// Wave frames per cycle (default: 20)
    pub frames: usize,

    /// Pulse/wave repetitions (default: 3 / 2)
    pub cycles: Option<usize>,

    /// Matrix rain length (default: 2s)
    pub duration: Duration,

    /// Typewriter pause between lines (default: 4x speed)
    pub line_delay: Option<Duration>,

    /// Pulse hold per color (default: 6x speed)
    pub hold: Option<Duration>,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            direction: SlideDirection::default(),
            steps: 10,
            frames: 20,
            cycles: None,
            duration: Duration::from_secs(2),
            line_delay: None,
            hold: None,
        }
    }
}

/// Everything the engine needs to display one piece of art
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub colors: ColorSource,
    pub animation: Animation,

    /// Delay per unit of progress (character, step or frame)
    pub speed: Duration,

    pub params: AnimationParams,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: ColorSource::default(),
            animation: Animation::Static,
            speed: DEFAULT_SPEED,
            params: AnimationParams::default(),
        }
    }
}

impl DisplayConfig {
    pub fn new(colors: ColorSource, animation: Animation) -> Self {
        Self {
            colors,
            animation,
            ..Default::default()
        }
    }

    /// Set the speed; zero is bumped to 1ms
    pub fn with_speed(mut self, speed: Duration) -> Self {
        self.speed = speed.max(Duration::from_millis(1));
        self
    }

    pub fn with_params(mut self, params: AnimationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_direction(mut self, direction: SlideDirection) -> Self {
        self.params.direction = direction;
        self
    }

    pub(crate) fn line_delay(&self) -> Duration {
        self.params.line_delay.unwrap_or(self.speed * 4)
    }

    pub(crate) fn hold(&self) -> Duration {
        self.params.hold.unwrap_or(self.speed * 6)
    }

    pub(crate) fn pulse_cycles(&self) -> usize {
        self.params.cycles.unwrap_or(3)
    }

    pub(crate) fn wave_cycles(&self) -> usize {
        self.params.cycles.unwrap_or(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_names_roundtrip() {
        for animation in Animation::ANIMATED {
            assert_eq!(animation.name().parse::<Animation>().unwrap(), animation);
        }
        assert_eq!("fade-in".parse::<Animation>().unwrap(), Animation::FadeIn);
    }

    #[test]
    fn test_unknown_animation_falls_back_to_static() {
        assert!("spin".parse::<Animation>().is_err());
        assert_eq!(Animation::resolve("spin"), Animation::Static);
    }

    #[test]
    fn test_direction_fallback() {
        assert_eq!(SlideDirection::resolve("up"), SlideDirection::Top);
        assert_eq!(SlideDirection::resolve("diagonal"), SlideDirection::Right);
    }

    #[test]
    fn test_derived_delays() {
        let config = DisplayConfig::default().with_speed(Duration::from_millis(10));

        assert_eq!(config.line_delay(), Duration::from_millis(40));
        assert_eq!(config.hold(), Duration::from_millis(60));
        assert_eq!(config.pulse_cycles(), 3);
        assert_eq!(config.wave_cycles(), 2);
    }

    #[test]
    fn test_zero_speed_is_bumped() {
        let config = DisplayConfig::default().with_speed(Duration::ZERO);
        assert_eq!(config.speed, Duration::from_millis(1));
    }
}
