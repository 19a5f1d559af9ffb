//! Render engine: turns art content and display options into terminal output.
//!
//! - color: Closed color and scheme names, RGB and basic mappings
//! - animation: Animation modes and per-call `DisplayConfig`
//! - frames: Pure frame builders (fade, slide, wave, matrix)
//! - terminal: Output sink, capability detection, cursor session
//! - engine: Static and animated rendering with a single-animation state machine

pub mod animation;
pub mod color;
pub mod engine;
pub mod frames;
pub mod terminal;

pub use animation::{Animation, AnimationParams, DisplayConfig, SlideDirection, DEFAULT_SPEED};
pub use color::{
    ArtColor, ColorScheme, ColorSource, UnknownColor, UnknownScheme, DEFAULT_COLOR, DEFAULT_SCHEME,
};
pub use engine::{AnimationState, AnimationToken, ConflictPolicy, RenderEngine, RenderError};
pub use frames::clip_width;
pub use terminal::{
    detect_capabilities, Capabilities, ColorSupport, MemoryTerminal, StdoutTerminal,
    TerminalSession, TerminalSink,
};
