//! Terminal output sink, capability detection and scoped cursor control.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::tty::IsTty;
use crossterm::Command;

use super::color::ArtColor;

/// Rows assumed when the terminal size is unknown
pub const FALLBACK_ROWS: u16 = 40;

/// Color depth the output target can display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    Truecolor,
    Basic,
    None,
}

/// What the output target supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Output is an interactive terminal
    pub interactive: bool,

    /// ANSI escape sequences (clear, cursor moves, colors) are understood
    pub ansi: bool,

    pub color: ColorSupport,
}

impl Capabilities {
    /// Full-featured terminal
    pub fn truecolor() -> Self {
        Self {
            interactive: true,
            ansi: true,
            color: ColorSupport::Truecolor,
        }
    }

    /// Pipe or file: no escapes at all
    pub fn plain() -> Self {
        Self {
            interactive: false,
            ansi: false,
            color: ColorSupport::None,
        }
    }
}

/// Where the render engine writes
pub trait TerminalSink: Write + Send {
    fn capabilities(&self) -> Capabilities;

    /// `(columns, rows)` when known
    fn size(&self) -> Option<(u16, u16)>;
}

/// Inspect the environment to decide what the output supports.
///
/// `env` looks up an environment variable; `is_tty` says whether the output
/// stream is a terminal.
pub fn detect_capabilities(
    is_tty: bool,
    is_windows: bool,
    env: impl Fn(&str) -> Option<String>,
) -> Capabilities {
    let set = |name: &str| env(name).map_or(false, |v| !v.is_empty() && v != "0");
    let term = env("TERM").unwrap_or_default();
    let forced = set("FORCE_COLOR") || set("CLICOLOR_FORCE");

    let interactive = is_tty;
    let modern_windows_host = env("WT_SESSION").is_some()
        || env("TERM_PROGRAM").is_some()
        || env("ConEmuANSI").as_deref() == Some("ON")
        || env("ANSICON").is_some()
        || !term.is_empty();

    let ansi = (interactive || forced)
        && term != "dumb"
        && (!is_windows || modern_windows_host);

    let color = if !ansi || env("NO_COLOR").map_or(false, |v| !v.is_empty()) {
        ColorSupport::None
    } else if matches!(
        env("COLORTERM").as_deref(),
        Some("truecolor") | Some("24bit")
    ) || matches!(
        env("TERM_PROGRAM").as_deref(),
        Some("iTerm.app") | Some("WezTerm") | Some("vscode")
    ) || env("WT_SESSION").is_some()
    {
        ColorSupport::Truecolor
    } else if is_ansi_term(&term) || set("CLICOLOR") || forced || is_windows {
        ColorSupport::Basic
    } else {
        ColorSupport::None
    };

    Capabilities {
        interactive,
        ansi,
        color,
    }
}

fn is_ansi_term(term: &str) -> bool {
    term.starts_with("screen")
        || term.starts_with("xterm")
        || term.starts_with("vt100")
        || term.starts_with("vt220")
        || term.starts_with("rxvt")
        || term.starts_with("tmux")
        || term.contains("color")
        || term.contains("ansi")
        || term.contains("cygwin")
        || term.contains("linux")
}

/// Process stdout
pub struct StdoutTerminal {
    out: io::Stdout,
    capabilities: Capabilities,
}

impl StdoutTerminal {
    /// Wrap stdout, detecting capabilities from the environment
    pub fn new() -> Self {
        let out = io::stdout();
        let capabilities =
            detect_capabilities(out.is_tty(), cfg!(windows), |name| std::env::var(name).ok());
        Self { out, capabilities }
    }

    /// Wrap stdout with explicit capabilities
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            out: io::stdout(),
            capabilities,
        }
    }
}

impl Default for StdoutTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StdoutTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl TerminalSink for StdoutTerminal {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn size(&self) -> Option<(u16, u16)> {
        crossterm::terminal::size().ok()
    }
}

/// In-memory sink that records every byte written
#[derive(Debug, Clone)]
pub struct MemoryTerminal {
    buffer: Vec<u8>,
    capabilities: Capabilities,
    size: Option<(u16, u16)>,
}

impl MemoryTerminal {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            buffer: Vec::new(),
            capabilities,
            size: Some((80, 24)),
        }
    }

    pub fn with_size(mut self, size: Option<(u16, u16)>) -> Self {
        self.size = size;
        self
    }

    /// Everything written so far, lossily decoded
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Drain the buffer
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }
}

impl Write for MemoryTerminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl TerminalSink for MemoryTerminal {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn size(&self) -> Option<(u16, u16)> {
        self.size
    }
}

/// ANSI text of a crossterm command
pub fn ansi(command: impl Command) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = command.write_ansi(&mut out);
    out
}

/// Exclusive use of a sink for one render.
///
/// Hides the cursor on creation (when ANSI is supported) and shows it
/// again when dropped, whichever way the render ends.
pub struct TerminalSession<'a, T: TerminalSink + ?Sized> {
    sink: &'a mut T,
    capabilities: Capabilities,
    rows: u16,
    cursor_hidden: bool,
}

impl<'a, T: TerminalSink + ?Sized> TerminalSession<'a, T> {
    /// Start a session without touching the cursor
    pub fn open(sink: &'a mut T) -> Self {
        let capabilities = sink.capabilities();
        let rows = sink.size().map(|(_, rows)| rows).unwrap_or(FALLBACK_ROWS);
        Self {
            sink,
            capabilities,
            rows,
            cursor_hidden: false,
        }
    }

    /// Start a session with the cursor hidden
    pub fn hidden_cursor(sink: &'a mut T) -> io::Result<Self> {
        let mut session = Self::open(sink);
        if session.capabilities.ansi {
            session.cursor_hidden = true;
            session.sink.write_all(ansi(Hide).as_bytes())?;
            session.sink.flush()?;
        }
        Ok(session)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Clear the screen and home the cursor; newline flood without ANSI
    pub fn clear(&mut self) -> io::Result<()> {
        if self.capabilities.ansi {
            let mut seq = ansi(Clear(ClearType::All));
            seq.push_str(&ansi(MoveTo(0, 0)));
            self.sink.write_all(seq.as_bytes())
        } else {
            self.sink
                .write_all("\n".repeat(usize::from(self.rows)).as_bytes())
        }
    }

    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.sink.write_all(text.as_bytes())
    }

    fn foreground(&self, color: ArtColor) -> Option<Color> {
        match self.capabilities.color {
            ColorSupport::None => None,
            ColorSupport::Basic => Some(color.basic()),
            ColorSupport::Truecolor => {
                let (r, g, b) = color.rgb();
                Some(Color::Rgb { r, g, b })
            }
        }
    }

    /// `text` wrapped in a foreground color (plain when colors are off)
    pub fn paint(&self, text: &str, color: ArtColor) -> String {
        match self.foreground(color) {
            Some(fg) => self.paint_raw(text, fg),
            None => text.to_string(),
        }
    }

    /// Switch the foreground color for text written next
    pub fn set_color(&mut self, color: ArtColor) -> io::Result<()> {
        match self.foreground(color) {
            Some(fg) => self.write_str(&ansi(SetForegroundColor(fg))),
            None => Ok(()),
        }
    }

    pub fn reset_color(&mut self) -> io::Result<()> {
        if self.capabilities.color == ColorSupport::None {
            return Ok(());
        }
        self.write_str(&ansi(ResetColor))
    }

    /// `text` at `brightness` (0.0-1.0); flat basic color without truecolor
    pub fn paint_dimmed(&self, text: &str, color: ArtColor, brightness: f64) -> String {
        match self.capabilities.color {
            ColorSupport::Truecolor => self.paint_raw(text, color.scaled(brightness)),
            _ => self.paint(text, color),
        }
    }

    fn paint_raw(&self, text: &str, fg: Color) -> String {
        if text.is_empty() {
            return String::new();
        }
        format!("{}{}{}", ansi(SetForegroundColor(fg)), text, ansi(ResetColor))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl<T: TerminalSink + ?Sized> Drop for TerminalSession<'_, T> {
    fn drop(&mut self) {
        if self.cursor_hidden {
            let _ = self.sink.write_all(ansi(Show).as_bytes());
            let _ = self.sink.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_truecolor_terminal() {
        let caps = detect_capabilities(
            true,
            false,
            env_of(&[("TERM", "xterm-256color"), ("COLORTERM", "truecolor")]),
        );
        assert_eq!(caps, Capabilities::truecolor());
    }

    #[test]
    fn test_basic_color_terminal() {
        let caps = detect_capabilities(true, false, env_of(&[("TERM", "xterm")]));
        assert!(caps.ansi);
        assert_eq!(caps.color, ColorSupport::Basic);
    }

    #[test]
    fn test_pipe_is_plain() {
        let caps = detect_capabilities(false, false, env_of(&[("TERM", "xterm")]));
        assert_eq!(caps, Capabilities::plain());
    }

    #[test]
    fn test_no_color_keeps_cursor_control() {
        let caps = detect_capabilities(
            true,
            false,
            env_of(&[("TERM", "xterm"), ("NO_COLOR", "1")]),
        );
        assert!(caps.ansi);
        assert_eq!(caps.color, ColorSupport::None);
    }

    #[test]
    fn test_dumb_terminal() {
        let caps = detect_capabilities(true, false, env_of(&[("TERM", "dumb")]));
        assert!(!caps.ansi);
        assert_eq!(caps.color, ColorSupport::None);
    }

    #[test]
    fn test_legacy_windows_console() {
        let caps = detect_capabilities(true, true, env_of(&[]));
        assert!(caps.interactive);
        assert!(!caps.ansi);

        let modern = detect_capabilities(true, true, env_of(&[("WT_SESSION", "abc")]));
        assert!(modern.ansi);
        assert_eq!(modern.color, ColorSupport::Truecolor);
    }

    #[test]
    fn test_session_restores_cursor_on_drop() {
        let mut sink = MemoryTerminal::new(Capabilities::truecolor());
        {
            let mut session = TerminalSession::hidden_cursor(&mut sink).unwrap();
            session.write_str("hi").unwrap();
        }

        let out = sink.output();
        assert!(out.starts_with(&ansi(Hide)));
        assert!(out.ends_with(&ansi(Show)));
    }

    #[test]
    fn test_plain_session_emits_no_escapes() {
        let mut sink = MemoryTerminal::new(Capabilities::plain()).with_size(Some((80, 3)));
        {
            let mut session = TerminalSession::hidden_cursor(&mut sink).unwrap();
            session.clear().unwrap();
            let painted = session.paint("x", ArtColor::Red);
            session.write_str(&painted).unwrap();
        }

        assert_eq!(sink.output(), "\n\n\nx");
    }
}
