//! Render engine: static display and the animated modes.
//!
//! One animation runs at a time. The engine tracks it with an explicit
//! state machine (`Idle -> Running(token) -> Idle`); a new render either
//! cancels the running one or fails fast, depending on [`ConflictPolicy`].
//! Every render borrows the sink through a [`TerminalSession`], so the
//! cursor is shown again however the render ends.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::animation::{Animation, DisplayConfig};
use super::color::{ArtColor, ColorSource, DEFAULT_SCHEME};
use super::frames;
use super::terminal::{TerminalSession, TerminalSink};

/// Color of the matrix rain
const RAIN_COLOR: ArtColor = ArtColor::BrightGreen;

/// Render failures
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Terminal write failed: {0}")]
    Io(#[from] io::Error),

    #[error("Animation {id} is still running")]
    Busy { id: Uuid },
}

/// What to do when a render starts while an animation is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Stop the running animation and wait for the terminal
    #[default]
    CancelPrevious,

    /// Refuse with [`RenderError::Busy`]
    FailFast,
}

/// Handle on one running render
#[derive(Debug, Clone)]
pub struct AnimationToken {
    id: Uuid,
    running: Arc<AtomicBool>,
}

impl AnimationToken {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the render loop to stop at its next iteration boundary
    pub fn cancel(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Engine state
#[derive(Debug, Clone, Default)]
pub enum AnimationState {
    #[default]
    Idle,
    Running(AnimationToken),
}

/// Resets the state to `Idle` when the render it belongs to ends
struct ActiveGuard<'a> {
    state: &'a Mutex<AnimationState>,
    id: Uuid,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if matches!(&*state, AnimationState::Running(token) if token.id == self.id) {
            *state = AnimationState::Idle;
        }
    }
}

fn lock(state: &Mutex<AnimationState>) -> MutexGuard<'_, AnimationState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Turns art content plus display options into terminal output
pub struct RenderEngine<T: TerminalSink> {
    sink: tokio::sync::Mutex<T>,
    state: Mutex<AnimationState>,
    policy: ConflictPolicy,
}

impl<T: TerminalSink> RenderEngine<T> {
    pub fn new(sink: T) -> Self {
        Self {
            sink: tokio::sync::Mutex::new(sink),
            state: Mutex::new(AnimationState::Idle),
            policy: ConflictPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Current state (a snapshot)
    pub fn state(&self) -> AnimationState {
        lock(&self.state).clone()
    }

    pub fn is_animating(&self) -> bool {
        matches!(*lock(&self.state), AnimationState::Running(_))
    }

    /// Stop the running animation, if any.
    ///
    /// Returns whether there was one to stop. The loop exits at its next
    /// iteration boundary and restores the cursor.
    pub fn stop_animation(&self) -> bool {
        match &*lock(&self.state) {
            AnimationState::Running(token) => {
                debug!(id = %token.id, "Stopping animation");
                token.cancel();
                true
            }
            AnimationState::Idle => false,
        }
    }

    /// Give back the sink
    pub fn into_sink(self) -> T {
        self.sink.into_inner()
    }

    /// Display `content` with `config`.
    ///
    /// Animated modes degrade to static output when the sink is not an
    /// interactive terminal.
    #[instrument(skip(self, content, config), fields(animation = %config.animation))]
    pub async fn render(&self, content: &str, config: &DisplayConfig) -> Result<(), RenderError> {
        let token = self.begin()?;
        let _active = ActiveGuard {
            state: &self.state,
            id: token.id,
        };

        let mut sink = self.sink.lock().await;
        let lines: Vec<&str> = content.lines().collect();

        if !config.animation.is_animated() || !sink.capabilities().interactive {
            let mut session = TerminalSession::open(&mut *sink);
            return Ok(draw_static(&mut session, &lines, &config.colors)?);
        }

        let mut session = TerminalSession::hidden_cursor(&mut *sink)?;
        let max_width = frames::max_width(&lines);

        match config.animation {
            Animation::Static => draw_static(&mut session, &lines, &config.colors)?,
            Animation::Typewriter => typewriter(&mut session, &token, &lines, config).await?,
            Animation::FadeIn => fade_in(&mut session, &token, &lines, max_width, config).await?,
            Animation::SlideIn => slide_in(&mut session, &token, &lines, max_width, config).await?,
            Animation::Matrix => matrix(&mut session, &token, &lines, max_width, config).await?,
            Animation::Pulse => pulse(&mut session, &token, &lines, config).await?,
            Animation::Wave => wave(&mut session, &token, &lines, config).await?,
        }

        if !token.is_running() {
            debug!(id = %token.id, "Animation stopped early");
        }
        Ok(())
    }

    /// `Idle -> Running`, applying the conflict policy
    fn begin(&self) -> Result<AnimationToken, RenderError> {
        let mut state = lock(&self.state);
        if let AnimationState::Running(current) = &*state {
            match self.policy {
                ConflictPolicy::FailFast => return Err(RenderError::Busy { id: current.id }),
                ConflictPolicy::CancelPrevious => {
                    debug!(id = %current.id, "Cancelling previous animation");
                    current.cancel();
                }
            }
        }

        let token = AnimationToken::new();
        *state = AnimationState::Running(token.clone());
        Ok(token)
    }
}

/// Write `lines` followed by newlines, line `i` in `color_of(i)` at `brightness`
fn draw<T, F>(
    session: &mut TerminalSession<'_, T>,
    lines: &[String],
    brightness: f64,
    color_of: F,
) -> io::Result<()>
where
    T: TerminalSink + ?Sized,
    F: Fn(usize) -> ArtColor,
{
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        out.push_str(&session.paint_dimmed(line, color_of(i), brightness));
        out.push('\n');
    }
    session.write_str(&out)?;
    session.flush()
}

/// Clear the screen and draw a frame at full brightness
fn redraw<T, F>(session: &mut TerminalSession<'_, T>, lines: &[String], color_of: F) -> io::Result<()>
where
    T: TerminalSink + ?Sized,
    F: Fn(usize) -> ArtColor,
{
    session.clear()?;
    draw(session, lines, 1.0, color_of)
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}

/// Whole block in one color, or a palette line by line
fn draw_static<T: TerminalSink + ?Sized>(
    session: &mut TerminalSession<'_, T>,
    lines: &[&str],
    colors: &ColorSource,
) -> io::Result<()> {
    if lines.is_empty() {
        return Ok(());
    }
    if colors.is_palette() {
        return draw(session, &owned(lines), 1.0, |i| colors.for_line(i));
    }

    let block = session.paint(&lines.join("\n"), colors.primary());
    session.write_str(&block)?;
    session.write_str("\n")?;
    session.flush()
}

async fn typewriter<T: TerminalSink + ?Sized>(
    session: &mut TerminalSession<'_, T>,
    token: &AnimationToken,
    lines: &[&str],
    config: &DisplayConfig,
) -> io::Result<()> {
    'lines: for (i, line) in lines.iter().enumerate() {
        if !token.is_running() {
            break;
        }
        session.set_color(config.colors.for_line(i))?;
        for ch in line.chars() {
            if !token.is_running() {
                session.reset_color()?;
                session.write_str("\n")?;
                break 'lines;
            }
            let mut buf = [0u8; 4];
            session.write_str(ch.encode_utf8(&mut buf))?;
            session.flush()?;
            if !ch.is_whitespace() {
                tokio::time::sleep(config.speed).await;
            }
        }
        session.reset_color()?;
        session.write_str("\n")?;
        session.flush()?;
        if i + 1 < lines.len() {
            pause(token, config.line_delay(), config.speed).await;
        }
    }
    session.flush()
}

/// Sleep for `total` in slices of at most `slice`, returning early once
/// the token is cancelled
async fn pause(token: &AnimationToken, total: Duration, slice: Duration) {
    let deadline = tokio::time::Instant::now() + total;
    loop {
        let now = tokio::time::Instant::now();
        if now >= deadline || !token.is_running() {
            return;
        }
        tokio::time::sleep(slice.min(deadline - now)).await;
    }
}

async fn fade_in<T: TerminalSink + ?Sized>(
    session: &mut TerminalSession<'_, T>,
    token: &AnimationToken,
    lines: &[&str],
    max_width: usize,
    config: &DisplayConfig,
) -> io::Result<()> {
    let steps = config.params.steps.max(1);
    for k in 1..=steps {
        if !token.is_running() {
            break;
        }
        let frame = frames::fade_frame(lines, max_width, k, steps);
        let brightness = frames::fade_brightness(k, steps);
        session.clear()?;
        draw(session, &frame, brightness, |i| config.colors.for_line(i))?;
        tokio::time::sleep(config.speed).await;
    }
    Ok(())
}

async fn slide_in<T: TerminalSink + ?Sized>(
    session: &mut TerminalSession<'_, T>,
    token: &AnimationToken,
    lines: &[&str],
    max_width: usize,
    config: &DisplayConfig,
) -> io::Result<()> {
    let direction = config.params.direction;
    let steps = frames::slide_steps(lines, max_width, direction);
    for step in 1..=steps {
        if !token.is_running() {
            break;
        }
        let frame = frames::slide_frame(lines, max_width, direction, step);
        redraw(session, &frame, |i| config.colors.for_line(i))?;
        tokio::time::sleep(config.speed).await;
    }
    Ok(())
}

async fn matrix<T: TerminalSink + ?Sized>(
    session: &mut TerminalSession<'_, T>,
    token: &AnimationToken,
    lines: &[&str],
    max_width: usize,
    config: &DisplayConfig,
) -> io::Result<()> {
    let mut rng = StdRng::from_rng(&mut rand::rng());
    let deadline = tokio::time::Instant::now() + config.params.duration;

    while tokio::time::Instant::now() < deadline {
        if !token.is_running() {
            return Ok(());
        }
        let frame = frames::matrix_frame(&mut rng, lines.len(), max_width);
        redraw(session, &frame, |_| RAIN_COLOR)?;
        tokio::time::sleep(config.speed).await;
    }

    if token.is_running() {
        session.clear()?;
        draw_static(session, lines, &config.colors)?;
    }
    Ok(())
}

async fn pulse<T: TerminalSink + ?Sized>(
    session: &mut TerminalSession<'_, T>,
    token: &AnimationToken,
    lines: &[&str],
    config: &DisplayConfig,
) -> io::Result<()> {
    let palette = if config.colors.is_palette() {
        config.colors.cycle()
    } else {
        ColorSource::scheme(DEFAULT_SCHEME).cycle()
    };
    let frame = owned(lines);
    let hold = config.hold();

    for _ in 0..config.pulse_cycles() {
        for color in &palette {
            if !token.is_running() {
                return Ok(());
            }
            redraw(session, &frame, |_| *color)?;
            pause(token, hold, config.speed).await;
        }
    }

    settle(session, token, lines, config)
}

async fn wave<T: TerminalSink + ?Sized>(
    session: &mut TerminalSession<'_, T>,
    token: &AnimationToken,
    lines: &[&str],
    config: &DisplayConfig,
) -> io::Result<()> {
    for _ in 0..config.wave_cycles() {
        for f in 0..config.params.frames {
            if !token.is_running() {
                return Ok(());
            }
            let frame = frames::wave_frame(lines, f);
            redraw(session, &frame, |i| config.colors.for_line(i))?;
            tokio::time::sleep(config.speed).await;
        }
    }

    settle(session, token, lines, config)
}

/// Final resting frame after a completed effect
fn settle<T: TerminalSink + ?Sized>(
    session: &mut TerminalSession<'_, T>,
    token: &AnimationToken,
    lines: &[&str],
    config: &DisplayConfig,
) -> io::Result<()> {
    if !token.is_running() {
        return Ok(());
    }
    session.clear()?;
    draw_static(session, lines, &config.colors)
}
