//! Render Engine Integration Tests
//!
//! Tests for static output, animation modes, cancellation, conflict
//! handling and terminal fallbacks, using an in-memory terminal and
//! tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::style::{ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use mdsaad::render::terminal::ansi;
use mdsaad::render::{
    Animation, AnimationParams, AnimationState, ArtColor, Capabilities, ColorSource, ColorSupport,
    ConflictPolicy, DisplayConfig, MemoryTerminal, RenderEngine, RenderError, SlideDirection,
};

fn engine(caps: Capabilities) -> RenderEngine<MemoryTerminal> {
    RenderEngine::new(MemoryTerminal::new(caps))
}

fn unwrap_engine(engine: Arc<RenderEngine<MemoryTerminal>>) -> MemoryTerminal {
    match Arc::try_unwrap(engine) {
        Ok(engine) => engine.into_sink(),
        Err(_) => panic!("engine still shared"),
    }
}

fn clears(output: &str) -> usize {
    output.matches(&ansi(Clear(ClearType::All))).count()
}

#[tokio::test]
async fn test_static_render_is_idempotent() {
    let config = DisplayConfig::new(
        ColorSource::Palette(vec![ArtColor::Red, ArtColor::Cyan]),
        Animation::Static,
    );

    let first = engine(Capabilities::truecolor());
    first.render(" /\\_/\\\n( o.o )", &config).await.unwrap();

    let second = engine(Capabilities::truecolor());
    second.render(" /\\_/\\\n( o.o )", &config).await.unwrap();

    assert_eq!(first.into_sink().bytes(), second.into_sink().bytes());
}

#[tokio::test]
async fn test_palette_is_applied_round_robin() {
    let caps = Capabilities {
        interactive: false,
        ansi: true,
        color: ColorSupport::Basic,
    };
    let config = DisplayConfig::new(
        ColorSource::Palette(vec![ArtColor::Red, ArtColor::Blue]),
        Animation::Static,
    );

    let engine = engine(caps);
    engine.render("a\nb\nc", &config).await.unwrap();

    let paint = |text: &str, color: ArtColor| {
        format!(
            "{}{}{}\n",
            ansi(SetForegroundColor(color.basic())),
            text,
            ansi(ResetColor)
        )
    };
    let expected = [
        paint("a", ArtColor::Red),
        paint("b", ArtColor::Blue),
        paint("c", ArtColor::Red),
    ]
    .concat();

    assert_eq!(engine.into_sink().output(), expected);
}

#[tokio::test]
async fn test_unknown_names_fall_back() {
    let config = DisplayConfig::new(
        ColorSource::Single(ArtColor::resolve("chartreuse")),
        Animation::resolve("spin"),
    );
    assert_eq!(config.colors, ColorSource::Single(ArtColor::White));
    assert_eq!(config.animation, Animation::Static);

    let engine = engine(Capabilities::truecolor());
    engine.render("ok", &config).await.unwrap();

    let out = engine.into_sink().output();
    assert!(out.contains("ok"));
    assert!(!out.contains(&ansi(Hide)));
}

#[tokio::test]
async fn test_non_interactive_output_is_static() {
    let config = DisplayConfig::new(ColorSource::default(), Animation::Matrix);

    let engine = engine(Capabilities::plain());
    engine.render("x", &config).await.unwrap();

    assert_eq!(engine.into_sink().output(), "x\n");
}

#[tokio::test(start_paused = true)]
async fn test_legacy_console_uses_newline_flood() {
    let caps = Capabilities {
        interactive: true,
        ansi: false,
        color: ColorSupport::None,
    };
    let sink = MemoryTerminal::new(caps).with_size(Some((80, 3)));
    let engine = RenderEngine::new(sink);

    let params = AnimationParams {
        steps: 2,
        ..Default::default()
    };
    let config = DisplayConfig::new(ColorSource::default(), Animation::FadeIn).with_params(params);

    engine.render("abcd", &config).await.unwrap();

    let out = engine.into_sink().output();
    assert_eq!(out, "\n\n\nab\n\n\n\nabcd\n");
    assert!(!out.contains('\x1b'));
}

#[tokio::test(start_paused = true)]
async fn test_slide_redraws_once_per_column() {
    let config = DisplayConfig::new(ColorSource::default(), Animation::SlideIn)
        .with_direction(SlideDirection::Left)
        .with_speed(Duration::from_millis(5));

    let engine = engine(Capabilities::truecolor());
    engine.render("abc\nd", &config).await.unwrap();

    let out = engine.into_sink().output();
    assert_eq!(clears(&out), 3);
    assert!(out.ends_with(&ansi(Show)));
}

#[tokio::test(start_paused = true)]
async fn test_wave_and_pulse_settle_on_final_frame() {
    let params = AnimationParams {
        frames: 4,
        cycles: Some(1),
        ..Default::default()
    };
    let wave = DisplayConfig::new(ColorSource::default(), Animation::Wave).with_params(params);

    let engine_a = engine(Capabilities::truecolor());
    engine_a.render("~~~", &wave).await.unwrap();
    assert_eq!(clears(&engine_a.into_sink().output()), 5);

    let params = AnimationParams {
        cycles: Some(2),
        ..Default::default()
    };
    let pulse = DisplayConfig::new(
        ColorSource::Palette(vec![ArtColor::Red, ArtColor::Blue]),
        Animation::Pulse,
    )
    .with_params(params);

    let engine_b = engine(Capabilities::truecolor());
    engine_b.render("<3", &pulse).await.unwrap();
    assert_eq!(clears(&engine_b.into_sink().output()), 5);
}

#[tokio::test(start_paused = true)]
async fn test_matrix_runs_for_its_duration() {
    let params = AnimationParams {
        duration: Duration::from_millis(100),
        ..Default::default()
    };
    let config = DisplayConfig::new(ColorSource::default(), Animation::Matrix)
        .with_speed(Duration::from_millis(10))
        .with_params(params);

    let engine = engine(Capabilities::truecolor());
    let start = tokio::time::Instant::now();
    engine.render("hello\nworld", &config).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(100));
    let out = engine.into_sink().output();
    assert!(out.contains("hello\nworld"));
    assert!(out.ends_with(&ansi(Show)));
}

#[tokio::test(start_paused = true)]
async fn test_stop_restores_cursor_within_one_frame() {
    let engine = Arc::new(engine(Capabilities::truecolor()));
    let speed = Duration::from_millis(10);
    let config =
        DisplayConfig::new(ColorSource::default(), Animation::Typewriter).with_speed(speed);

    let worker = Arc::clone(&engine);
    let handle = tokio::spawn(async move { worker.render(&"#".repeat(200), &config).await });

    tokio::time::sleep(Duration::from_millis(25)).await;
    assert!(engine.is_animating());
    assert!(engine.stop_animation());

    let stopped_at = tokio::time::Instant::now();
    handle.await.unwrap().unwrap();
    assert!(stopped_at.elapsed() <= speed);
    assert!(!engine.is_animating());

    let out = unwrap_engine(engine).output();
    assert!(out.ends_with(&ansi(Show)));
    assert!(out.matches('#').count() < 200);
}

#[tokio::test(start_paused = true)]
async fn test_stop_skips_remaining_blank_lines() {
    let engine = Arc::new(engine(Capabilities::truecolor()));
    let speed = Duration::from_millis(10);
    let config =
        DisplayConfig::new(ColorSource::default(), Animation::Typewriter).with_speed(speed);

    let content = format!("#{}", "\n".repeat(20));
    let worker = Arc::clone(&engine);
    let handle = tokio::spawn(async move { worker.render(&content, &config).await });

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(engine.stop_animation());

    let stopped_at = tokio::time::Instant::now();
    handle.await.unwrap().unwrap();
    assert!(stopped_at.elapsed() <= speed);

    let out = unwrap_engine(engine).output();
    assert!(out.ends_with(&ansi(Show)));
    assert!(out.matches('\n').count() < 20);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_line_pause() {
    let engine = Arc::new(engine(Capabilities::truecolor()));
    let speed = Duration::from_millis(10);
    let config =
        DisplayConfig::new(ColorSource::default(), Animation::Typewriter).with_speed(speed);

    let worker = Arc::clone(&engine);
    let handle = tokio::spawn(async move { worker.render("#\n#\n#", &config).await });

    // First character done at 10ms, then a 40ms pause between lines
    tokio::time::sleep(Duration::from_millis(15)).await;
    assert!(engine.stop_animation());

    let stopped_at = tokio::time::Instant::now();
    handle.await.unwrap().unwrap();
    assert!(stopped_at.elapsed() <= speed);
    assert_eq!(unwrap_engine(engine).output().matches('#').count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fail_fast_reports_busy() {
    let engine = Arc::new(engine(Capabilities::truecolor()).with_policy(ConflictPolicy::FailFast));
    let config = DisplayConfig::new(ColorSource::default(), Animation::Typewriter);

    let worker = Arc::clone(&engine);
    let slow = config.clone();
    let handle = tokio::spawn(async move { worker.render(&"#".repeat(100), &slow).await });
    tokio::time::sleep(Duration::from_millis(5)).await;

    let running_id = match engine.state() {
        AnimationState::Running(token) => token.id(),
        AnimationState::Idle => panic!("expected a running animation"),
    };

    let result = engine.render("second", &DisplayConfig::default()).await;
    match result {
        Err(RenderError::Busy { id }) => assert_eq!(id, running_id),
        other => panic!("expected Busy, got {:?}", other),
    }

    engine.stop_animation();
    handle.await.unwrap().unwrap();
    assert!(!unwrap_engine(engine).output().contains("second"));
}

#[tokio::test(start_paused = true)]
async fn test_new_render_cancels_previous() {
    let engine = Arc::new(engine(Capabilities::truecolor()));
    let config = DisplayConfig::new(ColorSource::default(), Animation::Typewriter);

    let worker = Arc::clone(&engine);
    let handle = tokio::spawn(async move { worker.render(&"#".repeat(100), &config).await });
    tokio::time::sleep(Duration::from_millis(120)).await;

    engine
        .render("second", &DisplayConfig::default())
        .await
        .unwrap();
    handle.await.unwrap().unwrap();
    assert!(!engine.is_animating());

    let out = unwrap_engine(engine).output();
    let hashes = out.matches('#').count();
    assert!(hashes > 0 && hashes < 100);

    // The first render released the terminal before the second wrote
    let show = out.find(&ansi(Show)).unwrap();
    let second = out.find("second").unwrap();
    assert!(show < second);
}
