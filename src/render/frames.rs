//! Pure frame builders for the animated modes.
//!
//! All widths are display columns, so wide glyphs count as two.

use rand::Rng;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::animation::SlideDirection;

/// Wave amplitude in columns
pub const WAVE_AMPLITUDE: f64 = 3.0;

/// Phase advance per frame and per line
pub const WAVE_PHASE: f64 = 0.3;

/// Chance that a matrix cell holds a symbol
pub const MATRIX_FILL: f64 = 0.7;

/// Symbols drawn by the matrix rain
pub const MATRIX_SYMBOLS: &[char] = &[
    '0', '1', '@', '#', '$', '%', '&', '*', '+', '=', '<', '>', '|', '/', '\\', ':', ';', '~',
];

/// Longest prefix of `line` that fits in `columns`
pub fn take_columns(line: &str, columns: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in line.char_indices() {
        let width = ch.width().unwrap_or(0);
        if used + width > columns {
            return &line[..idx];
        }
        used += width;
    }
    line
}

/// `line` without its first `columns` columns.
///
/// A wide glyph cut in half leaves a space behind so alignment holds.
pub fn skip_columns(line: &str, columns: usize) -> String {
    let mut skipped = 0;
    for (idx, ch) in line.char_indices() {
        if skipped >= columns {
            let overhang = skipped - columns;
            return format!("{}{}", " ".repeat(overhang), &line[idx..]);
        }
        skipped += ch.width().unwrap_or(0);
    }
    " ".repeat(skipped.saturating_sub(columns))
}

/// Right-pad `line` with spaces to `width` columns
pub fn pad_to(line: &str, width: usize) -> String {
    let current = line.width();
    if current >= width {
        line.to_string()
    } else {
        format!("{}{}", line, " ".repeat(width - current))
    }
}

/// Cap every line of `content` at `width` columns
pub fn clip_width(content: &str, width: usize) -> String {
    content
        .split('\n')
        .map(|line| take_columns(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Widest line in columns
pub fn max_width(lines: &[&str]) -> usize {
    lines.iter().map(|l| l.width()).max().unwrap_or(0)
}

/// Fade step `k` of `n`: the first `floor(max_width * k / n)` columns of each line
pub fn fade_frame(lines: &[&str], max_width: usize, k: usize, n: usize) -> Vec<String> {
    let columns = if n == 0 { max_width } else { max_width * k.min(n) / n };
    lines
        .iter()
        .map(|line| take_columns(line, columns).to_string())
        .collect()
}

/// Brightness of fade step `k` of `n`
pub fn fade_brightness(k: usize, n: usize) -> f64 {
    if n == 0 {
        1.0
    } else {
        k.min(n) as f64 / n as f64
    }
}

/// Number of slide steps: columns for left/right, lines for top/bottom
pub fn slide_steps(lines: &[&str], max_width: usize, direction: SlideDirection) -> usize {
    match direction {
        SlideDirection::Left | SlideDirection::Right => max_width,
        SlideDirection::Top | SlideDirection::Bottom => lines.len(),
    }
}

/// Slide frame at `step` (1-based; the last step shows everything).
///
/// `Right` grows each line's prefix. `Left` grows each line's suffix,
/// left-padded so every column sits at its final position.
pub fn slide_frame(
    lines: &[&str],
    max_width: usize,
    direction: SlideDirection,
    step: usize,
) -> Vec<String> {
    match direction {
        SlideDirection::Right => lines
            .iter()
            .map(|line| take_columns(line, step).to_string())
            .collect(),
        SlideDirection::Left => {
            let hidden = max_width.saturating_sub(step);
            let padding = " ".repeat(hidden);
            lines
                .iter()
                .map(|line| {
                    let suffix = skip_columns(&pad_to(line, max_width), hidden);
                    format!("{}{}", padding, suffix).trim_end().to_string()
                })
                .collect()
        }
        SlideDirection::Top => lines
            .iter()
            .take(step)
            .map(|line| line.to_string())
            .collect(),
        SlideDirection::Bottom => {
            let hidden = lines.len().saturating_sub(step);
            lines
                .iter()
                .enumerate()
                .map(|(i, line)| if i < hidden { String::new() } else { line.to_string() })
                .collect()
        }
    }
}

/// Horizontal offset of `line` at `frame`
pub fn wave_offset(frame: usize, line: usize) -> i32 {
    (((frame + line) as f64 * WAVE_PHASE).sin() * WAVE_AMPLITUDE).round() as i32
}

/// Wave frame: each line left-padded by its non-negative offset
pub fn wave_frame(lines: &[&str], frame: usize) -> Vec<String> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let pad = wave_offset(frame, i).max(0) as usize;
            format!("{}{}", " ".repeat(pad), line)
        })
        .collect()
}

/// Random rain grid of `rows` x `columns`
pub fn matrix_frame<R: Rng>(rng: &mut R, rows: usize, columns: usize) -> Vec<String> {
    (0..rows)
        .map(|_| {
            (0..columns)
                .map(|_| {
                    if rng.random_bool(MATRIX_FILL) {
                        MATRIX_SYMBOLS[rng.random_range(0..MATRIX_SYMBOLS.len())]
                    } else {
                        ' '
                    }
                })
                .collect()
        })
        .collect()
}
