use once_cell::sync::Lazy;
use regex::Regex;

use crate::text_metrics::TextMeasurer;

use super::TextBlock;

/// A word, optionally wrapped in parentheses, or a lone separator.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(?[^\s|()]+\)?|[|()]").unwrap());

/// Points to pixels.
pub fn pt_to_px(points: f64) -> f32 {
    (points * 4.0 / 3.0) as f32
}

struct Token<'a> {
    text: &'a str,
    space_before: bool,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last_end = 0;
    for found in TOKEN_RE.find_iter(text) {
        tokens.push(Token {
            text: found.as_str(),
            space_before: found.start() > last_end,
        });
        last_end = found.end();
    }
    tokens
}

/// Greedily wrap `text` into lines no wider than `max_width`.
///
/// Breaks fall on whitespace and around `|`, `(` and `)`; a word wider than
/// the limit is broken between characters. Returns `None` when not even a
/// single character fits. Whitespace is collapsed, nothing else is dropped.
pub fn wrap_text(
    text: &str,
    max_width: f32,
    font_size: f32,
    measurer: &dyn TextMeasurer,
) -> Option<Vec<String>> {
    if max_width <= 0.0 {
        return if text.trim().is_empty() {
            Some(Vec::new())
        } else {
            None
        };
    }
    let fits = |candidate: &str| measurer.measure(candidate, font_size) <= max_width;

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for token in tokenize(text) {
        let candidate = if current.is_empty() {
            token.text.to_string()
        } else if token.space_before {
            format!("{current} {}", token.text)
        } else {
            format!("{current}{}", token.text)
        };
        if fits(&candidate) {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if fits(token.text) {
            current = token.text.to_string();
            continue;
        }
        for ch in token.text.chars() {
            let mut candidate = current.clone();
            candidate.push(ch);
            if fits(&candidate) {
                current = candidate;
            } else if current.is_empty() {
                return None;
            } else {
                lines.push(std::mem::replace(&mut current, ch.to_string()));
                if !fits(&current) {
                    return None;
                }
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    Some(lines)
}

/// Wrap and measure; `None` when the text cannot be made to fit the width.
pub fn wrap_block(
    text: &str,
    max_width: f32,
    font_size: f32,
    line_height: f32,
    measurer: &dyn TextMeasurer,
) -> Option<TextBlock> {
    let lines = wrap_text(text, max_width, font_size, measurer)?;
    Some(measure_lines(lines, font_size, line_height, measurer))
}

/// A block that is never wrapped.
pub fn single_line_block(
    text: &str,
    font_size: f32,
    line_height: f32,
    measurer: &dyn TextMeasurer,
) -> TextBlock {
    measure_lines(vec![text.to_string()], font_size, line_height, measurer)
}

fn measure_lines(
    lines: Vec<String>,
    font_size: f32,
    line_height: f32,
    measurer: &dyn TextMeasurer,
) -> TextBlock {
    let width = lines
        .iter()
        .map(|line| measurer.measure(line, font_size))
        .fold(0.0, f32::max);
    let height = lines.len() as f32 * font_size * line_height;
    TextBlock {
        lines,
        width,
        height,
    }
}
