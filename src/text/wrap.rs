use crate::foundation::core::Point;
use crate::foundation::error::NewsreelResult;
use crate::render::surface::{Surface, TextMeasure, TextStyle};

/// Break `text` into lines no wider than `max_width_px`.
///
/// Words are whitespace-delimited and accumulated greedily. A line is flushed when appending the
/// next word would overflow and the line already holds a word, so a single word wider than the
/// budget stays on its own, unbroken line. There is no hyphenation and no line cap.
pub fn wrap_lines<M: TextMeasure + ?Sized>(
    measure: &mut M,
    text: &str,
    max_width_px: f32,
    style: &TextStyle,
) -> NewsreelResult<Vec<String>> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if !line.is_empty() && measure.measure(&candidate, style)? > max_width_px {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

/// Wrap `text` and draw each line, advancing `line_height_px` per line from `origin`.
///
/// Returns the y coordinate just below the last line.
pub fn draw_wrapped<S: Surface + ?Sized>(
    surface: &mut S,
    text: &str,
    origin: Point,
    max_width_px: f64,
    line_height_px: f64,
    style: &TextStyle,
) -> NewsreelResult<f64> {
    let lines = wrap_lines(&mut *surface, text, max_width_px as f32, style)?;
    let mut y = origin.y;
    for line in &lines {
        surface.draw_text(line, Point::new(origin.x, y), style)?;
        y += line_height_px;
    }
    Ok(y)
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
