//! Plain-text drawing primitives.
//!
//! Everything here returns uncoloured `String`s measured in terminal columns,
//! so callers can colour the pieces they care about and tests can compare text.

use console::measure_text_width;

const FILLED: char = '█';
const EMPTY: char = '░';

/// Horizontal bar of `width` cells, filled in proportion to `value / max`.
///
/// Values are clamped to `0..=max`; a non-positive `max` draws an empty bar.
pub fn bar(value: f64, max: f64, width: usize) -> String {
  let filled = if max > 0.0 && value.is_finite() {
    ((value.clamp(0.0, max) / max) * width as f64).round() as usize
  } else {
    0
  };
  let filled = filled.min(width);

  let mut out = String::with_capacity(width * FILLED.len_utf8());
  out.extend(std::iter::repeat(FILLED).take(filled));
  out.extend(std::iter::repeat(EMPTY).take(width - filled));
  out
}

/// Bracketed percentage gauge, e.g. `[█████░░░░░]  50.0%`
pub fn gauge(percent: f64, width: usize) -> String {
  format!("[{}] {:>5.1}%", bar(percent, 100.0, width), percent.clamp(0.0, 100.0))
}

/// Pad `text` with spaces up to `width` display columns.
///
/// Text already wider than `width` is truncated with an ellipsis.
pub fn fit(text: &str, width: usize) -> String {
  let measured = measure_text_width(text);
  if measured <= width {
    return format!("{text}{}", " ".repeat(width - measured));
  }

  if width == 0 {
    return String::new();
  }

  let mut out = String::new();
  let mut used = 0;
  for ch in text.chars() {
    let w = measure_text_width(ch.encode_utf8(&mut [0; 4]));
    if used + w > width - 1 {
      break;
    }
    out.push(ch);
    used += w;
  }
  out.push('…');
  used += 1;
  out.push_str(&" ".repeat(width.saturating_sub(used)));
  out
}

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current = String::new();
    for word in paragraph.split_whitespace() {
      if current.is_empty() {
        current = word.to_string();
      } else if measure_text_width(&current) + 1 + measure_text_width(word) <= width {
        current.push(' ');
        current.push_str(word);
      } else {
        lines.push(std::mem::take(&mut current));
        current = word.to_string();
      }
    }

    if !current.is_empty() {
      lines.push(current);
    }
  }

  lines
}
