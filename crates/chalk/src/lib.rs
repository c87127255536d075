//! ## Features
//!
//! - Prefixed status lines (info, warn, error, success) on stderr
//! - Multi-line message support with consistent formatting
//! - Timestamped status lines for fetch progress
//! - Banner and rule helpers for section headings
//! - Text drawing primitives for charts (see [`draw`])
//! - `tracing` subscriber setup shared by every binary in the workspace
//!
//! Status lines go to stderr so rendered views on stdout stay pipeable.

pub mod draw;

use chrono::Local;
use colored::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive (e.g. `mentor=debug`)
pub const LOG_ENV: &str = "MENTOR_LOG";

/// Install the global `tracing` subscriber.
///
/// `MENTOR_LOG` wins when set. Otherwise the level is `debug` for verbose runs
/// and `warn` for everything else. Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
  let fallback = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(verbose)
    .try_init();
}

/// Core output function, one `eprintln!` per line
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

fn format_prefix(color: Color, prefix: &str) -> String {
  format!("[{}]{:<width$}", prefix.color(color).bold(), "", width = 6usize.saturating_sub(prefix.len()))
}

fn log_prefixed(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    log(&format!("{prefix}{line}"));
  }
}

/// General information
pub fn info(message: &str) {
  log_prefixed(Color::Blue, "info", message);
}

/// Something needs attention but the run continues
pub fn warn(message: &str) {
  log_prefixed(Color::Yellow, "warn", message);
}

/// Something failed
pub fn error(message: &str) {
  log_prefixed(Color::Red, "error", message);
}

/// Something completed
pub fn success(message: &str) {
  log_prefixed(Color::Green, "ok", message);
}

/// Status line stamped with the local wall-clock time
pub fn stamped(message: &str) {
  let timestamp = Local::now().format("%H:%M:%S").to_string();
  let prefix = format!("[{}] ", timestamp.cyan());
  for line in message.lines() {
    log(&format!("{prefix}{line}"));
  }
}

/// A line made of `length` copies of `ch`
pub fn rule(length: usize, ch: char) -> String {
  ch.to_string().repeat(length)
}

/// Surround a message with two rules. Width defaults to the message width.
pub fn banner(message: &str, width: Option<usize>, border: char) -> String {
  let width = width.unwrap_or_else(|| {
    message.lines().map(console::measure_text_width).max().unwrap_or(0).max(1)
  });
  let line = rule(width, border);
  format!("{line}\n{message}\n{line}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rule_repeats_character() {
    assert_eq!(rule(4, '='), "====");
    assert_eq!(rule(0, '-'), "");
  }

  #[test]
  fn test_banner_defaults_to_message_width() {
    let rendered = banner("Tiến độ", None, '-');
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "-------");
    assert_eq!(lines[1], "Tiến độ");
    assert_eq!(lines[2], lines[0]);
  }

  #[test]
  fn test_banner_with_explicit_width() {
    let rendered = banner("hi", Some(10), '*');
    assert!(rendered.starts_with("**********\n"));
  }
}
