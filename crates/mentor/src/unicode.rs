//! Repair of literal `\uXXXX` sequences inside JSON string values.
//!
//! Some endpoints double-escape non-ASCII text, so after JSON decoding a
//! string still reads `To\u00e1n` instead of `Toán`. [`repair`] walks a decoded
//! payload and turns those sequences into the characters they name.
//!
//! Decoding can assemble a fresh escape (`\u005Cu0041` becomes `\u0041`), so
//! passes repeat until the string stops changing. Every decode shortens the
//! string, which bounds the loop. Lone surrogates stay verbatim.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;

static ESCAPE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\\u([0-9a-fA-F]{4})").expect("escape pattern is valid"));

/// Repair every string in `payload`, object keys included
pub fn repair(payload: Value) -> Value {
  match payload {
    Value::String(s) => Value::String(repair_str(&s).into_owned()),
    Value::Array(items) => Value::Array(items.into_iter().map(repair).collect()),
    Value::Object(fields) => Value::Object(
      fields.into_iter().map(|(k, v)| (repair_str(&k).into_owned(), repair(v))).collect::<Map<_, _>>(),
    ),
    other => other,
  }
}

/// Repair a single string, borrowing when nothing needs to change
pub fn repair_str(text: &str) -> Cow<'_, str> {
  let mut repaired = Cow::Borrowed(text);
  while let Some(next) = decode_pass(&repaired) {
    repaired = Cow::Owned(next);
  }
  repaired
}

/// Decode every escape once, left to right. `None` when nothing decoded.
fn decode_pass(text: &str) -> Option<String> {
  if !text.contains("\\u") {
    return None;
  }

  let mut out = String::with_capacity(text.len());
  let mut cursor = 0;
  let mut search = 0;
  let mut changed = false;

  while let Some(caps) = ESCAPE.captures_at(text, search) {
    let Some(whole) = caps.get(0) else { break };
    let unit = hex_unit(&caps[1]);

    let (decoded, end) = if is_high_surrogate(unit) {
      match low_surrogate_at(text, whole.end()) {
        Some((low, end)) => (combine(unit, low), end),
        None => (None, whole.end()),
      }
    } else {
      // Lone low surrogates are not chars and stay verbatim.
      (char::from_u32(unit), whole.end())
    };

    if let Some(ch) = decoded {
      out.push_str(&text[cursor..whole.start()]);
      out.push(ch);
      cursor = end;
      changed = true;
    }
    search = end;
  }

  if !changed {
    return None;
  }
  out.push_str(&text[cursor..]);
  Some(out)
}

/// A low-surrogate escape starting exactly at `at`, with the offset just past it
fn low_surrogate_at(text: &str, at: usize) -> Option<(u32, usize)> {
  let caps = ESCAPE.captures_at(text, at)?;
  let whole = caps.get(0)?;
  let unit = hex_unit(&caps[1]);
  (whole.start() == at && is_low_surrogate(unit)).then_some((unit, whole.end()))
}

fn combine(high: u32, low: u32) -> Option<char> {
  char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}

fn hex_unit(digits: &str) -> u32 {
  // The pattern only captures four hex digits.
  u32::from_str_radix(digits, 16).unwrap_or(0xFFFD)
}

fn is_high_surrogate(unit: u32) -> bool {
  (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u32) -> bool {
  (0xDC00..=0xDFFF).contains(&unit)
}
