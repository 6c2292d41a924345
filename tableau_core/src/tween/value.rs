// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::str::FromStr;

use palette::Srgb;

use crate::time::Timestamp;

/// A dynamically typed attribute value.
///
/// Only some values can be interpolated: numbers, timestamps and text that
/// parses as a `#rgb` / `#rrggbb` hex colour.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A number.
    Number(f64),
    /// A calendar instant.
    Timestamp(Timestamp),
    /// Free-form text. Hex colours are stored as text.
    Text(String),
    /// A flag.
    Bool(bool),
}

impl Value {
    /// Returns the number, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the flag, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the text, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Timestamp(ts) => write!(f, "{}us", ts.micros()),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Parses `#rgb` or `#rrggbb`.
#[must_use]
pub fn parse_hex_color(text: &str) -> Option<Srgb<u8>> {
    let digits = text.strip_prefix('#')?;
    if !matches!(digits.len(), 3 | 6) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Srgb::from_str(digits).ok()
}

/// Formats a colour as lowercase `#rrggbb`.
#[must_use]
pub fn format_hex_color(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// How a tracked attribute moves from its start value to its end value.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Interpolation {
    Number { start: f64, end: f64 },
    Timestamp { start: i64, end: i64 },
    Color { start: Srgb<u8>, end: Srgb<u8> },
}

impl Interpolation {
    /// Picks the rule for a start/end pair, or `None` if the pair cannot be
    /// interpolated.
    pub(crate) fn classify(start: &Value, end: &Value) -> Option<Self> {
        match (start, end) {
            (Value::Number(start), Value::Number(end)) if start.is_finite() && end.is_finite() => {
                Some(Self::Number {
                    start: *start,
                    end: *end,
                })
            }
            (Value::Timestamp(start), Value::Timestamp(end)) => Some(Self::Timestamp {
                start: start.micros(),
                end: end.micros(),
            }),
            (Value::Text(start), Value::Text(end)) => Some(Self::Color {
                start: parse_hex_color(start)?,
                end: parse_hex_color(end)?,
            }),
            _ => None,
        }
    }

    /// Returns the value at eased progress `e` (not clamped, so back and
    /// elastic curves overshoot numbers and timestamps).
    #[expect(
        clippy::cast_possible_truncation,
        reason = "values are rounded and clamped to the target range first"
    )]
    pub(crate) fn at(&self, e: f64) -> Value {
        match self {
            Self::Number { start, end } => Value::Number(start + (end - start) * e),
            Self::Timestamp { start, end } => {
                let (s, d) = (*start as f64, (*end - *start) as f64);
                Value::Timestamp(Timestamp((s + d * e).round() as i64))
            }
            Self::Color { start, end } => {
                let channel = |a: u8, b: u8| {
                    let v = f64::from(a) + (f64::from(b) - f64::from(a)) * e;
                    v.round().clamp(0.0, 255.0) as u8
                };
                Value::Text(format_hex_color(Srgb::new(
                    channel(start.red, end.red),
                    channel(start.green, end.green),
                    channel(start.blue, end.blue),
                )))
            }
        }
    }

    /// Returns the exact end value.
    pub(crate) fn end(&self) -> Value {
        match self {
            Self::Number { end, .. } => Value::Number(*end),
            Self::Timestamp { end, .. } => Value::Timestamp(Timestamp(*end)),
            Self::Color { end, .. } => Value::Text(format_hex_color(*end)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing_requires_hash_and_length() {
        assert_eq!(parse_hex_color("#ff8000"), Some(Srgb::new(255, 128, 0)));
        assert_eq!(parse_hex_color("#f80"), Some(Srgb::new(255, 136, 0)));
        assert_eq!(parse_hex_color("ff8000"), None, "missing #");
        assert_eq!(parse_hex_color("#ff80"), None, "four digits");
        assert_eq!(parse_hex_color("#gg0000"), None, "not hex");
    }

    #[test]
    fn classify_rejects_mismatched_kinds() {
        assert!(Interpolation::classify(&Value::Number(0.0), &Value::Text("#fff".into())).is_none());
        assert!(Interpolation::classify(&Value::Bool(true), &Value::Bool(false)).is_none());
        assert!(
            Interpolation::classify(&Value::Text("red".into()), &Value::Text("#fff".into())).is_none(),
            "named colours are not interpolated"
        );
        assert!(Interpolation::classify(&Value::Number(f64::NAN), &Value::Number(1.0)).is_none());
    }

    #[test]
    fn colour_midpoint_is_rehexed() {
        let rule =
            Interpolation::classify(&Value::from("#000000"), &Value::from("#ffffff")).expect("colour");
        assert_eq!(rule.at(0.5), Value::from("#808080"));
        assert_eq!(rule.end(), Value::from("#ffffff"));
    }

    #[test]
    fn colour_overshoot_is_clamped() {
        let rule = Interpolation::classify(&Value::from("#000"), &Value::from("#f00")).expect("colour");
        assert_eq!(rule.at(1.5), Value::from("#ff0000"));
        assert_eq!(rule.at(-0.5), Value::from("#000000"));
    }

    #[test]
    fn timestamp_lerps_epoch_offset() {
        let start = Timestamp::from_unix_secs(0);
        let end = Timestamp::from_unix_secs(10);
        let rule = Interpolation::classify(&start.into(), &end.into()).expect("timestamp");
        assert_eq!(rule.at(0.25), Value::Timestamp(Timestamp(2_500_000)));
    }

    #[test]
    fn number_lerp() {
        let rule = Interpolation::classify(&Value::from(10.0), &Value::from(20.0)).expect("number");
        assert_eq!(rule.at(0.5), Value::Number(15.0));
    }
}
