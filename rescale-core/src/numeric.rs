//! Decimal-separator aware number (de)serialization for text vertex fields.
//!
//! Wavefront files written under different locales use either `.` or `,` as
//! the decimal point. A job observes the separator once and then renders every
//! rescaled field with it.

use crate::error::{RescaleError, Result};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecimalFormat {
    separator: char,
}

impl DecimalFormat {
    pub const DOT: DecimalFormat = DecimalFormat { separator: '.' };
    pub const COMMA: DecimalFormat = DecimalFormat { separator: ',' };

    pub fn separator(&self) -> char {
        self.separator
    }
}

impl Default for DecimalFormat {
    fn default() -> Self {
        Self::DOT
    }
}

impl fmt::Display for DecimalFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.separator)
    }
}

/// Captures the separator seen in a matched numeric field.
///
/// A field without a fractional part carries no separator; that case falls
/// back to `.`.
pub fn detect_separator(observed: Option<char>) -> DecimalFormat {
    match observed {
        Some(',') => DecimalFormat::COMMA,
        _ => DecimalFormat::DOT,
    }
}

fn is_decimal_mark(c: char, format: DecimalFormat) -> bool {
    // The vertex grammar admits both marks, so the other one is read as a
    // decimal point as well instead of being mistaken for grouping.
    c == format.separator || c == '.' || c == ','
}

/// Parses `text` as a decimal number using `format` as the decimal point.
pub fn parse(text: &str, format: DecimalFormat) -> Result<f64> {
    let err = || RescaleError::NumericParse(text.to_string());

    let (sign, body) = match text.as_bytes().first() {
        Some(b'-') => ("-", &text[1..]),
        Some(b'+') => ("", &text[1..]),
        _ => ("", text),
    };

    let mut normalized = String::with_capacity(body.len() + 2);
    normalized.push_str(sign);
    let mut digits = 0usize;
    let mut seen_point = false;
    for c in body.chars() {
        if c.is_ascii_digit() {
            digits += 1;
            normalized.push(c);
        } else if is_decimal_mark(c, format) && !seen_point {
            seen_point = true;
            normalized.push('.');
        } else {
            return Err(err());
        }
    }
    if digits == 0 {
        return Err(err());
    }
    // "3." and ".5" are accepted by str::parse; keep them explicit anyway.
    if normalized.ends_with('.') {
        normalized.push('0');
    }
    // more than ~309 integer digits overflows to inf
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(err()),
    }
}

/// Renders `value` in shortest round-trip, non-scientific notation with the
/// format's decimal separator. Integral values carry no fractional part.
pub fn format(value: f64, format: DecimalFormat) -> String {
    let text = value.to_string();
    if format.separator == '.' {
        text
    } else {
        text.replace('.', &format.separator.to_string())
    }
}
