//! Lenient float parsing and display formatting for calculator numbers.
//!
//! Operands are read the forgiving way a text field is read: leading
//! whitespace is skipped and the longest numeric prefix wins, so the
//! history line `"8 ÷"` reads as `8`. Anything without a numeric prefix
//! (`""`, `"-"`, `"-."`) reads as NaN and is left for the evaluator to
//! classify.

use regex::Regex;
use std::sync::OnceLock;

fn float_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
            .expect("float prefix pattern is valid")
    })
}

/// Parse the longest numeric prefix of `text`, or NaN if there is none.
pub fn parse_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    float_prefix()
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Format a number the way the display shows it: shortest round-trip
/// digits, no trailing `.0`, and exponent notation outside
/// `1e-6 <= |x| < 1e21`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // Covers -0 as well.
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let raw = format!("{:e}", value);
        return match raw.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => raw,
        };
    }

    format!("{}", value)
}
