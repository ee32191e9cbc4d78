//! Binary operators the calculator can hold as its pending operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "^")]
    Power,
}

/// How the in-progress history line spells the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolStyle {
    /// The operator tag itself (`/`, `*`).
    #[default]
    Ascii,
    /// The glyphs printed on the on-screen buttons (`÷`, `x`).
    Visual,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operator: {0:?} (expected one of % / * - + ^)")]
pub struct ParseOperatorError(pub String);

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Percent,
        Operator::Divide,
        Operator::Multiply,
        Operator::Subtract,
        Operator::Add,
        Operator::Power,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '%' => Some(Operator::Percent),
            '/' => Some(Operator::Divide),
            '*' => Some(Operator::Multiply),
            '-' => Some(Operator::Subtract),
            '+' => Some(Operator::Add),
            '^' => Some(Operator::Power),
            _ => None,
        }
    }

    /// The single-character operator tag.
    pub fn as_char(self) -> char {
        match self {
            Operator::Percent => '%',
            Operator::Divide => '/',
            Operator::Multiply => '*',
            Operator::Subtract => '-',
            Operator::Add => '+',
            Operator::Power => '^',
        }
    }

    pub fn symbol(self, style: SymbolStyle) -> &'static str {
        match (style, self) {
            (SymbolStyle::Visual, Operator::Divide) => "÷",
            (SymbolStyle::Visual, Operator::Multiply) => "x",
            (_, Operator::Percent) => "%",
            (_, Operator::Divide) => "/",
            (_, Operator::Multiply) => "*",
            (_, Operator::Subtract) => "-",
            (_, Operator::Add) => "+",
            (_, Operator::Power) => "^",
        }
    }

    pub fn apply(self, first: f64, second: f64) -> f64 {
        match self {
            Operator::Percent => (first / 100.0) * second,
            Operator::Divide => first / second,
            Operator::Multiply => first * second,
            Operator::Subtract => first - second,
            Operator::Add => first + second,
            Operator::Power => power(first, second),
        }
    }
}

/// Exponentiation where a NaN exponent, or `±1` raised to an infinite
/// power, is NaN. `f64::powf` returns 1 for both.
fn power(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Operator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Operator::from_char(c).ok_or_else(|| ParseOperatorError(s.into())),
            _ => Err(ParseOperatorError(s.into())),
        }
    }
}
