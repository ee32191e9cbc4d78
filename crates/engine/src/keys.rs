//! Keyboard keys, on-screen buttons, and key-sequence parsing.

use crate::operator::Operator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single user action arriving from the keyboard or an on-screen button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Digit(char),
    Decimal,
    Operator(Operator),
    Equals,
    Clear,
    Backspace,
    /// The sign button. It has no keyboard binding.
    Negate,
}

/// On-screen calculator buttons, for the pressed-button visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Button {
    Digit(char),
    Decimal,
    Sign,
    Clear,
    Percent,
    Divide,
    Multiply,
    Minus,
    Plus,
    Exponent,
    Equals,
}

impl Button {
    pub fn id(&self) -> String {
        let name = match self {
            Button::Digit(d) => return format!("{}-btn", d),
            Button::Decimal => "decimal",
            Button::Sign => "sign",
            Button::Clear => "clear",
            Button::Percent => "percent",
            Button::Divide => "divide",
            Button::Multiply => "multiply",
            Button::Minus => "minus",
            Button::Plus => "plus",
            Button::Exponent => "exponent",
            Button::Equals => "equals",
        };
        format!("{}-btn", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("unknown key: {0:?}")]
    UnknownKey(String),
    #[error("unterminated key name starting at offset {0}")]
    Unterminated(usize),
}

impl Key {
    /// Map a keyboard key name (`"7"`, `"Enter"`, `"Escape"`, `"^"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Enter" | "=" => return Some(Key::Equals),
            "Escape" => return Some(Key::Clear),
            "Backspace" => return Some(Key::Backspace),
            "Negate" => return Some(Key::Negate),
            "." => return Some(Key::Decimal),
            _ => {}
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_digit() => Some(Key::Digit(c)),
            (Some(c), None) => Operator::from_char(c).map(Key::Operator),
            _ => None,
        }
    }

    /// The button this key visually presses. Backspace edits the field
    /// directly and has no button.
    pub fn button(&self) -> Option<Button> {
        match self {
            Key::Digit(d) => Some(Button::Digit(*d)),
            Key::Decimal => Some(Button::Decimal),
            Key::Negate => Some(Button::Sign),
            Key::Clear => Some(Button::Clear),
            Key::Equals => Some(Button::Equals),
            Key::Backspace => None,
            Key::Operator(op) => Some(match op {
                Operator::Percent => Button::Percent,
                Operator::Divide => Button::Divide,
                Operator::Multiply => Button::Multiply,
                Operator::Subtract => Button::Minus,
                Operator::Add => Button::Plus,
                Operator::Power => Button::Exponent,
            }),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Digit(d) => write!(f, "{}", d),
            Key::Decimal => f.write_str("."),
            Key::Operator(op) => write!(f, "{}", op),
            Key::Equals => f.write_str("="),
            Key::Clear => f.write_str("<Escape>"),
            Key::Backspace => f.write_str("<Backspace>"),
            Key::Negate => f.write_str("<Negate>"),
        }
    }
}

/// Parse a key sequence such as `"5+3*2="` or `"12<Negate>/4<Enter>"`.
/// Whitespace between keys is ignored.
pub fn parse_sequence(seq: &str) -> Result<Vec<Key>, KeyParseError> {
    let mut keys = Vec::new();
    let mut rest = seq.char_indices();

    while let Some((offset, c)) = rest.next() {
        if c.is_whitespace() {
            continue;
        }
        if c == '<' {
            let mut name = String::new();
            let mut closed = false;
            for (_, n) in rest.by_ref() {
                if n == '>' {
                    closed = true;
                    break;
                }
                name.push(n);
            }
            if !closed {
                return Err(KeyParseError::Unterminated(offset));
            }
            let key = Key::from_name(&name).ok_or(KeyParseError::UnknownKey(name))?;
            keys.push(key);
            continue;
        }

        let key = Key::from_name(c.encode_utf8(&mut [0; 4]))
            .ok_or_else(|| KeyParseError::UnknownKey(c.to_string()))?;
        keys.push(key);
    }

    Ok(keys)
}
