//! Arithmetic evaluation of one pending operation.

use crate::number::{format_number, parse_float};
use crate::operator::Operator;
use crate::types::ErrorCode;
use serde::Serialize;

/// A failed computation. `Display` is the message shown on the history
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    #[error("Can't divide by zero!")]
    DivideByZero,
    #[error("Overflow!")]
    Overflow,
    #[error("Not a number!")]
    NotANumber,
}

impl CalcError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CalcError::DivideByZero => ErrorCode::DivideByZero,
            CalcError::Overflow => ErrorCode::Overflow,
            CalcError::NotANumber => ErrorCode::NotANumber,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Computation {
    pub value: f64,
    /// `"{first} {op} {second} ="`
    pub history: String,
}

impl Computation {
    /// The value as it should appear in the input buffer.
    pub fn display(&self) -> String {
        format_number(self.value)
    }
}

pub fn compute(op: Operator, first: f64, second: f64) -> Result<Computation, CalcError> {
    let value = op.apply(first, second);

    let mut error = None;
    if op == Operator::Divide && second == 0.0 {
        error = Some(CalcError::DivideByZero);
    } else if !value.is_finite() {
        error = Some(CalcError::Overflow);
    }
    // Checked last: NaN is also non-finite, and 0 / 0 lands here too.
    if value.is_nan() {
        error = Some(CalcError::NotANumber);
    }

    match error {
        Some(e) => Err(e),
        None => Ok(Computation {
            value,
            history: format!(
                "{} {} {} =",
                format_number(first),
                op,
                format_number(second)
            ),
        }),
    }
}

/// Evaluate `op` with the first operand read from the history line and the
/// second from the input buffer.
pub fn compute_from_display(
    op: Operator,
    history: &str,
    input: &str,
) -> Result<Computation, CalcError> {
    compute(op, parse_float(history), parse_float(input))
}
