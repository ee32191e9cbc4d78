//! The calculator state machine.
//!
//! A [`Calculator`] owns the input buffer, the history line and at most one
//! pending operator. Every user action mutates that state synchronously and
//! returns the [`View`] the shell should show next.

use crate::evaluator::{compute_from_display, CalcError, Computation};
use crate::keys::Key;
use crate::layout::TextSize;
use crate::operator::{Operator, SymbolStyle};
use crate::validator::{FilterOutcome, InputFilter, Selection};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_INPUT_LENGTH: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorSettings {
    #[serde(default = "default_max_input_length")]
    pub max_input_length: usize,
    #[serde(default)]
    pub history_symbols: SymbolStyle,
}

fn default_max_input_length() -> usize {
    DEFAULT_MAX_INPUT_LENGTH
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            history_symbols: SymbolStyle::Ascii,
        }
    }
}

/// What the shell renders after each action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub input: String,
    pub history: String,
    pub pending: Option<Operator>,
    /// Caret/selection to restore in the input field, set after a rollback.
    pub selection: Option<Selection>,
    pub text_size: TextSize,
}

#[derive(Debug, Clone)]
pub struct Calculator {
    settings: CalculatorSettings,
    input: String,
    history: String,
    pending: Option<Operator>,
    filter: InputFilter,
    selection: Option<Selection>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(CalculatorSettings::default())
    }
}

impl Calculator {
    pub fn new(settings: CalculatorSettings) -> Self {
        let filter = InputFilter::with_max_len(settings.max_input_length);
        Self {
            settings,
            input: String::new(),
            history: String::new(),
            pending: None,
            filter,
            selection: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn history(&self) -> &str {
        &self.history
    }

    pub fn pending(&self) -> Option<Operator> {
        self.pending
    }

    pub fn view(&self) -> View {
        View {
            input: self.input.clone(),
            history: self.history.clone(),
            pending: self.pending,
            selection: self.selection,
            text_size: TextSize::for_length(
                self.input.chars().count(),
                self.settings.max_input_length,
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    pub fn on_digit(&mut self, digit: char) -> View {
        if !digit.is_ascii_digit() {
            tracing::debug!(%digit, "ignoring non-digit");
            return self.view();
        }
        if self.input.chars().count() >= self.settings.max_input_length {
            tracing::debug!(len = self.input.len(), "input full, digit ignored");
            return self.view();
        }
        let candidate = format!("{}{}", self.input, digit);
        self.commit(&candidate, None);
        self.view()
    }

    pub fn on_decimal(&mut self) -> View {
        if !self.input.contains('.') {
            let candidate = format!("{}.", self.input);
            self.commit(&candidate, None);
        }
        self.view()
    }

    /// Flip the sign. A buffer holding only `-` has no number to flip and
    /// is left alone, so toggling twice always restores the buffer.
    pub fn on_toggle_sign(&mut self) -> View {
        if self.input == "-" {
            return self.view();
        }
        if let Some(rest) = self.input.strip_prefix('-') {
            let candidate = rest.to_string();
            self.commit(&candidate, None);
        } else if !self.input.is_empty() {
            let candidate = format!("-{}", self.input);
            self.commit(&candidate, None);
        }
        self.view()
    }

    pub fn on_backspace(&mut self) -> View {
        let mut candidate = self.input.clone();
        if candidate.pop().is_some() {
            self.commit(&candidate, None);
        }
        self.view()
    }

    /// Text typed, pasted or dropped straight into the input field.
    pub fn on_input(&mut self, text: &str, selection: Option<Selection>) -> (View, bool) {
        let outcome = self.commit(text, selection);
        (self.view(), outcome.rolled_back)
    }

    pub fn on_clear(&mut self) -> View {
        self.commit("", None);
        self.history.clear();
        self.pending = None;
        tracing::debug!("cleared");
        self.view()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub fn on_operator(&mut self, op: Operator) -> View {
        if self.input.is_empty() {
            tracing::debug!(%op, "no operand, operator ignored");
            return self.view();
        }

        if let Some(pending) = self.pending {
            match self.evaluate(pending) {
                Ok(result) => self.set_result(&result.display()),
                Err(e) => {
                    self.fail(e);
                    return self.view();
                }
            }
        }

        self.history = format!("{} {}", self.input, op.symbol(self.settings.history_symbols));
        self.pending = Some(op);
        self.commit("", None);
        tracing::debug!(%op, history = %self.history, "operator pending");
        self.view()
    }

    pub fn on_equals(&mut self) -> View {
        let Some(pending) = self.pending else {
            return self.view();
        };
        if self.input.is_empty() {
            return self.view();
        }

        self.pending = None;
        match self.evaluate(pending) {
            Ok(result) => {
                self.set_result(&result.display());
                self.history = result.history;
            }
            Err(e) => self.fail(e),
        }
        self.view()
    }

    /// Route a key press. A `-` on an empty buffer types a minus sign
    /// instead of being an (ignored) operator press.
    pub fn press_key(&mut self, key: Key) -> View {
        match key {
            Key::Digit(d) => self.on_digit(d),
            Key::Decimal => self.on_decimal(),
            Key::Negate => self.on_toggle_sign(),
            Key::Backspace => self.on_backspace(),
            Key::Clear => self.on_clear(),
            Key::Equals => self.on_equals(),
            Key::Operator(Operator::Subtract) if self.input.is_empty() => {
                self.on_input("-", None).0
            }
            Key::Operator(op) => self.on_operator(op),
        }
    }

    pub fn press_keys(&mut self, keys: &[Key]) -> View {
        for key in keys {
            self.press_key(*key);
        }
        self.view()
    }

    fn evaluate(&self, op: Operator) -> Result<Computation, CalcError> {
        compute_from_display(op, &self.history, &self.input)
    }

    fn set_result(&mut self, value: &str) {
        let outcome = self.filter.accept_unbounded(value);
        self.input = outcome.value;
        self.selection = outcome.selection;
    }

    fn fail(&mut self, error: CalcError) {
        tracing::info!(%error, history = %self.history, input = %self.input, "computation failed");
        self.pending = None;
        self.commit("", None);
        self.history = error.to_string();
    }

    fn commit(&mut self, candidate: &str, selection: Option<Selection>) -> FilterOutcome {
        let outcome = self.filter.filter(candidate, selection);
        self.input = outcome.value.clone();
        self.selection = outcome.selection;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::parse_sequence;

    fn typed(calc: &mut Calculator, digits: &str) {
        for d in digits.chars() {
            calc.on_digit(d);
        }
    }

    #[test]
    fn test_initial_state_empty() {
        let calc = Calculator::default();
        let v = calc.view();
        assert_eq!(v.input, "");
        assert_eq!(v.history, "");
        assert_eq!(v.pending, None);
    }

    #[test]
    fn test_digit_bound() {
        let mut calc = Calculator::default();
        typed(&mut calc, &"9".repeat(30));
        assert_eq!(calc.input().len(), DEFAULT_MAX_INPUT_LENGTH);

        let mut small = Calculator::new(CalculatorSettings {
            max_input_length: 3,
            ..Default::default()
        });
        typed(&mut small, "12345");
        assert_eq!(small.input(), "123");
    }

    #[test]
    fn test_decimal_idempotent() {
        let mut calc = Calculator::default();
        typed(&mut calc, "3");
        let once = calc.on_decimal();
        let twice = calc.on_decimal();
        assert_eq!(once.input, "3.");
        assert_eq!(twice.input, "3.");
    }

    #[test]
    fn test_decimal_after_exponent_rolls_back() {
        let mut calc = Calculator::default();
        let (_, rolled_back) = calc.on_input("1e5", None);
        assert!(!rolled_back);
        assert_eq!(calc.on_decimal().input, "1e5");
    }

    #[test]
    fn test_toggle_sign_involution() {
        let mut calc = Calculator::default();
        typed(&mut calc, "42");
        calc.on_decimal();
        typed(&mut calc, "5");
        assert_eq!(calc.on_toggle_sign().input, "-42.5");
        assert_eq!(calc.on_toggle_sign().input, "42.5");
    }

    #[test]
    fn test_toggle_sign_on_empty_is_noop() {
        let mut calc = Calculator::default();
        assert_eq!(calc.on_toggle_sign().input, "");
        calc.on_input("-", None);
        assert_eq!(calc.on_toggle_sign().input, "-");
    }

    #[test]
    fn test_operator_chaining() {
        let mut calc = Calculator::default();
        typed(&mut calc, "5");
        let v = calc.on_operator(Operator::Add);
        assert_eq!(v.history, "5 +");
        assert_eq!(v.input, "");
        assert_eq!(v.pending, Some(Operator::Add));

        typed(&mut calc, "3");
        let v = calc.on_operator(Operator::Multiply);
        assert_eq!(v.history, "8 *");
        assert_eq!(v.input, "");

        typed(&mut calc, "2");
        let v = calc.on_equals();
        assert_eq!(v.input, "16");
        assert_eq!(v.history, "8 * 2 =");
        assert_eq!(v.pending, None);
    }

    #[test]
    fn test_visual_history_symbols() {
        let mut calc = Calculator::new(CalculatorSettings {
            history_symbols: SymbolStyle::Visual,
            ..Default::default()
        });
        typed(&mut calc, "9");
        assert_eq!(calc.on_operator(Operator::Divide).history, "9 ÷");
        typed(&mut calc, "3");
        let v = calc.on_equals();
        assert_eq!(v.input, "3");
        assert_eq!(v.history, "9 / 3 =");
    }

    #[test]
    fn test_operator_on_empty_input_ignored() {
        let mut calc = Calculator::default();
        let v = calc.on_operator(Operator::Add);
        assert_eq!(v.history, "");
        assert_eq!(v.pending, None);
    }

    #[test]
    fn test_divide_by_zero_clears() {
        let mut calc = Calculator::default();
        typed(&mut calc, "5");
        calc.on_operator(Operator::Divide);
        typed(&mut calc, "0");
        let v = calc.on_equals();
        assert_eq!(v.input, "");
        assert_eq!(v.history, "Can't divide by zero!");
        assert_eq!(v.pending, None);
    }

    #[test]
    fn test_overflow_in_chaining_aborts_operator() {
        let mut calc = Calculator::default();
        typed(&mut calc, "10");
        calc.on_operator(Operator::Power);
        typed(&mut calc, "1000");
        let v = calc.on_operator(Operator::Add);
        assert_eq!(v.history, "Overflow!");
        assert_eq!(v.input, "");
        assert_eq!(v.pending, None);
    }

    #[test]
    fn test_lone_minus_operand_is_not_a_number() {
        let mut calc = Calculator::default();
        typed(&mut calc, "5");
        calc.on_operator(Operator::Add);
        calc.press_key(Key::Operator(Operator::Subtract));
        assert_eq!(calc.input(), "-");
        let v = calc.on_equals();
        assert_eq!(v.history, "Not a number!");
    }

    #[test]
    fn test_equals_without_pending_is_noop() {
        let mut calc = Calculator::default();
        typed(&mut calc, "7");
        let before = calc.view();
        assert_eq!(calc.on_equals(), before);
    }

    #[test]
    fn test_equals_with_empty_input_keeps_pending() {
        let mut calc = Calculator::default();
        typed(&mut calc, "7");
        calc.on_operator(Operator::Subtract);
        let v = calc.on_equals();
        assert_eq!(v.pending, Some(Operator::Subtract));
        assert_eq!(v.history, "7 -");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut calc = Calculator::default();
        typed(&mut calc, "5");
        calc.on_operator(Operator::Divide);
        typed(&mut calc, "0");
        calc.on_equals();
        let v = calc.on_clear();
        assert_eq!(v.input, "");
        assert_eq!(v.history, "");
        assert_eq!(v.pending, None);

        typed(&mut calc, "4");
        calc.on_operator(Operator::Percent);
        typed(&mut calc, "2");
        let v = calc.on_clear();
        assert_eq!((v.input.as_str(), v.history.as_str(), v.pending), ("", "", None));
    }

    #[test]
    fn test_result_continues_as_operand() {
        let mut calc = Calculator::default();
        let keys = parse_sequence("2^10=").unwrap();
        let v = calc.press_keys(&keys);
        assert_eq!(v.input, "1024");
        let v = calc.press_keys(&parse_sequence("/4=").unwrap());
        assert_eq!(v.input, "256");
        assert_eq!(v.history, "1024 / 4 =");
    }

    #[test]
    fn test_typed_input_rolls_back() {
        let mut calc = Calculator::default();
        calc.on_input("12", Some(Selection { start: 2, end: 2 }));
        let (v, rolled_back) = calc.on_input("12..", None);
        assert!(rolled_back);
        assert_eq!(v.input, "12");
        assert_eq!(v.selection, Some(Selection { start: 2, end: 2 }));
    }

    #[test]
    fn test_non_ascii_digits_roll_back() {
        let mut calc = Calculator::default();
        let (v, rolled_back) = calc.on_input("١٢", None);
        assert!(rolled_back);
        assert_eq!(v.input, "");
        assert_eq!(calc.on_operator(Operator::Add).history, "");
    }

    #[test]
    fn test_backspace() {
        let mut calc = Calculator::default();
        typed(&mut calc, "123");
        assert_eq!(calc.on_backspace().input, "12");
        calc.on_clear();
        assert_eq!(calc.on_backspace().input, "");
    }

    #[test]
    fn test_result_longer_than_bound_is_kept() {
        let mut calc = Calculator::new(CalculatorSettings {
            max_input_length: 4,
            ..Default::default()
        });
        let v = calc.press_keys(&parse_sequence("1/3=").unwrap());
        assert_eq!(v.input, "0.3333333333333333");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        /// Buffers the input filter accepts, partial entries included.
        fn accepted_buffer() -> impl Strategy<Value = String> {
            "-?[0-9]{0,10}(\\.[0-9]{0,6})?([0-9]{1,3}[eE][+-]?[0-9]{1,2})?"
        }

        fn loaded(buffer: &str) -> Option<Calculator> {
            let mut calc = Calculator::default();
            let (_, rolled_back) = calc.on_input(buffer, None);
            (!rolled_back).then_some(calc)
        }

        proptest! {
            #[test]
            fn prop_digits_never_exceed_bound(
                digits in "[0-9]{0,40}",
                max in 1usize..=30,
            ) {
                let mut calc = Calculator::new(CalculatorSettings {
                    max_input_length: max,
                    ..Default::default()
                });
                typed(&mut calc, &digits);
                let kept = digits.len().min(max);
                prop_assert!(calc.input().len() <= max);
                prop_assert_eq!(calc.input(), &digits[..kept]);
            }

            #[test]
            fn prop_decimal_is_idempotent(buffer in accepted_buffer()) {
                let Some(mut calc) = loaded(&buffer) else {
                    return Ok(());
                };
                let once = calc.on_decimal();
                let twice = calc.on_decimal();
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn prop_toggle_sign_is_involution(buffer in accepted_buffer()) {
                prop_assume!(!buffer.is_empty());
                let Some(mut calc) = loaded(&buffer) else {
                    return Ok(());
                };
                calc.on_toggle_sign();
                let back = calc.on_toggle_sign();
                prop_assert_eq!(back.input, buffer);
            }
        }
    }
}
