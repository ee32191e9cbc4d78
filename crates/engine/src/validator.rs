//! Input filter for the number buffer.
//!
//! Every candidate value of the input buffer goes through [`InputFilter`].
//! Accepted candidates become the new rollback point; rejected ones are
//! replaced by the last accepted value (and its selection), or by an empty
//! buffer when nothing was ever accepted.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Digits with at most one `.`, an optional leading `-`, and an optional
/// exponent suffix. Partial entries like `"-"` and `"-."` match on purpose
/// so they can be typed on the way to a full number.
fn number_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?[0-9]*(?:\.[0-9]*)?(?:[0-9]+[eE][+-]?[0-9]+)?$")
            .expect("number pattern is valid")
    })
}

/// Whether `candidate` is an acceptable (possibly partial) number.
pub fn is_valid_number(candidate: &str) -> bool {
    number_pattern().is_match(candidate)
}

/// Cursor selection inside the input, in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Accepted {
    value: String,
    selection: Option<Selection>,
}

/// What the buffer holds after filtering a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub value: String,
    pub selection: Option<Selection>,
    pub rolled_back: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InputFilter {
    accepted: Option<Accepted>,
    max_len: Option<usize>,
}

impl InputFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter that also rejects candidates longer than `max_len` chars.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            accepted: None,
            max_len: Some(max_len),
        }
    }

    pub fn accepts(&self, candidate: &str) -> bool {
        let within_len = self
            .max_len
            .map_or(true, |max| candidate.chars().count() <= max);
        within_len && is_valid_number(candidate)
    }

    pub fn filter(&mut self, candidate: &str, selection: Option<Selection>) -> FilterOutcome {
        if self.accepts(candidate) {
            self.accepted = Some(Accepted {
                value: candidate.to_string(),
                selection,
            });
            return FilterOutcome {
                value: candidate.to_string(),
                selection,
                rolled_back: false,
            };
        }

        tracing::debug!(candidate, "input rejected, rolling back");
        match &self.accepted {
            Some(prev) => FilterOutcome {
                value: prev.value.clone(),
                selection: prev.selection,
                rolled_back: true,
            },
            None => FilterOutcome {
                value: String::new(),
                selection: None,
                rolled_back: true,
            },
        }
    }

    /// Accept a value that did not come from typing (e.g. a computed
    /// result) without applying the length bound.
    pub fn accept_unbounded(&mut self, value: &str) -> FilterOutcome {
        if is_valid_number(value) {
            self.accepted = Some(Accepted {
                value: value.to_string(),
                selection: None,
            });
            return FilterOutcome {
                value: value.to_string(),
                selection: None,
                rolled_back: false,
            };
        }
        self.filter(value, None)
    }

    pub fn last_accepted(&self) -> Option<&str> {
        self.accepted.as_ref().map(|a| a.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_partial_and_full_numbers() {
        for s in ["", "-", "-.", ".", "3", "3.", "-3.5", "1e10", "1.5e-3", "2E+7", "-0.5e3"] {
            assert!(is_valid_number(s), "should accept {:?}", s);
        }
    }

    #[test]
    fn test_rejects_malformed() {
        for s in ["--3", "3..4", "3a", "3-", "1e", "1e5.", "+3", "e5", " 3", "٣", "１２", "1٢"] {
            assert!(!is_valid_number(s), "should reject {:?}", s);
        }
    }

    #[test]
    fn test_rollback_to_last_accepted() {
        let mut filter = InputFilter::new();
        let sel = Selection { start: 2, end: 2 };
        let ok = filter.filter("12", Some(sel));
        assert!(!ok.rolled_back);

        let out = filter.filter("12a", Some(Selection { start: 3, end: 3 }));
        assert!(out.rolled_back);
        assert_eq!(out.value, "12");
        assert_eq!(out.selection, Some(sel));
        assert_eq!(filter.last_accepted(), Some("12"));
    }

    #[test]
    fn test_rollback_without_history_empties() {
        let mut filter = InputFilter::new();
        let out = filter.filter("abc", None);
        assert!(out.rolled_back);
        assert_eq!(out.value, "");
        assert_eq!(filter.last_accepted(), None);
    }

    #[test]
    fn test_length_bound() {
        let mut filter = InputFilter::with_max_len(3);
        assert!(!filter.filter("123", None).rolled_back);
        let out = filter.filter("1234", None);
        assert!(out.rolled_back);
        assert_eq!(out.value, "123");

        let out = filter.accept_unbounded("12345");
        assert!(!out.rolled_back);
        assert_eq!(out.value, "12345");
    }
}
