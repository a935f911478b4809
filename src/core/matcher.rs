//! Suffix matchers consulted by the assignment engine, in priority order.

use std::borrow::Cow;
use std::collections::HashMap;

/// A successful rule lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub handler: &'a str,
    pub key: String,
    pub trace: String,
}

/// One rule tier. The engine walks a list of these and stops at the first
/// tier that yields a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Keyed by the last two characters of the number, left-padded with
    /// `'0'` when the number is a single character.
    TwoDigit(HashMap<String, String>),
    /// Keyed by the last character of the unpadded number.
    OneDigit(HashMap<String, String>),
}

impl Matcher {
    pub fn label(&self) -> &'static str {
        match self {
            Matcher::TwoDigit(_) => "two-digit rule",
            Matcher::OneDigit(_) => "one-digit rule",
        }
    }

    pub fn rules(&self) -> &HashMap<String, String> {
        match self {
            Matcher::TwoDigit(rules) | Matcher::OneDigit(rules) => rules,
        }
    }

    /// Lookup key for an already-trimmed, non-empty number.
    pub fn key_for<'n>(&self, trimmed: &'n str) -> Cow<'n, str> {
        match self {
            Matcher::TwoDigit(_) => match left_pad_zero(trimmed, 2) {
                Cow::Borrowed(s) => Cow::Borrowed(last_chars(s, 2)),
                Cow::Owned(s) => Cow::Owned(last_chars(&s, 2).to_string()),
            },
            Matcher::OneDigit(_) => Cow::Borrowed(last_chars(trimmed, 1)),
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.rules().get(key).map(String::as_str)
    }

    pub fn evaluate(&self, trimmed: &str) -> Option<RuleMatch<'_>> {
        let key = self.key_for(trimmed);
        self.lookup(&key).map(|handler| RuleMatch {
            handler,
            trace: format!("ending {} ({})", key, self.label()),
            key: key.into_owned(),
        })
    }
}

fn left_pad_zero(value: &str, width: usize) -> Cow<'_, str> {
    let len = value.chars().count();
    if len >= width {
        Cow::Borrowed(value)
    } else {
        let mut padded = "0".repeat(width - len);
        padded.push_str(value);
        Cow::Owned(padded)
    }
}

// Works on chars so multi-byte text never splits inside a code point.
fn last_chars(value: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match value.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &value[idx..],
        None => value,
    }
}
