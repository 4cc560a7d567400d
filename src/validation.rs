//! Structural checks over a tokenized loc file.
//!
//! None of the checks stop at the first offense: each scans its whole input
//! and returns a [`StructuralReport`] listing every offender. Turning a report
//! into an error is left to the caller through [`StructuralReport::into_result`].

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::{error::Error, tokenizer::KEY_CHARSET_CLASS, types::Token};

lazy_static! {
    static ref VALID_KEY: Regex =
        Regex::new(&format!("^{}+$", KEY_CHARSET_CLASS)).expect("valid key charset pattern");
    static ref ISOLATED_CONDITIONAL: Regex =
        Regex::new(r"(?m)^[ \t]*(\[[^\]]*\])").expect("valid conditional pattern");
}

/// Value translators leave behind when a string was meant to be empty.
const EMPTY_STRING_MARKER: &str = "[EMPTY STRING]";

/// Kind of structural problem a report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralIssue {
    /// Empty, oversize, or containing characters outside the allow-list.
    InvalidKey,
    /// Same key and conditional more than once.
    DuplicateKey,
    /// A conditional statement on a line of its own.
    IsolatedConditional,
    /// A value reading `[empty string]`.
    EmptyStringValue,
}

impl Display for StructuralIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StructuralIssue::InvalidKey => write!(f, "invalid key(s) found"),
            StructuralIssue::DuplicateKey => write!(f, "non unique key(s)"),
            StructuralIssue::IsolatedConditional => {
                write!(f, "isolated conditional statement(s) found")
            }
            StructuralIssue::EmptyStringValue => write!(f, "invalid value(s) found"),
        }
    }
}

/// Result of one structural check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralReport {
    pub issue: StructuralIssue,
    pub offenders: Vec<String>,
}

impl StructuralReport {
    fn new(issue: StructuralIssue, offenders: Vec<String>) -> Self {
        debug!("{:?}: {} offender(s)", issue, offenders.len());
        StructuralReport { issue, offenders }
    }

    pub fn is_clean(&self) -> bool {
        self.offenders.is_empty()
    }

    /// `Ok(())` for a clean report, one aggregate error otherwise.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(Error::structural(self.issue, self.offenders))
        }
    }
}

/// Reports keys that are empty, longer than `max_key_len` bytes, or hold a
/// character outside the allow-list. Meant to run on fuzzy tokens.
pub fn check_key_validity(tokens: &[Token], max_key_len: usize) -> StructuralReport {
    let offenders = tokens
        .iter()
        .filter(|token| !is_valid_key(&token.key, max_key_len))
        .map(|token| token.key.clone())
        .collect();
    StructuralReport::new(StructuralIssue::InvalidKey, offenders)
}

/// Checks a single key against the allow-list and length limit.
pub fn is_valid_key(key: &str, max_key_len: usize) -> bool {
    !key.is_empty() && key.len() <= max_key_len && VALID_KEY.is_match(key)
}

/// Reports (key, conditional) pairs appearing more than once, as
/// `key + conditional` strings in order of first appearance.
pub fn check_key_uniqueness(tokens: &[Token]) -> StructuralReport {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for token in tokens {
        let composite = token.composite_key();
        let count = counts.entry(composite.clone()).or_insert(0);
        if *count == 0 {
            order.push(composite);
        }
        *count += 1;
    }

    let offenders = order
        .into_iter()
        .filter(|composite| counts.get(composite).copied().unwrap_or(0) > 1)
        .collect();
    StructuralReport::new(StructuralIssue::DuplicateKey, offenders)
}

/// Reports lines of the raw buffer that start with a bracketed expression,
/// i.e. conditionals not attached to any key/value pair.
pub fn check_isolated_conditionals(buf: &str) -> StructuralReport {
    let offenders = ISOLATED_CONDITIONAL
        .find_iter(buf)
        .map(|m| m.as_str().to_string())
        .collect();
    StructuralReport::new(StructuralIssue::IsolatedConditional, offenders)
}

/// Reports values reading `[empty string]` (any case), as `key value`.
pub fn check_empty_string_values(tokens: &[Token]) -> StructuralReport {
    let offenders = tokens
        .iter()
        .filter(|token| token.value.eq_ignore_ascii_case(EMPTY_STRING_MARKER))
        .map(|token| format!("{} {}", token.key, token.value))
        .collect();
    StructuralReport::new(StructuralIssue::EmptyStringValue, offenders)
}
