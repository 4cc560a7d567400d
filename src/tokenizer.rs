//! Line-oriented tokenizer for VDF loc file bodies.
//!
//! Each candidate line has the shape
//!
//! ```text
//! "key"   "value"   [$CONDITIONAL]   // comment
//! ```
//!
//! with the conditional and the comment optional. Strict mode only accepts
//! keys drawn from the VDF key allow-list; fuzzy mode accepts any run of
//! non-quote characters so that damaged files still yield tokens for the
//! key validity check.

use log::debug;
use regex::Regex;

use crate::{
    error::Error,
    options::{CharsetMode, ParseOptions},
    types::Token,
};

/// Character class of valid key characters.
pub(crate) const KEY_CHARSET_CLASS: &str = r"[0-9A-Za-z\[\]\$#_:\&!\|\.\-\+/ \^'\{\}]";

/// Quoted value body: anything but quotes and backslashes, or an escape.
const VALUE_PATTERN: &str = r#"[^"\\]*(?:\\.[^"\\]*)*"#;

/// Builds the line pattern for a charset mode.
///
/// Capture groups: 1 key, 2 value, 3 conditional, 4 comment. In fuzzy mode
/// the key/value pair is optional so bare comment lines match too; those
/// come back without a key capture.
fn line_pattern(mode: CharsetMode) -> String {
    let (key, pair_quantifier) = match mode {
        CharsetMode::Strict => (format!("{}+", KEY_CHARSET_CLASS), ""),
        CharsetMode::Fuzzy => (r#"[^"]*"#.to_string(), "?"),
    };
    format!(
        r#"(?m)^[ \t]*(?:"({key})"\s*"({value})"){pair_quantifier}[ \t]*(\[[^\]\r\n]*\])?[ \t]*(//[^\r\n]*)?"#,
        key = key,
        value = VALUE_PATTERN,
        pair_quantifier = pair_quantifier,
    )
}

/// A compiled tokenizer for one charset mode.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    mode: CharsetMode,
    keep_source_tokens: bool,
    pattern: Regex,
}

impl Tokenizer {
    /// Compiles the line pattern selected by `options`.
    pub fn new(options: &ParseOptions) -> Result<Self, Error> {
        let pattern = Regex::new(&line_pattern(options.charset_mode))?;
        Ok(Tokenizer {
            mode: options.charset_mode,
            keep_source_tokens: options.keep_source_tokens,
            pattern,
        })
    }

    pub fn mode(&self) -> CharsetMode {
        self.mode
    }

    /// Extracts all tokens of `body` in source order.
    ///
    /// Duplicates are kept. Lines without a key capture (fuzzy mode comment
    /// or conditional lines) are dropped, and so are `[english]` tokens unless
    /// the tokenizer was built to keep them.
    pub fn tokenize(&self, body: &str) -> Vec<Token> {
        let tokens: Vec<Token> = self
            .pattern
            .captures_iter(body)
            .filter_map(|caps| {
                let key = caps.get(1)?.as_str().to_string();
                let value = caps.get(2).map_or("", |m| m.as_str()).to_string();
                let raw_line = caps.get(0).map_or("", |m| m.as_str()).trim_start();
                Some(Token {
                    raw_line: raw_line.to_string(),
                    key,
                    value,
                    conditional: caps.get(3).map(|m| m.as_str().to_string()),
                    comment: caps.get(4).map(|m| m.as_str().to_string()),
                })
            })
            .filter(|token| self.keep_source_tokens || !token.is_source_token())
            .collect();

        debug!("tokenize ({}): {} token(s)", self.mode, tokens.len());
        tokens
    }
}

/// Tokenizes `body` with a tokenizer built from `options`.
pub fn tokenize(body: &str, options: &ParseOptions) -> Result<Vec<Token>, Error> {
    Ok(Tokenizer::new(options)?.tokenize(body))
}
