//! Core types shared by the tokenizer, validators and codecs.

use std::fmt::Display;

use crate::encoding::TextEncoding;

/// Key prefix of tokens carrying the source-language string next to the
/// translation.
pub const SOURCE_TOKEN_MARKER: &str = "[english]";

/// One `"key" "value" [cond] // comment` line of a loc file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The matched line, from its first non-blank character.
    pub raw_line: String,
    pub key: String,
    /// Raw value text. Escape sequences such as `\"` are kept as written.
    pub value: String,
    /// Bracketed build conditional, brackets included (e.g. `[$WIN32]`).
    pub conditional: Option<String>,
    /// Trailing comment, `//` marker included.
    pub comment: Option<String>,
}

impl Token {
    /// Creates a token with no conditional and no comment.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut token = Token {
            raw_line: String::new(),
            key: key.into(),
            value: value.into(),
            conditional: None,
            comment: None,
        };
        token.raw_line = token.to_string();
        token
    }

    /// Attaches a build conditional.
    pub fn with_conditional(mut self, conditional: impl Into<String>) -> Self {
        self.conditional = Some(conditional.into());
        self.raw_line = self.to_string();
        self
    }

    /// Key and conditional concatenated; the identity used for uniqueness.
    pub fn composite_key(&self) -> String {
        match &self.conditional {
            Some(conditional) => format!("{}{}", self.key, conditional),
            None => self.key.clone(),
        }
    }

    /// True for `[english]` reference tokens.
    pub fn is_source_token(&self) -> bool {
        self.key.starts_with(SOURCE_TOKEN_MARKER)
    }
}

/// Renders the token as a tab separated VDF line, without line terminator.
impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"\t\"{}\"", self.key, self.value)?;
        if let Some(conditional) = &self.conditional {
            write!(f, "\t{}", conditional)?;
        }
        if let Some(comment) = &self.comment {
            write!(f, "\t{}", comment)?;
        }
        Ok(())
    }
}

/// The section openers wrapping the tokens and the matching closers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderEnvelope {
    pub header: String,
    pub footer: String,
}

/// A whole loc file: encoding, envelope and tokens in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VdfDocument {
    /// `None` for documents decoded from an empty buffer.
    pub encoding: Option<TextEncoding>,
    pub envelope: HeaderEnvelope,
    pub tokens: Vec<Token>,
}

impl VdfDocument {
    /// Keys of all tokens except `[english]` reference tokens.
    pub fn token_names(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|token| !token.is_source_token())
            .map(|token| token.key.as_str())
            .collect()
    }

    /// Tokens carrying a build conditional, `[english]` tokens excluded.
    pub fn tokens_with_conditionals(&self) -> Vec<&Token> {
        self.tokens
            .iter()
            .filter(|token| !token.is_source_token() && token.conditional.is_some())
            .collect()
    }
}
