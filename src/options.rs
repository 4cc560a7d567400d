//! Per-document tokenizer and decoding options.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::Error;

/// Default maximum number of bytes a token key may hold.
pub const DEFAULT_MAX_KEY_LEN: usize = 120;

/// Default length of the UTF-8 probe run on files without a byte-order mark.
pub const DEFAULT_PROBE_LEN: usize = 4 * 32 * 1024;

/// Key charset applied by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharsetMode {
    /// Keys restricted to the VDF key allow-list.
    #[default]
    Strict,
    /// Any run of non-quote characters is accepted as a key. Used to probe
    /// corrupted files, typically before running the key validity check.
    Fuzzy,
}

impl Display for CharsetMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CharsetMode::Strict => write!(f, "strict"),
            CharsetMode::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

impl FromStr for CharsetMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(CharsetMode::Strict),
            "fuzzy" => Ok(CharsetMode::Fuzzy),
            other => Err(Error::UnknownCharsetMode(other.to_string())),
        }
    }
}

/// Read behavior options carried by each document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Key charset used by the tokenizer.
    pub charset_mode: CharsetMode,
    /// Keep tokens whose key starts with the `[english]` source marker.
    pub keep_source_tokens: bool,
    /// Longest key accepted by the key validity check.
    pub max_key_len: usize,
    /// Number of leading bytes probed for UTF-8 when no BOM is present.
    pub probe_len: usize,
    /// Encoding label forced on files without a BOM. Skips the UTF-8 probe.
    pub encoding: Option<String>,
    /// Encoding label used when there is no BOM and the UTF-8 probe fails.
    pub fallback_encoding: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            charset_mode: CharsetMode::Strict,
            keep_source_tokens: false,
            max_key_len: DEFAULT_MAX_KEY_LEN,
            probe_len: DEFAULT_PROBE_LEN,
            encoding: None,
            fallback_encoding: None,
        }
    }
}

impl ParseOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tokenizer charset mode.
    pub fn with_charset_mode(mut self, charset_mode: CharsetMode) -> Self {
        self.charset_mode = charset_mode;
        self
    }

    /// Keeps or drops `[english]` source tokens.
    pub fn with_source_tokens(mut self, keep_source_tokens: bool) -> Self {
        self.keep_source_tokens = keep_source_tokens;
        self
    }

    /// Sets the maximum key length.
    pub fn with_max_key_len(mut self, max_key_len: usize) -> Self {
        self.max_key_len = max_key_len;
        self
    }

    /// Sets the UTF-8 probe length.
    pub fn with_probe_len(mut self, probe_len: usize) -> Self {
        self.probe_len = probe_len;
        self
    }

    /// Forces an encoding for files without a byte-order mark.
    pub fn with_encoding(mut self, encoding: Option<String>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the encoding label used when detection finds nothing.
    pub fn with_fallback_encoding(mut self, fallback_encoding: Option<String>) -> Self {
        self.fallback_encoding = fallback_encoding;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::new();
        assert_eq!(options.charset_mode, CharsetMode::Strict);
        assert!(!options.keep_source_tokens);
        assert_eq!(options.max_key_len, 120);
        assert_eq!(options.probe_len, 131_072);
        assert!(options.encoding.is_none());
        assert!(options.fallback_encoding.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = ParseOptions::new()
            .with_charset_mode(CharsetMode::Fuzzy)
            .with_source_tokens(true)
            .with_max_key_len(64)
            .with_probe_len(16)
            .with_encoding(Some("utf-16le".to_string()))
            .with_fallback_encoding(Some("windows-1252".to_string()));
        assert_eq!(options.charset_mode, CharsetMode::Fuzzy);
        assert!(options.keep_source_tokens);
        assert_eq!(options.max_key_len, 64);
        assert_eq!(options.probe_len, 16);
        assert_eq!(options.encoding.as_deref(), Some("utf-16le"));
        assert_eq!(options.fallback_encoding.as_deref(), Some("windows-1252"));
    }

    #[test]
    fn test_charset_mode_from_str() {
        assert_eq!(CharsetMode::from_str("Strict").unwrap(), CharsetMode::Strict);
        assert_eq!(CharsetMode::from_str(" fuzzy ").unwrap(), CharsetMode::Fuzzy);
        assert!(matches!(
            CharsetMode::from_str("loose"),
            Err(Error::UnknownCharsetMode(ref mode)) if mode == "loose"
        ));
        assert_eq!(CharsetMode::Fuzzy.to_string(), "fuzzy");
    }
}
