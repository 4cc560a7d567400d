//! An opened loc file and the queries run against it.

use std::collections::HashMap;
use std::path::Path;

use log::debug;

use crate::{
    encoding::{TextEncoding, decode},
    error::Error,
    header::split_header,
    options::{CharsetMode, ParseOptions},
    tokenizer::Tokenizer,
    types::{HeaderEnvelope, Token, VdfDocument},
    validation::{
        StructuralReport, check_empty_string_values, check_isolated_conditionals,
        check_key_uniqueness, check_key_validity,
    },
};

/// A loc file read into memory and decoded once.
///
/// The raw bytes are kept next to the decoded text. Every query re-tokenizes
/// the text with the document's [`ParseOptions`]; the key validity check
/// always tokenizes in fuzzy mode so malformed keys are still seen.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    name: String,
    bytes: Vec<u8>,
    encoding: Option<TextEncoding>,
    text: String,
    options: ParseOptions,
}

impl SourceDocument {
    /// Reads and decodes the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self, Error> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let bytes =
            std::fs::read(path).map_err(|e| Error::in_document(name.clone(), "open", e.into()))?;
        Self::from_bytes(name, bytes, options)
    }

    /// Decodes an in-memory buffer. `name` is only used in error messages and
    /// for [`english_file_name`](Self::english_file_name).
    pub fn from_bytes(
        name: impl Into<String>,
        bytes: Vec<u8>,
        options: ParseOptions,
    ) -> Result<Self, Error> {
        let name = name.into();
        let (text, encoding) =
            decode(&bytes, &options).map_err(|e| Error::in_document(name.clone(), "decode", e))?;
        debug!("opened `{}`: {} byte(s)", name, bytes.len());
        Ok(SourceDocument {
            name,
            bytes,
            encoding,
            text,
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Detected encoding, `None` for an empty file.
    pub fn encoding(&self) -> Option<TextEncoding> {
        self.encoding
    }

    /// Decoded text, BOM removed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Token body and header envelope.
    pub fn split(&self) -> (&str, HeaderEnvelope) {
        split_header(&self.text)
    }

    /// All tokens of the body, in file order, tokenized with the document's
    /// options.
    pub fn tokens(&self) -> Result<Vec<Token>, Error> {
        self.tokens_in(self.options.charset_mode)
    }

    fn tokens_in(&self, charset_mode: CharsetMode) -> Result<Vec<Token>, Error> {
        let options = self.options.clone().with_charset_mode(charset_mode);
        let tokenizer = Tokenizer::new(&options)
            .map_err(|e| Error::in_document(self.name.clone(), "tokenize", e))?;
        Ok(tokenizer.tokenize(self.split().0))
    }

    /// Keys of every token, `[english]` tokens excluded.
    pub fn token_names(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .tokens()?
            .into_iter()
            .filter(|token| !token.is_source_token())
            .map(|token| token.key)
            .collect())
    }

    /// Tokens carrying a build conditional, `[english]` tokens excluded.
    pub fn tokens_with_conditionals(&self) -> Result<Vec<Token>, Error> {
        Ok(self
            .tokens()?
            .into_iter()
            .filter(|token| !token.is_source_token() && token.conditional.is_some())
            .collect())
    }

    /// Key to value map. Later tokens overwrite earlier ones with the same key.
    pub fn token_map(&self) -> Result<HashMap<String, String>, Error> {
        Ok(self
            .tokens()?
            .into_iter()
            .filter(|token| !token.is_source_token())
            .map(|token| (token.key, token.value))
            .collect())
    }

    /// The whole document, ready for conversion.
    pub fn to_document(&self) -> Result<VdfDocument, Error> {
        let (body, envelope) = self.split();
        let tokenizer = Tokenizer::new(&self.options)
            .map_err(|e| Error::in_document(self.name.clone(), "tokenize", e))?;
        Ok(VdfDocument {
            encoding: self.encoding,
            envelope,
            tokens: tokenizer.tokenize(body),
        })
    }

    /// Runs the structural checks: key validity (fuzzy tokens), isolated
    /// conditionals (whole text), key uniqueness and empty-string values.
    pub fn structural_reports(&self) -> Result<Vec<StructuralReport>, Error> {
        let fuzzy = self.tokens_in(CharsetMode::Fuzzy)?;
        let tokens = self.tokens()?;
        Ok(vec![
            check_key_validity(&fuzzy, self.options.max_key_len),
            check_isolated_conditionals(&self.text),
            check_key_uniqueness(&tokens),
            check_empty_string_values(&tokens),
        ])
    }

    /// Fails with the first non clean structural report, tagged with the
    /// document name.
    pub fn validate(&self) -> Result<(), Error> {
        for report in self.structural_reports()? {
            report
                .into_result()
                .map_err(|e| Error::in_document(self.name.clone(), "validate", e))?;
        }
        Ok(())
    }

    /// Name of the matching English loc file. See [`english_file_name`].
    pub fn english_file_name(&self) -> Result<String, Error> {
        english_file_name(&self.name)
    }
}

/// Maps a loc file name to the name of its English counterpart.
///
/// The language is the part after the last `_` of the file stem; a stem
/// without `_` is the language itself. Any directory part is dropped.
///
/// # Example
/// ```rust
/// use vdfloc::source::english_file_name;
/// assert_eq!(english_file_name("resource/csgo_french.txt").unwrap(), "csgo_english.txt");
/// assert_eq!(english_file_name("french.txt").unwrap(), "english.txt");
/// ```
pub fn english_file_name(loc_file_name: &str) -> Result<String, Error> {
    let path = Path::new(loc_file_name);
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            Error::DataMismatch(format!("`{}` is not a loc file name", loc_file_name))
        })?;
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| format!(".{}", extension))
        .unwrap_or_default();

    Ok(match stem.rfind('_') {
        Some(idx) => format!("{}_english{}", &stem[..idx], extension),
        None => format!("english{}", extension),
    })
}
