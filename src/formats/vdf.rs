//! Support for the VDF loc text format.
//!
//! Reading runs the whole pipeline (decode, split header, tokenize); writing
//! lays tokens out one per line, tab separated, CRLF terminated, and encodes
//! the text back to the document's encoding.

use std::io::{BufRead, Write};

use log::debug;

use crate::{
    encoding::{decode, encode},
    error::Error,
    header::split_header,
    options::ParseOptions,
    tokenizer::Tokenizer,
    traits::Parser,
    types::VdfDocument,
};

/// Line terminator used by Valve loc files.
pub const LINE_END: &str = "\r\n";

impl VdfDocument {
    /// Parses raw file bytes with explicit options.
    pub fn from_bytes_with(bytes: &[u8], options: &ParseOptions) -> Result<Self, Error> {
        let (text, encoding) = decode(bytes, options)?;
        Self::from_text_with(&text, encoding, options)
    }

    /// Parses already decoded text.
    pub fn from_text_with(
        text: &str,
        encoding: Option<crate::encoding::TextEncoding>,
        options: &ParseOptions,
    ) -> Result<Self, Error> {
        let (body, envelope) = split_header(text);
        let tokens = Tokenizer::new(options)?.tokenize(body);
        Ok(VdfDocument {
            encoding,
            envelope,
            tokens,
        })
    }

    /// Renders the document as VDF text, before encoding.
    pub fn to_vdf_string(&self) -> String {
        let mut content = String::new();
        content.push_str(&self.envelope.header);
        content.push_str(LINE_END);
        content.push_str(LINE_END);
        for token in &self.tokens {
            content.push_str(&token.to_string());
            content.push_str(LINE_END);
        }
        content.push_str(LINE_END);
        content.push_str(&self.envelope.footer);
        content
    }
}

impl Parser for VdfDocument {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        Self::from_reader_with(reader, &ParseOptions::default())
    }

    /// Reads the whole stream, then decodes and tokenizes it with `options`.
    fn from_reader_with<R: BufRead>(mut reader: R, options: &ParseOptions) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes_with(&bytes, options)
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let content = self.to_vdf_string();
        debug!(
            "writing {} token(s) as {}",
            self.tokens.len(),
            self.encoding
                .map_or_else(|| "UTF8".to_string(), |encoding| encoding.to_string())
        );
        writer
            .write_all(&encode(&content, self.encoding))
            .map_err(Error::Io)
    }
}
