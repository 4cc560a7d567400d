//! Toolkit for Valve VDF localization files.
//!
//! Decodes loc files in any of the encodings they ship in, splits the section
//! header from the token body, tokenizes `"key" "value" [cond] // comment`
//! lines, runs structural checks and the plural/gender placeholder grammar
//! check, and converts documents to and from a flat, order-preserving JSON
//! form.
//!
//! ```rust,no_run
//! use vdfloc::{ParseOptions, SourceDocument};
//!
//! let document = SourceDocument::open("resource/csgo_french.txt", ParseOptions::default())?;
//! document.validate()?;
//! for name in document.token_names()? {
//!     println!("{name}");
//! }
//! # Ok::<(), vdfloc::Error>(())
//! ```

#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod encoding;
pub mod error;
pub mod formats;
pub mod grammar;
pub mod header;
pub mod options;
pub mod source;
pub mod tokenizer;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export most used types for easy consumption
pub use crate::{
    codec::{convert, convert_auto, infer_format_from_extension},
    config::{LanguageAttributes, LanguageAttributesProvider, LanguageConfig},
    encoding::{TextEncoding, decode},
    error::Error,
    formats::FormatType,
    grammar::{GrammarIssue, GrammarValidator, PlaceholderKind},
    header::split_header,
    options::{CharsetMode, ParseOptions},
    source::{SourceDocument, english_file_name},
    tokenizer::Tokenizer,
    traits::Parser,
    types::{HeaderEnvelope, Token, VdfDocument},
    validation::{StructuralIssue, StructuralReport},
};
