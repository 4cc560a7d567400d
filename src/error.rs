//! All error types for the vdfloc crate.
//!
//! Low-level failures (I/O, decoding, pattern compilation, malformed JSON) are
//! fatal for the document being processed. Structural findings are only turned
//! into an [`Error::Structural`] when the caller asks a report to do so.

use thiserror::Error;

use crate::validation::StructuralIssue;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    #[error("unknown charset mode `{0}`, expected `strict` or `fuzzy`")]
    UnknownCharsetMode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid data: {0}")]
    DataMismatch(String),

    #[error("unknown language `{0}`")]
    UnknownLanguage(String),

    #[error("invalid language configuration: {0}")]
    InvalidConfig(String),

    #[error("{issue}: {}", offenders.join(", "))]
    Structural {
        issue: StructuralIssue,
        offenders: Vec<String>,
    },

    #[error("{stage} failed for `{path}`: {source}")]
    Document {
        path: String,
        stage: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps an error with the file and pipeline stage it happened in.
    pub fn in_document(path: impl Into<String>, stage: &'static str, source: Error) -> Self {
        Error::Document {
            path: path.into(),
            stage,
            source: Box::new(source),
        }
    }

    /// Creates an aggregate structural error.
    pub fn structural(issue: StructuralIssue, offenders: Vec<String>) -> Self {
        Error::Structural { issue, offenders }
    }

    /// Returns true for errors that are findings about the data rather than
    /// failures to process it.
    pub fn is_structural(&self) -> bool {
        match self {
            Error::Structural { .. } => true,
            Error::Document { source, .. } => source.is_structural(),
            _ => false,
        }
    }
}
