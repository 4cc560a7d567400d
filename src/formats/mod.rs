//! File formats a loc document can be read from and written to.
//!
//! The VDF text format is implemented directly on [`VdfDocument`](crate::types::VdfDocument);
//! the flat JSON form lives behind [`JsonFormat`].

pub mod json;
pub mod vdf;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

pub use json::Format as JsonFormat;

use crate::Error;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Valve loc text file (`.txt`, `.vdf`).
    Vdf,
    /// Flat JSON object of fields (`.json`).
    Json,
}

/// Implements [`std::fmt::Display`] for [`FormatType`].
///
/// # Example
/// ```rust
/// use vdfloc::formats::FormatType;
/// assert_eq!(FormatType::Vdf.to_string(), "vdf");
/// assert_eq!(FormatType::Json.to_string(), "json");
/// ```
impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Vdf => write!(f, "vdf"),
            FormatType::Json => write!(f, "json"),
        }
    }
}

/// Accepts `vdf`, `txt` and `json`, case-insensitively.
///
/// Returns [`crate::error::Error::UnknownFormat`] for unknown strings.
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "vdf" | "txt" => Ok(FormatType::Vdf),
            "json" => Ok(FormatType::Json),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

impl FormatType {
    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Vdf => "txt",
            FormatType::Json => "json",
        }
    }
}
