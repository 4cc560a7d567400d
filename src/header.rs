//! Header/footer demarcation of a VDF loc file.
//!
//! A loc file wraps its tokens in named sections:
//!
//! ```text
//! "lang"
//! {
//!     "Language" "french"
//!     "Tokens"
//!     {
//!         "key" "value"
//!     }
//! }
//! ```
//!
//! The openers at the top are kept verbatim as the header; the footer is
//! rebuilt as one closing brace per opener. This is a heuristic scan rather
//! than a bracket parser, and escaped quotes inside section names are not
//! understood.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::types::HeaderEnvelope;

lazy_static! {
    static ref SECTION_OPENER: Regex =
        Regex::new(r#"(?mi)^\s*"[a-z]{1,15}"\s*\{"#).expect("valid section opener pattern");
}

/// Splits a decoded buffer into its body and header envelope.
///
/// Each opener found advances the scan past its brace. The header runs from
/// the start of the buffer to the end of the last opener. No opener yields an
/// empty envelope and the whole buffer as body.
pub fn split_header(buf: &str) -> (&str, HeaderEnvelope) {
    let mut end = 0;
    let mut openers = 0;
    while let Some(found) = SECTION_OPENER.find_at(buf, end) {
        end = found.end();
        openers += 1;
    }

    debug!("split_header: {} section opener(s), header is {} bytes", openers, end);

    let envelope = HeaderEnvelope {
        header: buf[..end].to_string(),
        footer: "}".repeat(openers),
    };
    (&buf[end..], envelope)
}
