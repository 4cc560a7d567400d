//! Character encoding detection for VDF localization files.
//!
//! Valve ships loc files as UTF-8 (with or without BOM) and UTF-16, and the odd
//! UTF-32 file turns up in older branches. Detection is BOM first, then a bounded
//! UTF-8 probe, then a caller supplied fallback label.

use std::fmt::{Display, Formatter};
use std::io::{self, Cursor, Read};
use std::str::FromStr;

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use encoding_rs_io::DecodeReaderBytesBuilder;
use log::{debug, warn};

use crate::{error::Error, options::ParseOptions};

pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
pub const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
pub const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];
pub const UTF32LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
pub const UTF32BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

/// Encoding tag of a decoded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    /// A non-Unicode encoding selected by label (e.g. `windows-1252`).
    Legacy(&'static Encoding),
}

impl TextEncoding {
    /// Byte-order mark written in front of text in this encoding.
    pub fn bom(&self) -> &'static [u8] {
        match self {
            TextEncoding::Utf8 | TextEncoding::Legacy(_) => &[],
            TextEncoding::Utf8Bom => UTF8_BOM,
            TextEncoding::Utf16Le => UTF16LE_BOM,
            TextEncoding::Utf16Be => UTF16BE_BOM,
            TextEncoding::Utf32Le => UTF32LE_BOM,
            TextEncoding::Utf32Be => UTF32BE_BOM,
        }
    }

    /// Looks up a BOM at the start of `bytes`.
    ///
    /// The 4-byte UTF-32 marks are tried before UTF-16: `FF FE 00 00` also starts
    /// with the UTF-16LE mark, and a NUL NUL pair is unlikely in a text file.
    pub fn from_bom(bytes: &[u8]) -> Option<TextEncoding> {
        [
            TextEncoding::Utf8Bom,
            TextEncoding::Utf32Le,
            TextEncoding::Utf32Be,
            TextEncoding::Utf16Le,
            TextEncoding::Utf16Be,
        ]
        .into_iter()
        .find(|encoding| bytes.starts_with(encoding.bom()))
    }

    /// Resolves an encoding label. Accepts the tags produced by [`Display`] as
    /// well as any WHATWG label known to `encoding_rs`.
    pub fn from_label(label: &str) -> Result<TextEncoding, Error> {
        let normalized = label.trim().to_ascii_uppercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "UTF8" => return Ok(TextEncoding::Utf8),
            "UTF8BOM" => return Ok(TextEncoding::Utf8Bom),
            "UTF16LE" => return Ok(TextEncoding::Utf16Le),
            "UTF16BE" => return Ok(TextEncoding::Utf16Be),
            "UTF32LE" => return Ok(TextEncoding::Utf32Le),
            "UTF32BE" => return Ok(TextEncoding::Utf32Be),
            _ => {}
        }

        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| Error::Encoding(format!("unsupported encoding `{}`", label)))?;
        Ok(if encoding == UTF_8 {
            TextEncoding::Utf8
        } else if encoding == UTF_16LE {
            TextEncoding::Utf16Le
        } else if encoding == UTF_16BE {
            TextEncoding::Utf16Be
        } else {
            TextEncoding::Legacy(encoding)
        })
    }
}

impl Display for TextEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "UTF8"),
            TextEncoding::Utf8Bom => write!(f, "UTF8BOM"),
            TextEncoding::Utf16Le => write!(f, "UTF16LE"),
            TextEncoding::Utf16Be => write!(f, "UTF16BE"),
            TextEncoding::Utf32Le => write!(f, "UTF32LE"),
            TextEncoding::Utf32Be => write!(f, "UTF32BE"),
            TextEncoding::Legacy(encoding) => write!(f, "{}", encoding.name()),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextEncoding::from_label(s)
    }
}

/// Returns a reader yielding the decoded UTF-8 text of `bytes`, without BOM,
/// and the detected encoding. Empty input yields an empty reader and no tag.
pub fn utf_reader<'a>(
    bytes: &'a [u8],
    options: &ParseOptions,
) -> Result<(Box<dyn Read + 'a>, Option<TextEncoding>), Error> {
    if bytes.is_empty() {
        debug!("empty input, nothing to decode");
        return Ok((Box::new(io::empty()), None));
    }

    let (encoding, has_bom) = detect(bytes, options)?;
    debug!("detected encoding {} (BOM: {})", encoding, has_bom);

    let body = if has_bom {
        &bytes[encoding.bom().len()..]
    } else {
        bytes
    };
    let reader: Box<dyn Read + 'a> = match encoding {
        TextEncoding::Utf8 | TextEncoding::Utf8Bom => transcoder(body, UTF_8),
        TextEncoding::Utf16Le => transcoder(body, UTF_16LE),
        TextEncoding::Utf16Be => transcoder(body, UTF_16BE),
        TextEncoding::Utf32Le => Box::new(Cursor::new(decode_utf32(body, false).into_bytes())),
        TextEncoding::Utf32Be => Box::new(Cursor::new(decode_utf32(body, true).into_bytes())),
        TextEncoding::Legacy(legacy) => transcoder(body, legacy),
    };

    Ok((reader, Some(encoding)))
}

/// Decodes a whole buffer to a `String`.
pub fn decode(bytes: &[u8], options: &ParseOptions) -> Result<(String, Option<TextEncoding>), Error> {
    let (mut reader, encoding) = utf_reader(bytes, options)?;
    let mut decoded = String::new();
    reader.read_to_string(&mut decoded)?;
    Ok((decoded, encoding))
}

/// Encodes text in `encoding` (UTF-8 when `None`), BOM included.
pub fn encode(text: &str, encoding: Option<TextEncoding>) -> Vec<u8> {
    let Some(encoding) = encoding else {
        return text.as_bytes().to_vec();
    };

    let mut out = encoding.bom().to_vec();
    match encoding {
        TextEncoding::Utf8 | TextEncoding::Utf8Bom => out.extend_from_slice(text.as_bytes()),
        TextEncoding::Utf16Le => out.extend(text.encode_utf16().flat_map(u16::to_le_bytes)),
        TextEncoding::Utf16Be => out.extend(text.encode_utf16().flat_map(u16::to_be_bytes)),
        TextEncoding::Utf32Le => out.extend(text.chars().flat_map(|c| (c as u32).to_le_bytes())),
        TextEncoding::Utf32Be => out.extend(text.chars().flat_map(|c| (c as u32).to_be_bytes())),
        TextEncoding::Legacy(legacy) => out.extend_from_slice(&legacy.encode(text).0),
    }
    out
}

/// Picks the encoding of `bytes`; the flag is set when it came from a BOM
/// actually present at the start of the buffer.
fn detect(bytes: &[u8], options: &ParseOptions) -> Result<(TextEncoding, bool), Error> {
    if let Some(encoding) = TextEncoding::from_bom(bytes) {
        return Ok((encoding, true));
    }

    if let Some(label) = &options.encoding {
        return TextEncoding::from_label(label).map(|encoding| (encoding, false));
    }

    if is_probably_utf8(bytes, options.probe_len) {
        return Ok((TextEncoding::Utf8, false));
    }

    match &options.fallback_encoding {
        Some(label) => {
            warn!("UTF-8 probe failed, falling back to `{}`", label);
            TextEncoding::from_label(label).map(|encoding| (encoding, false))
        }
        None => {
            warn!("UTF-8 probe failed, decoding as UTF-8 with replacement characters");
            Ok((TextEncoding::Utf8, false))
        }
    }
}

/// Checks that the first `probe_len` bytes are valid UTF-8. A multi-byte
/// sequence cut by the probe boundary does not count as invalid.
fn is_probably_utf8(bytes: &[u8], probe_len: usize) -> bool {
    let truncated = bytes.len() > probe_len;
    let probe = &bytes[..probe_len.min(bytes.len())];
    match std::str::from_utf8(probe) {
        Ok(_) => true,
        Err(e) => truncated && e.error_len().is_none(),
    }
}

fn transcoder<'a>(body: &'a [u8], encoding: &'static Encoding) -> Box<dyn Read + 'a> {
    Box::new(
        DecodeReaderBytesBuilder::new()
            .encoding(Some(encoding))
            .bom_sniffing(false)
            .build(body),
    )
}

fn decode_utf32(body: &[u8], big_endian: bool) -> String {
    let mut decoded = String::with_capacity(body.len() / 4);
    let mut units = body.chunks_exact(4);
    for unit in &mut units {
        let bytes = [unit[0], unit[1], unit[2], unit[3]];
        let code = if big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        };
        decoded.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    if !units.remainder().is_empty() {
        decoded.push(char::REPLACEMENT_CHARACTER);
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_default(bytes: &[u8]) -> (String, Option<TextEncoding>) {
        decode(bytes, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let (text, encoding) = decode_default(&[]);
        assert!(text.is_empty());
        assert!(encoding.is_none());
    }

    #[test]
    fn test_plain_utf8() {
        let (text, encoding) = decode_default("\"key\"\t\"Trésor\"".as_bytes());
        assert_eq!(text, "\"key\"\t\"Trésor\"");
        assert_eq!(encoding, Some(TextEncoding::Utf8));
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("\"lang\"".as_bytes());
        let (text, encoding) = decode_default(&bytes);
        assert_eq!(text, "\"lang\"");
        assert_eq!(encoding, Some(TextEncoding::Utf8Bom));
    }

    #[test]
    fn test_utf16_boms() {
        let le = encode("\"clé\"", Some(TextEncoding::Utf16Le));
        assert!(le.starts_with(UTF16LE_BOM));
        let (text, encoding) = decode_default(&le);
        assert_eq!(text, "\"clé\"");
        assert_eq!(encoding, Some(TextEncoding::Utf16Le));

        let be = encode("\"clé\"", Some(TextEncoding::Utf16Be));
        let (text, encoding) = decode_default(&be);
        assert_eq!(text, "\"clé\"");
        assert_eq!(encoding, Some(TextEncoding::Utf16Be));
    }

    #[test]
    fn test_utf32_boms_win_over_utf16() {
        let le = encode("ab", Some(TextEncoding::Utf32Le));
        assert_eq!(&le[..4], UTF32LE_BOM);
        let (text, encoding) = decode_default(&le);
        assert_eq!(text, "ab");
        assert_eq!(encoding, Some(TextEncoding::Utf32Le));

        let be = encode("日本", Some(TextEncoding::Utf32Be));
        let (text, encoding) = decode_default(&be);
        assert_eq!(text, "日本");
        assert_eq!(encoding, Some(TextEncoding::Utf32Be));
    }

    #[test]
    fn test_utf32_trailing_garbage_is_replaced() {
        let mut bytes = encode("a", Some(TextEncoding::Utf32Le));
        bytes.push(0x41);
        let (text, _) = decode_default(&bytes);
        assert_eq!(text, "a\u{FFFD}");
    }

    #[test]
    fn test_probe_tolerates_cut_sequence() {
        // "é" is two bytes; a probe of 2 cuts it in half.
        let bytes = "aé".as_bytes();
        assert!(is_probably_utf8(bytes, 2));
        assert!(!is_probably_utf8(&[b'a', 0xFF], 16));
        // Incomplete sequence at the real end of the file is invalid.
        assert!(!is_probably_utf8(&[b'a', 0xC3], 16));
    }

    #[test]
    fn test_fallback_encoding() {
        // 0xE9 is "é" in windows-1252 and invalid as UTF-8.
        let bytes = [b'"', 0xE9, b'"'];
        let options = ParseOptions::default().with_fallback_encoding(Some("windows-1252".into()));
        let (text, encoding) = decode(&bytes, &options).unwrap();
        assert_eq!(text, "\"é\"");
        assert_eq!(encoding.unwrap().to_string(), "windows-1252");
    }

    #[test]
    fn test_failed_probe_without_fallback_is_lossy_utf8() {
        let (text, encoding) = decode_default(&[b'a', 0xFF, b'b']);
        assert_eq!(text, "a\u{FFFD}b");
        assert_eq!(encoding, Some(TextEncoding::Utf8));
    }

    #[test]
    fn test_explicit_encoding_skips_probe() {
        let bytes = encode("hi", Some(TextEncoding::Utf16Le));
        let options = ParseOptions::default().with_encoding(Some("utf-16le".into()));
        let (text, encoding) = decode(&bytes[UTF16LE_BOM.len()..], &options).unwrap();
        assert_eq!(text, "hi");
        assert_eq!(encoding, Some(TextEncoding::Utf16Le));
    }

    #[test]
    fn test_forced_label_keeps_leading_bytes() {
        let options = ParseOptions::default().with_encoding(Some("utf-16le".into()));
        let (text, _) = decode(&[0x68, 0x00, 0x69, 0x00], &options).unwrap();
        assert_eq!(text, "hi");

        let options = ParseOptions::default().with_encoding(Some("UTF8BOM".into()));
        let (text, encoding) = decode(b"\"key\"\t\"v\"", &options).unwrap();
        assert_eq!(text, "\"key\"\t\"v\"");
        assert_eq!(encoding, Some(TextEncoding::Utf8Bom));
    }

    #[test]
    fn test_fallback_label_keeps_leading_bytes() {
        // Invalid UTF-8 first byte, windows-1252 has no BOM to strip.
        let options = ParseOptions::default().with_fallback_encoding(Some("windows-1252".into()));
        let (text, _) = decode(&[0xE9, b't', b'e'], &options).unwrap();
        assert_eq!(text, "éte");
    }

    #[test]
    fn test_unsupported_label() {
        let options = ParseOptions::default().with_encoding(Some("klingon-8".into()));
        let err = decode(b"abc", &options).err().unwrap();
        assert!(matches!(err, Error::Encoding(_)));
        assert!(TextEncoding::from_str("nope").is_err());
    }

    #[test]
    fn test_tag_round_trip_through_text() {
        for encoding in [
            TextEncoding::Utf8,
            TextEncoding::Utf8Bom,
            TextEncoding::Utf16Le,
            TextEncoding::Utf16Be,
            TextEncoding::Utf32Le,
            TextEncoding::Utf32Be,
        ] {
            assert_eq!(TextEncoding::from_str(&encoding.to_string()).unwrap(), encoding);
        }
        assert_eq!(TextEncoding::from_str("utf-8").unwrap(), TextEncoding::Utf8);
    }
}
