//! Conversion between the VDF and JSON forms of a loc file.
//!
//! Both directions go through [`VdfDocument`], so a VDF file can also be
//! rewritten as VDF (for instance to normalize its layout) and a JSON file
//! re-emitted as JSON.

use std::path::Path;

use log::debug;

use crate::{
    error::Error,
    formats::{FormatType, JsonFormat},
    options::ParseOptions,
    traits::Parser,
    types::VdfDocument,
};

/// Infers a [`FormatType`] from a file path's extension.
///
/// # Example
/// ```rust
/// use vdfloc::{codec::infer_format_from_extension, formats::FormatType};
/// assert_eq!(infer_format_from_extension("resource/game_french.txt"), Some(FormatType::Vdf));
/// assert_eq!(infer_format_from_extension("game_french.json"), Some(FormatType::Json));
/// assert_eq!(infer_format_from_extension("Localizable.strings"), None);
/// ```
pub fn infer_format_from_extension<P: AsRef<Path>>(path: P) -> Option<FormatType> {
    let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "txt" | "vdf" => Some(FormatType::Vdf),
        "json" => Some(FormatType::Json),
        _ => None,
    }
}

/// Reads a document in `format`. VDF input is decoded according to `options`.
pub fn read_document<P: AsRef<Path>>(
    path: P,
    format: FormatType,
    options: &ParseOptions,
) -> Result<VdfDocument, Error> {
    let path = path.as_ref();
    let result = match format {
        FormatType::Vdf => VdfDocument::read_from_with(path, options),
        FormatType::Json => JsonFormat::read_from_with(path, options).map(VdfDocument::from),
    };
    result.map_err(|e| Error::in_document(path.display().to_string(), "read", e))
}

/// Writes a document in `format`. VDF output keeps the document's encoding.
pub fn write_document<P: AsRef<Path>>(
    document: &VdfDocument,
    path: P,
    format: FormatType,
) -> Result<(), Error> {
    let path = path.as_ref();
    let result = match format {
        FormatType::Vdf => document.write_to(path),
        FormatType::Json => JsonFormat::from(document.clone()).write_to(path),
    };
    result.map_err(|e| Error::in_document(path.display().to_string(), "write", e))
}

/// Converts a loc file from one format to another.
///
/// # Example
///
/// ```rust,no_run
/// use vdfloc::{codec::convert, formats::FormatType};
/// convert(
///     "resource/game_french.txt",
///     FormatType::Vdf,
///     "game_french.json",
///     FormatType::Json,
/// )?;
/// # Ok::<(), vdfloc::Error>(())
/// ```
pub fn convert<P: AsRef<Path>>(
    input: P,
    input_format: FormatType,
    output: P,
    output_format: FormatType,
) -> Result<(), Error> {
    convert_with_options(
        input,
        input_format,
        output,
        output_format,
        &ParseOptions::default(),
    )
}

/// Like [`convert`], with explicit options for decoding VDF input.
pub fn convert_with_options<P: AsRef<Path>>(
    input: P,
    input_format: FormatType,
    output: P,
    output_format: FormatType,
    options: &ParseOptions,
) -> Result<(), Error> {
    debug!(
        "converting `{}` ({}) to `{}` ({})",
        input.as_ref().display(),
        input_format,
        output.as_ref().display(),
        output_format
    );
    let document = read_document(input, input_format, options)?;
    write_document(&document, output, output_format)
}

/// Converts a loc file, inferring both formats from the file extensions.
///
/// # Errors
///
/// Returns [`Error::UnknownFormat`] when an extension is not recognized.
pub fn convert_auto<P: AsRef<Path>>(input: P, output: P) -> Result<(), Error> {
    let input_format = infer_format_from_extension(&input).ok_or_else(|| {
        Error::UnknownFormat(format!(
            "cannot infer input format from `{}`",
            input.as_ref().display()
        ))
    })?;
    let output_format = infer_format_from_extension(&output).ok_or_else(|| {
        Error::UnknownFormat(format!(
            "cannot infer output format from `{}`",
            output.as_ref().display()
        ))
    })?;
    convert(input, input_format, output, output_format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::TextEncoding;
    use crate::formats::json::ENCODING_FIELD;

    const VDF: &str = "\"lang\"\r\n{\r\n\"Tokens\"\r\n{\r\n\"a\"\t\"1\"\t[$WIN32]\r\n\"b\"\t\"2\"\r\n}\r\n}\r\n";

    #[test]
    fn test_infer_format_is_case_insensitive() {
        assert_eq!(infer_format_from_extension("X.VDF"), Some(FormatType::Vdf));
        assert_eq!(infer_format_from_extension("x.Json"), Some(FormatType::Json));
        assert_eq!(infer_format_from_extension("noext"), None);
    }

    #[test]
    fn test_vdf_to_json_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let vdf = dir.path().join("game_french.txt");
        let json = dir.path().join("game_french.json");
        let back = dir.path().join("game_french_back.txt");
        std::fs::write(&vdf, VDF).unwrap();

        convert_auto(&vdf, &json).unwrap();
        let json_text = std::fs::read_to_string(&json).unwrap();
        assert!(json_text.contains(ENCODING_FIELD));
        assert!(json_text.contains("\"a[[$WIN32]]\": \"1\""));

        convert_auto(&json, &back).unwrap();
        let original = VdfDocument::read_from(&vdf).unwrap();
        let reread = VdfDocument::read_from(&back).unwrap();
        assert_eq!(reread.envelope, original.envelope);
        assert_eq!(reread.tokens, original.tokens);
        assert_eq!(reread.encoding, Some(TextEncoding::Utf8));
    }

    #[test]
    fn test_unknown_extension() {
        let err = convert_auto("a.txt", "b.xml").unwrap_err();
        assert!(matches!(err, Error::UnknownFormat(_)));
    }

    #[test]
    fn test_missing_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let out = dir.path().join("out.json");
        let err = convert(&missing, FormatType::Vdf, &out, FormatType::Json).unwrap_err();
        match err {
            Error::Document { path, stage, source } => {
                assert!(path.ends_with("missing.txt"));
                assert_eq!(stage, "read");
                assert!(matches!(*source, Error::Io(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
