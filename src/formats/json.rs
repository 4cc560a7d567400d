//! Flat JSON form of a loc document.
//!
//! The document becomes a single JSON object whose fields appear in file
//! order: the encoding tag, the header, one field per token and the footer.
//! A token's conditional is folded into its field name, so
//! `"foo" "bar" [$WIN32]` becomes `"foo[[$WIN32]]": "bar"`.
//!
//! Reading goes through a map visitor rather than `serde_json::Value`, which
//! keeps field order and duplicate fields intact.

use std::fmt;
use std::io::{BufRead, Read, Write};

use log::debug;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::{
    encoding::TextEncoding,
    error::Error,
    traits::Parser,
    types::{HeaderEnvelope, Token, VdfDocument},
};

/// Field holding the encoding tag (empty when unknown).
pub const ENCODING_FIELD: &str = "!vdf file encoding!";
/// Field holding the text before the first token.
pub const HEADER_FIELD: &str = "!vdf file header!";
/// Field holding the closing braces.
pub const FOOTER_FIELD: &str = "!vdf file footer!";

/// A [`VdfDocument`] read from or written as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Format {
    pub document: VdfDocument,
}

impl From<VdfDocument> for Format {
    fn from(document: VdfDocument) -> Self {
        Format { document }
    }
}

impl From<Format> for VdfDocument {
    fn from(format: Format) -> Self {
        format.document
    }
}

impl Parser for Format {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        from_reader(reader).map(Format::from)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        to_writer(&self.document, writer)
    }
}

/// Field name for a token: the key, followed by the conditional in brackets
/// when there is one.
///
/// Fails when the name would not split back into the same key and
/// conditional, e.g. a key ending in `[[x]]` with no conditional.
pub fn fold_key(token: &Token) -> Result<String, Error> {
    let folded = match &token.conditional {
        Some(conditional) => format!("{}[{}]", token.key, conditional),
        None => token.key.clone(),
    };
    match unfold_key(&folded) {
        Ok((key, conditional)) if key == token.key && conditional == token.conditional => {
            Ok(folded)
        }
        _ => Err(Error::DataMismatch(format!(
            "token `{}` cannot be told apart from a folded conditional",
            token.composite_key()
        ))),
    }
}

/// Splits a field name back into key and conditional.
///
/// The conditional is the last `[[...]]` group closing the name, provided
/// its inside holds no `]`; names without that shape are plain keys. A name
/// that is nothing but a conditional has no key and is rejected.
pub fn unfold_key(field: &str) -> Result<(String, Option<String>), Error> {
    let plain = || Ok((field.to_string(), None));
    let Some(inner) = field.strip_suffix("]]") else {
        return plain();
    };
    let Some(start) = inner.rfind("[[") else {
        return plain();
    };
    let body = &inner[start + 2..];
    if body.contains(']') {
        return plain();
    }
    if start == 0 {
        return Err(Error::DataMismatch(format!(
            "field `{}` holds a conditional but no key",
            field
        )));
    }
    Ok((field[..start].to_string(), Some(format!("[{}]", body))))
}

/// Writes `document` as a pretty printed JSON object.
pub fn to_writer<W: Write>(document: &VdfDocument, writer: W) -> Result<(), Error> {
    debug!("encoding {} token(s) as JSON", document.tokens.len());
    serde_json::to_writer_pretty(writer, &OrderedFields::new(document)?)?;
    Ok(())
}

/// Renders `document` as a pretty printed JSON string.
pub fn to_string(document: &VdfDocument) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(&OrderedFields::new(document)?)?)
}

/// Reads a document from a JSON object.
pub fn from_reader<R: Read>(reader: R) -> Result<VdfDocument, Error> {
    let FieldList(fields) = serde_json::from_reader(reader)?;
    from_fields(fields)
}

/// Reads a document from a JSON string.
pub fn from_str(s: &str) -> Result<VdfDocument, Error> {
    let FieldList(fields) = serde_json::from_str(s)?;
    from_fields(fields)
}

fn from_fields(fields: Vec<(String, String)>) -> Result<VdfDocument, Error> {
    let mut encoding = None;
    let mut envelope = HeaderEnvelope::default();
    let mut tokens = Vec::new();

    for (field, value) in fields {
        match field.as_str() {
            ENCODING_FIELD => {
                encoding = if value.is_empty() {
                    None
                } else {
                    Some(TextEncoding::from_label(&value)?)
                };
            }
            HEADER_FIELD => envelope.header = value,
            FOOTER_FIELD => envelope.footer = value,
            _ => {
                let (key, conditional) = unfold_key(&field)?;
                let token = Token::new(key, value);
                tokens.push(match conditional {
                    Some(conditional) => token.with_conditional(conditional),
                    None => token,
                });
            }
        }
    }

    debug!("decoded {} token(s) from JSON", tokens.len());
    Ok(VdfDocument {
        encoding,
        envelope,
        tokens,
    })
}

struct OrderedFields<'a> {
    document: &'a VdfDocument,
    fields: Vec<String>,
}

impl<'a> OrderedFields<'a> {
    fn new(document: &'a VdfDocument) -> Result<Self, Error> {
        let fields = document
            .tokens
            .iter()
            .map(fold_key)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(OrderedFields { document, fields })
    }
}

impl Serialize for OrderedFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let document = self.document;
        let encoding = document
            .encoding
            .map(|encoding| encoding.to_string())
            .unwrap_or_default();

        let mut map = serializer.serialize_map(Some(document.tokens.len() + 3))?;
        map.serialize_entry(ENCODING_FIELD, &encoding)?;
        map.serialize_entry(HEADER_FIELD, &document.envelope.header)?;
        for (field, token) in self.fields.iter().zip(&document.tokens) {
            map.serialize_entry(field, &token.value)?;
        }
        map.serialize_entry(FOOTER_FIELD, &document.envelope.footer)?;
        map.end()
    }
}

/// Fields of a flat JSON object, in order, duplicates included.
struct FieldList(Vec<(String, String)>);

impl<'de> Deserialize<'de> for FieldList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldListVisitor)
    }
}

struct FieldListVisitor;

impl<'de> Visitor<'de> for FieldListVisitor {
    type Value = FieldList;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a flat JSON object of string fields")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((field, value)) = access.next_entry::<String, String>()? {
            fields.push((field, value));
        }
        Ok(FieldList(fields))
    }
}
