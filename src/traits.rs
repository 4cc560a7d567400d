//! Traits for format-agnostic parsing and serialization in vdfloc.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Cursor, Write},
    path::Path,
};

use crate::{error::Error, options::ParseOptions};

/// A trait for parsing and writing one loc file of a given format.
///
/// Text formats that need encoding detection or a tokenizer mode override
/// [`from_reader_with`](Parser::from_reader_with); the others ignore the
/// options.
///
/// # Example
///
/// ```rust,no_run
/// use vdfloc::traits::Parser;
/// use vdfloc::formats::JsonFormat;
/// let document = vdfloc::VdfDocument::read_from("resource/game_french.txt")?;
/// JsonFormat::from(document).write_to("game_french.json")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from any reader, honoring decoding and tokenizer options.
    fn from_reader_with<R: BufRead>(reader: R, _options: &ParseOptions) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(reader)
    }

    /// Parse from file path with explicit options.
    fn read_from_with<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path)?;
        Self::from_reader_with(BufReader::new(file), options)
    }

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Write to file path.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }

    /// Parse from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(bytes))
    }
}
