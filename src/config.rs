//! Per-language plural and gender attributes.
//!
//! The grammar validator reads attributes through [`LanguageAttributesProvider`].
//! [`LanguageConfig`] is the stock provider, loaded from a JSON file shaped like:
//!
//! ```json
//! {
//!   "languages": [
//!     { "name": "french", "plural": 2, "genders": [{ "gender": "#|m|#" }, { "gender": "#|f|#" }] },
//!     { "name": "schinese", "plural": 1, "genders": [] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{error::Error, grammar::GENDER_TAGS, traits::Parser};

/// Snapshot of one language's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageAttributes {
    /// Number of plural forms, at least one.
    pub plural_forms: usize,
    /// Allowed gender tags, full markers (e.g. `#|m|#`), in configured order.
    pub genders: Vec<String>,
}

/// Source of language attributes for the grammar validator.
pub trait LanguageAttributesProvider {
    /// Number of plural forms used by `language`.
    fn plural_form_count(&self, language: &str) -> Result<usize, Error>;

    /// Gender tags allowed in `language`, possibly none.
    fn allowed_gender_tags(&self, language: &str) -> Result<Vec<String>, Error>;

    /// Both attributes at once.
    fn attributes(&self, language: &str) -> Result<LanguageAttributes, Error> {
        Ok(LanguageAttributes {
            plural_forms: self.plural_form_count(language)?,
            genders: self.allowed_gender_tags(language)?,
        })
    }
}

impl<T: LanguageAttributesProvider + ?Sized> LanguageAttributesProvider for &T {
    fn plural_form_count(&self, language: &str) -> Result<usize, Error> {
        (**self).plural_form_count(language)
    }

    fn allowed_gender_tags(&self, language: &str) -> Result<Vec<String>, Error> {
        (**self).allowed_gender_tags(language)
    }
}

/// Language attributes keyed by language name (`french`, `schinese`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageConfig {
    languages: BTreeMap<String, LanguageAttributes>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    languages: Vec<LanguageEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguageEntry {
    name: String,
    plural: usize,
    #[serde(default)]
    genders: Vec<GenderEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GenderEntry {
    gender: String,
}

impl LanguageConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a language. Gender tags may be given bare (`m`) or as
    /// full markers (`#|m|#`).
    pub fn with_language<S: AsRef<str>>(
        mut self,
        name: impl Into<String>,
        plural_forms: usize,
        genders: &[S],
    ) -> Result<Self, Error> {
        let name = name.into();
        let attributes = LanguageAttributes {
            plural_forms,
            genders: genders
                .iter()
                .map(|gender| normalize_gender_tag(gender.as_ref()))
                .collect(),
        };
        validate_language(&name, &attributes)?;
        self.languages.insert(name, attributes);
        Ok(self)
    }

    /// Language names, sorted.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn get(&self, language: &str) -> Option<&LanguageAttributes> {
        self.languages.get(language)
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    fn lookup(&self, language: &str) -> Result<&LanguageAttributes, Error> {
        self.languages
            .get(language)
            .ok_or_else(|| Error::UnknownLanguage(language.to_string()))
    }
}

impl Parser for LanguageConfig {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let file: ConfigFile = serde_json::from_reader(reader)?;
        if file.languages.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one language needs to be defined".to_string(),
            ));
        }

        let mut config = LanguageConfig::new();
        for entry in file.languages {
            let genders: Vec<&str> = entry.genders.iter().map(|g| g.gender.as_str()).collect();
            config = config.with_language(entry.name, entry.plural, genders.as_slice())?;
        }
        debug!("loaded attributes for {} language(s)", config.languages.len());
        Ok(config)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let file = ConfigFile {
            languages: self
                .languages
                .iter()
                .map(|(name, attributes)| LanguageEntry {
                    name: name.clone(),
                    plural: attributes.plural_forms,
                    genders: attributes
                        .genders
                        .iter()
                        .map(|gender| GenderEntry {
                            gender: gender.clone(),
                        })
                        .collect(),
                })
                .collect(),
        };
        serde_json::to_writer_pretty(writer, &file)?;
        Ok(())
    }
}

impl LanguageAttributesProvider for LanguageConfig {
    fn plural_form_count(&self, language: &str) -> Result<usize, Error> {
        Ok(self.lookup(language)?.plural_forms)
    }

    fn allowed_gender_tags(&self, language: &str) -> Result<Vec<String>, Error> {
        Ok(self.lookup(language)?.genders.clone())
    }

    fn attributes(&self, language: &str) -> Result<LanguageAttributes, Error> {
        self.lookup(language).cloned()
    }
}

/// Turns `m` into `#|m|#`; full markers pass through.
pub fn normalize_gender_tag(gender: &str) -> String {
    let gender = gender.trim();
    if gender.starts_with("#|") && gender.ends_with("|#") {
        gender.to_string()
    } else {
        format!("#|{}|#", gender)
    }
}

fn validate_language(name: &str, attributes: &LanguageAttributes) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::InvalidConfig("language name is empty".to_string()));
    }
    if attributes.plural_forms == 0 {
        return Err(Error::InvalidConfig(format!(
            "language `{}` needs at least one plural form",
            name
        )));
    }
    for (i, gender) in attributes.genders.iter().enumerate() {
        if !GENDER_TAGS.contains(&gender.as_str()) {
            return Err(Error::InvalidConfig(format!(
                "language `{}` uses unknown gender tag `{}`",
                name, gender
            )));
        }
        if attributes.genders[..i].contains(gender) {
            return Err(Error::InvalidConfig(format!(
                "language `{}` lists gender tag `{}` twice",
                name, gender
            )));
        }
    }
    Ok(())
}
