//! Plural and gender placeholder checks.
//!
//! Tokens whose key ends in one of the suffixes below carry inline markers that
//! the game uses to pick a plural form or a gendered variant:
//!
//! | suffix | kind | value shape (french: 2 forms, genders m/f) |
//! |---|---|---|
//! | `:p`  | plural | `Trésor#|#Trésors` |
//! | `:n`  | gender sender | `#|m|#Trésor` |
//! | `:g`  | gender receiver | `#|m|#ancien#|f|#ancienne` |
//! | `:np` | gender sender with plural | `#|m|#Trésor#|m|#Trésors` |
//! | `:gp` | gender receiver with plural | `#|m|#rare#|f|#rare#|m|#rares#|f|#rares` |

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use log::debug;

use crate::{
    config::{LanguageAttributes, LanguageAttributesProvider},
    error::Error,
    types::Token,
};

/// Separator between plural forms.
pub const PLURAL_TAG: &str = "#|#";

/// Every gender marker the game understands.
pub const GENDER_TAGS: [&str; 7] = [
    "#|f|#", "#|n|#", "#|c|#", "#|m|#", "#|ma|#", "#|mi|#", "#|mp|#",
];

/// Placeholder kind selected by a key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Plural,
    GenderSender,
    GenderReceiver,
    GenderSenderPlural,
    GenderReceiverPlural,
}

impl PlaceholderKind {
    pub const ALL: [PlaceholderKind; 5] = [
        PlaceholderKind::Plural,
        PlaceholderKind::GenderSender,
        PlaceholderKind::GenderReceiver,
        PlaceholderKind::GenderSenderPlural,
        PlaceholderKind::GenderReceiverPlural,
    ];

    /// Key suffix, colon included.
    pub fn suffix(&self) -> &'static str {
        match self {
            PlaceholderKind::Plural => ":p",
            PlaceholderKind::GenderSender => ":n",
            PlaceholderKind::GenderReceiver => ":g",
            PlaceholderKind::GenderSenderPlural => ":np",
            PlaceholderKind::GenderReceiverPlural => ":gp",
        }
    }

    /// Checks `value` against `attributes`, returning a message on failure.
    pub fn check(&self, value: &str, attributes: &LanguageAttributes) -> Option<String> {
        match self {
            PlaceholderKind::Plural => check_plural(value, attributes),
            PlaceholderKind::GenderSender => check_gender_sender(value, attributes),
            PlaceholderKind::GenderReceiver => check_gender_receiver(value, attributes),
            PlaceholderKind::GenderSenderPlural => check_gender_sender_plural(value, attributes),
            PlaceholderKind::GenderReceiverPlural => {
                check_gender_receiver_plural(value, attributes)
            }
        }
    }
}

impl Display for PlaceholderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceholderKind::Plural => write!(f, "plural"),
            PlaceholderKind::GenderSender => write!(f, "gender sender"),
            PlaceholderKind::GenderReceiver => write!(f, "gender receiver"),
            PlaceholderKind::GenderSenderPlural => write!(f, "gender sender with plural"),
            PlaceholderKind::GenderReceiverPlural => write!(f, "gender receiver with plural"),
        }
    }
}

/// A placeholder problem found in one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarIssue {
    pub token_key: String,
    pub message: String,
}

impl Display for GrammarIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.token_key, self.message)
    }
}

/// Checks plural/gender placeholders against the attributes of a language.
#[derive(Debug, Clone)]
pub struct GrammarValidator<P> {
    provider: P,
    suffixes: HashMap<&'static str, PlaceholderKind>,
}

impl<P: LanguageAttributesProvider> GrammarValidator<P> {
    pub fn new(provider: P) -> Self {
        let suffixes = PlaceholderKind::ALL
            .iter()
            .map(|kind| (kind.suffix(), *kind))
            .collect();
        GrammarValidator { provider, suffixes }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Placeholder kind named by the part of `key` after its last colon.
    pub fn kind_of(&self, key: &str) -> Option<PlaceholderKind> {
        match key.rfind(':') {
            Some(idx) if idx > 0 => self.suffixes.get(&key[idx..]).copied(),
            _ => None,
        }
    }

    /// Checks one token value.
    ///
    /// Keys without a placeholder suffix are not checked. Only an unknown
    /// language is an error; placeholder problems come back as an issue.
    pub fn check(
        &self,
        key: &str,
        value: &str,
        language: &str,
    ) -> Result<Option<GrammarIssue>, Error> {
        let Some(kind) = self.kind_of(key) else {
            return Ok(None);
        };
        let attributes = self.provider.attributes(language)?;
        Ok(kind.check(value, &attributes).map(|message| {
            debug!("{} check failed for `{}`", kind, key);
            GrammarIssue {
                token_key: key.to_string(),
                message,
            }
        }))
    }

    /// Checks every token and collects all issues.
    pub fn check_tokens(&self, tokens: &[Token], language: &str) -> Result<Vec<GrammarIssue>, Error> {
        let mut issues = Vec::new();
        for token in tokens {
            if let Some(issue) = self.check(&token.key, &token.value, language)? {
                issues.push(issue);
            }
        }
        Ok(issues)
    }

    /// Keeps the keys carrying a plural or gender suffix.
    pub fn filter_plural_gender_keys<'a, I>(&self, keys: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter()
            .filter(|key| self.kind_of(key).is_some())
            .collect()
    }
}

fn check_plural(value: &str, attributes: &LanguageAttributes) -> Option<String> {
    let expected = attributes.plural_forms.saturating_sub(1);
    let found = value.matches(PLURAL_TAG).count();
    (found != expected).then(|| {
        format!(
            "Expected number of plural forms: {} - found: {}",
            expected + 1,
            found + 1
        )
    })
}

/// Plural-only rule used by the gender/plural kinds when a language has no
/// genders: forms are split by the plural separator instead.
fn check_plural_fallback(value: &str, attributes: &LanguageAttributes) -> Option<String> {
    let expected = attributes.plural_forms.saturating_sub(1);
    let found = value.matches(PLURAL_TAG).count();
    (found != expected).then(|| {
        format!(
            "Error with gender/plural form: found {} plural forms, while expecting {} separated with a plural tag",
            found + 1,
            expected + 1
        )
    })
}

fn check_gender_sender(value: &str, attributes: &LanguageAttributes) -> Option<String> {
    let allowed = &attributes.genders;
    let list = allowed.join(",");
    let mut present = 0;

    for tag in GENDER_TAGS {
        let count = value.matches(tag).count();
        let is_allowed = allowed.iter().any(|g| g == tag);
        if count > 1 || (count == 1 && !is_allowed) {
            return Some(if allowed.is_empty() {
                format!("Error with gender form: {} - no gender expected", tag)
            } else {
                format!("Error with gender form: {} - expected only one of: {}", tag, list)
            });
        }
        if count > 0 {
            present += 1;
        }
    }

    (!allowed.is_empty() && present != 1)
        .then(|| format!("Error with gender form - expected one of: {}", list))
}

fn check_gender_receiver(value: &str, attributes: &LanguageAttributes) -> Option<String> {
    let allowed = &attributes.genders;
    let list = allowed.join(",");

    for tag in GENDER_TAGS {
        let count = value.matches(tag).count();
        let is_allowed = allowed.iter().any(|g| g == tag);
        let well_formed = (count == 1 && is_allowed) || (count == 0 && !is_allowed);
        if !well_formed {
            return Some(if allowed.is_empty() {
                format!("Error with gender form: {} - no gender expected", tag)
            } else {
                format!("Error with gender form: {} - expected one of each: {}", tag, list)
            });
        }
    }

    let present = allowed
        .iter()
        .filter(|tag| value.matches(tag.as_str()).count() == 1)
        .count();
    (present != allowed.len())
        .then(|| format!("Error with gender form - expected one of each: {}", list))
}

fn check_gender_sender_plural(value: &str, attributes: &LanguageAttributes) -> Option<String> {
    let allowed = &attributes.genders;
    if allowed.is_empty() {
        return check_plural_fallback(value, attributes);
    }

    let mut forms = 0;
    for tag in GENDER_TAGS {
        let count = value.matches(tag).count();
        if count == 0 {
            continue;
        }
        if !allowed.iter().any(|g| g == tag) {
            return Some(format!(
                "Error with gender/plural form: this tag was unexpected {}",
                tag
            ));
        }
        forms += count;
    }

    (forms != attributes.plural_forms).then(|| {
        format!(
            "Error with gender/plural forms - counted {} while expecting {}",
            forms, attributes.plural_forms
        )
    })
}

fn check_gender_receiver_plural(value: &str, attributes: &LanguageAttributes) -> Option<String> {
    let allowed = &attributes.genders;
    if allowed.is_empty() {
        return check_plural_fallback(value, attributes);
    }
    let forms = attributes.plural_forms;
    let list = allowed.join(",");

    for tag in GENDER_TAGS {
        let count = value.matches(tag).count();
        let is_allowed = allowed.iter().any(|g| g == tag);
        if !is_allowed && count > 0 {
            return Some(format!(
                "Error with gender/plural form: {} - unexpected tag, expecting only: {}",
                tag, list
            ));
        }
    }

    // Position of each occurrence, one column per allowed tag.
    let mut columns: Vec<(&str, Vec<usize>)> = Vec::with_capacity(allowed.len());
    for tag in allowed {
        let positions: Vec<usize> = value.match_indices(tag.as_str()).map(|(i, _)| i).collect();
        if positions.len() != forms {
            return Some(format!(
                "Error with gender/plural form: {} - found {} while expecting {} of each gender group: {}",
                tag,
                positions.len(),
                forms,
                list
            ));
        }
        columns.push((tag.as_str(), positions));
    }

    // Group i holds the i-th occurrence of every tag and must start strictly
    // after the last tag of group i-1.
    let mut previous_end: Option<usize> = None;
    for form in 0..forms {
        let mut group_end = 0;
        for (tag, positions) in &columns {
            let at = positions[form];
            if previous_end.is_some_and(|end| at <= end) {
                return Some(format!(
                    "Error with gender/plural form: incorrect order plural form: {}, gender tag: {}",
                    form + 1,
                    tag
                ));
            }
            group_end = group_end.max(at);
        }
        previous_end = Some(group_end);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanguageConfig;

    fn config() -> LanguageConfig {
        LanguageConfig::new()
            .with_language("french", 2, &["m", "f"])
            .unwrap()
            .with_language("schinese", 1, &[] as &[&str])
            .unwrap()
            .with_language("polish", 3, &["m", "f", "n"])
            .unwrap()
            .with_language("turkish", 2, &[] as &[&str])
            .unwrap()
    }

    fn check(key: &str, value: &str, language: &str) -> Option<GrammarIssue> {
        GrammarValidator::new(config()).check(key, value, language).unwrap()
    }

    #[test]
    fn test_kind_of() {
        let validator = GrammarValidator::new(config());
        assert_eq!(validator.kind_of("Noun:p"), Some(PlaceholderKind::Plural));
        assert_eq!(validator.kind_of("Noun:n"), Some(PlaceholderKind::GenderSender));
        assert_eq!(validator.kind_of("Adj:g"), Some(PlaceholderKind::GenderReceiver));
        assert_eq!(validator.kind_of("a:b:np"), Some(PlaceholderKind::GenderSenderPlural));
        assert_eq!(validator.kind_of("Adj:gp"), Some(PlaceholderKind::GenderReceiverPlural));
        assert_eq!(validator.kind_of(":p"), None);
        assert_eq!(validator.kind_of("Noun:x"), None);
        assert_eq!(validator.kind_of("Noun"), None);
    }

    #[test]
    fn test_unsuffixed_key_is_not_checked() {
        assert!(check("plain", "#|m|##|m|#", "french").is_none());
        // No attribute lookup happens for unsuffixed keys.
        let validator = GrammarValidator::new(config());
        assert!(validator.check("plain", "x", "klingon").unwrap().is_none());
    }

    #[test]
    fn test_unknown_language_is_an_error() {
        let validator = GrammarValidator::new(config());
        let err = validator.check("Noun:p", "a#|#b", "klingon").unwrap_err();
        assert!(matches!(err, Error::UnknownLanguage(_)));
    }

    #[test]
    fn test_plural() {
        assert!(check("Noun:p", "Trésor#|#Trésors", "french").is_none());
        let issue = check("Noun:p", "Trésor", "french").unwrap();
        assert_eq!(issue.token_key, "Noun:p");
        assert_eq!(issue.message, "Expected number of plural forms: 2 - found: 1");
        assert!(check("Noun:p", "a#|#b#|#c", "french").is_some());
        assert!(check("Noun:p", "宝物", "schinese").is_none());
        assert!(check("Noun:p", "a#|#b#|#c", "polish").is_none());
    }

    #[test]
    fn test_gender_sender() {
        assert!(check("Noun:n", "#|m|#Trésor", "french").is_none());
        assert!(check("Noun:n", "#|f|#Couronne", "french").is_none());
        // Missing tag.
        assert!(check("Noun:n", "Trésor", "french").is_some());
        // Two different allowed tags.
        assert!(check("Noun:n", "#|m|#a#|f|#b", "french").is_some());
        // Same tag twice.
        assert!(check("Noun:n", "#|m|#a#|m|#b", "french").is_some());
        // Tag not allowed for the language.
        let issue = check("Noun:n", "#|n|#a", "french").unwrap();
        assert!(issue.message.contains("#|n|#"));
        // No genders in language: no tag expected.
        assert!(check("Noun:n", "宝物", "schinese").is_none());
        let issue = check("Noun:n", "#|m|#宝物", "schinese").unwrap();
        assert!(issue.message.contains("no gender expected"));
    }

    #[test]
    fn test_gender_receiver() {
        assert!(check("Adj:g", "#|m|#ancien#|f|#ancienne", "french").is_none());
        assert!(check("Adj:g", "#|f|#ancienne#|m|#ancien", "french").is_none());
        assert!(check("Adj:g", "#|m|#ancien", "french").is_some());
        assert!(check("Adj:g", "#|m|#a#|f|#b#|n|#c", "french").is_some());
        assert!(check("Adj:g", "#|m|#a#|m|#b#|f|#c", "french").is_some());
        assert!(check("Adj:g", "plain", "schinese").is_none());
    }

    #[test]
    fn test_gender_sender_plural() {
        assert!(check("Noun:np", "#|m|#Trésor#|m|#Trésors", "french").is_none());
        assert!(check("Noun:np", "#|m|#Trésor", "french").is_some());
        let issue = check("Noun:np", "#|m|#a#|n|#b", "french").unwrap();
        assert!(issue.message.contains("unexpected #|n|#"));
        // Mixed allowed tags still count towards the forms.
        assert!(check("Noun:np", "#|m|#a#|f|#b", "french").is_none());
        assert!(check("Noun:np", "#|f|#a#|f|#b#|f|#c", "polish").is_none());
    }

    #[test]
    fn test_gender_plural_fallback_without_genders() {
        assert!(check("Noun:np", "a#|#b", "turkish").is_none());
        let issue = check("Noun:np", "a", "turkish").unwrap();
        assert!(issue.message.contains("found 1 plural forms, while expecting 2"));
        assert!(check("Adj:gp", "a#|#b", "turkish").is_none());
        assert!(check("Adj:gp", "a#|#b#|#c", "turkish").is_some());
    }

    #[test]
    fn test_gender_receiver_plural_grouped() {
        assert!(check("Adj:gp", "#|m|#A#|f|#B#|m|#C#|f|#D", "french").is_none());
        // Order inside a group is free.
        assert!(check("Adj:gp", "#|f|#B#|m|#A#|m|#C#|f|#D", "french").is_none());
    }

    #[test]
    fn test_gender_receiver_plural_interleaved() {
        let issue = check("Adj:gp", "#|m|#A#|m|#C#|f|#B#|f|#D", "french").unwrap();
        assert_eq!(
            issue.message,
            "Error with gender/plural form: incorrect order plural form: 2, gender tag: #|m|#"
        );
    }

    #[test]
    fn test_gender_receiver_plural_counts() {
        let issue = check("Adj:gp", "#|m|#A#|f|#B#|m|#C", "french").unwrap();
        assert!(issue.message.contains("#|f|# - found 1 while expecting 2"));
        let issue = check("Adj:gp", "#|m|#A#|f|#B#|m|#C#|f|#D#|c|#E", "french").unwrap();
        assert!(issue.message.contains("#|c|# - unexpected tag"));
    }

    #[test]
    fn test_gender_receiver_plural_three_forms() {
        let value = "#|m|#a#|f|#b#|n|#c#|n|#d#|m|#e#|f|#f#|f|#g#|m|#h#|n|#i";
        assert!(check("Adj:gp", value, "polish").is_none());
        let value = "#|m|#a#|f|#b#|n|#c#|m|#e#|f|#f#|f|#g#|n|#d#|m|#h#|n|#i";
        let issue = check("Adj:gp", value, "polish").unwrap();
        assert!(issue.message.contains("plural form: 3"));
    }

    #[test]
    fn test_check_tokens_and_filter() {
        let validator = GrammarValidator::new(config());
        let tokens = vec![
            Token::new("Noun:p", "Trésor#|#Trésors"),
            Token::new("Adj:g", "#|m|#ancien"),
            Token::new("plain", "text"),
            Token::new("Noun:n", "Trésor"),
        ];
        let issues = validator.check_tokens(&tokens, "french").unwrap();
        let keys: Vec<_> = issues.iter().map(|i| i.token_key.as_str()).collect();
        assert_eq!(keys, vec!["Adj:g", "Noun:n"]);
        assert!(issues[0].to_string().starts_with("Adj:g: "));

        let keys = validator.filter_plural_gender_keys(tokens.iter().map(|t| t.key.as_str()));
        assert_eq!(keys, vec!["Noun:p", "Adj:g", "Noun:n"]);
    }

    #[test]
    fn test_borrowed_provider() {
        let config = config();
        let validator = GrammarValidator::new(&config);
        assert!(validator.check("Noun:p", "a#|#b", "french").unwrap().is_none());
    }
}
