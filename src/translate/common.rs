use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::TolmachError;

/// Prefix written into every language slot when a whole batch fails in transport.
pub const TRANSLATION_ERROR_MARKER: &str = "[translation error]";

/// Target languages a record can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Kk,
    Ru,
    En,
    Es,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Kk, Language::Ru, Language::En, Language::Es];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Kk => "kk",
            Language::Ru => "ru",
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Full language name for display
    pub fn name(&self) -> &'static str {
        match self {
            Language::Kk => "Kazakh",
            Language::Ru => "Russian",
            Language::En => "English",
            Language::Es => "Spanish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = TolmachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kk" => Ok(Language::Kk),
            "ru" => Ok(Language::Ru),
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            other => Err(TolmachError::Config(format!(
                "Unsupported language code '{}'. Supported: kk, ru, en, es",
                other
            ))),
        }
    }
}

/// Per-language translated text. Always holds an entry for every [`Language`],
/// slots that were not translated hold an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Language, String>", into = "BTreeMap<Language, String>")]
pub struct TranslationResult {
    slots: BTreeMap<Language, String>,
}

impl TranslationResult {
    pub fn empty() -> Self {
        Self {
            slots: Language::ALL.iter().map(|l| (*l, String::new())).collect(),
        }
    }

    /// Same text in every slot
    pub fn filled(text: &str) -> Self {
        Self {
            slots: Language::ALL.iter().map(|l| (*l, text.to_string())).collect(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        self.slots.get(&language).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, language: Language, text: impl Into<String>) {
        self.slots.insert(language, text.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (Language, &str)> {
        self.slots.iter().map(|(l, t)| (*l, t.as_str()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.slots.values().map(String::as_str)
    }

    /// True when no slot carries any text
    pub fn is_blank(&self) -> bool {
        self.slots.values().all(|t| t.is_empty())
    }
}

impl Default for TranslationResult {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<BTreeMap<Language, String>> for TranslationResult {
    fn from(map: BTreeMap<Language, String>) -> Self {
        let mut result = Self::empty();
        for (language, text) in map {
            result.set(language, text);
        }
        result
    }
}

impl From<TranslationResult> for BTreeMap<Language, String> {
    fn from(result: TranslationResult) -> Self {
        result.slots
    }
}

/// Collapse line breaks and whitespace runs into single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Marker stored in every slot when the whole batch could not be delivered.
pub fn error_marker(message: &str) -> String {
    format!("{} {}", TRANSLATION_ERROR_MARKER, normalize_whitespace(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hello \n\n world\t again  "), "hello world again");
        assert_eq!(normalize_whitespace("\r\n"), "");
        assert_eq!(normalize_whitespace("single"), "single");
    }

    #[test]
    fn empty_result_has_every_language() {
        let result = TranslationResult::empty();
        assert_eq!(result.iter().count(), Language::ALL.len());
        assert!(result.is_blank());
    }

    #[test]
    fn deserialized_result_fills_missing_languages() {
        let result: TranslationResult = serde_json::from_str(r#"{"en":"hi"}"#).unwrap();
        assert_eq!(result.get(Language::En), "hi");
        assert_eq!(result.get(Language::Kk), "");
        assert_eq!(result.iter().count(), Language::ALL.len());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["es"], "");
    }

    #[test]
    fn language_codes_parse_case_insensitively() {
        assert_eq!("KK".parse::<Language>().unwrap(), Language::Kk);
        assert_eq!(" es ".parse::<Language>().unwrap(), Language::Es);
        assert!("de".parse::<Language>().is_err());
    }
}
