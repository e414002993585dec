use std::fmt;
use std::str::FromStr;

use crate::error::TolmachError;
use crate::extract::SourceKind;
use crate::history::TranslationRecord;

const TEXT_SUFFIXES: &[&str] = &[".txt"];
const AUDIO_SUFFIXES: &[&str] = &[".mp3", ".wav", ".m4a", ".mp4"];
const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png", ".pdf"];

/// Type facet of the history view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFacet {
    /// Typed-in text and `.txt` uploads
    Text,
    /// Speech-to-text sources
    Stt,
    /// Image-to-text sources
    Itt,
}

impl TypeFacet {
    /// Parse a facet name; the empty string means "no facet"
    pub fn parse_optional(s: &str) -> Result<Option<Self>, TolmachError> {
        if s.trim().is_empty() {
            Ok(None)
        } else {
            s.parse().map(Some)
        }
    }

    fn kind(&self) -> SourceKind {
        match self {
            TypeFacet::Text => SourceKind::Text,
            TypeFacet::Stt => SourceKind::Audio,
            TypeFacet::Itt => SourceKind::Image,
        }
    }

    fn suffixes(&self) -> &'static [&'static str] {
        match self {
            TypeFacet::Text => TEXT_SUFFIXES,
            TypeFacet::Stt => AUDIO_SUFFIXES,
            TypeFacet::Itt => IMAGE_SUFFIXES,
        }
    }

    /// Facet implied by the file name alone, `None` when the suffix is not recognized
    pub fn from_file_name(record: &TranslationRecord) -> Option<Self> {
        if record.is_manual() {
            return Some(TypeFacet::Text);
        }
        let name = record.file_name.to_lowercase();
        [TypeFacet::Text, TypeFacet::Stt, TypeFacet::Itt]
            .into_iter()
            .find(|facet| facet.suffixes().iter().any(|suffix| name.ends_with(suffix)))
    }

    /// A recognized suffix decides; the stored tag only covers names without one
    pub fn matches(&self, record: &TranslationRecord) -> bool {
        match Self::from_file_name(record) {
            Some(facet) => facet == *self,
            None => record.source.is_some_and(|kind| kind == self.kind()),
        }
    }
}

impl FromStr for TypeFacet {
    type Err = TolmachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(TypeFacet::Text),
            "stt" => Ok(TypeFacet::Stt),
            "itt" => Ok(TypeFacet::Itt),
            other => Err(TolmachError::Config(format!(
                "Invalid type filter '{}'. Valid filters: text, stt, itt",
                other
            ))),
        }
    }
}

impl fmt::Display for TypeFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeFacet::Text => "text",
            TypeFacet::Stt => "stt",
            TypeFacet::Itt => "itt",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub query: String,
    pub facet: Option<TypeFacet>,
}

impl HistoryFilter {
    pub fn new(query: impl Into<String>, facet: Option<TypeFacet>) -> Self {
        Self { query: query.into(), facet }
    }

    pub fn matches(&self, record: &TranslationRecord) -> bool {
        let query = self.query.trim().to_lowercase();
        let text_match = query.is_empty()
            || record.file_name.to_lowercase().contains(&query)
            || record.source_text.to_lowercase().contains(&query)
            || record.translations.values().any(|t| t.to_lowercase().contains(&query));

        text_match && self.facet.is_none_or(|facet| facet.matches(record))
    }

    /// Records passing the filter, in their original order
    pub fn apply<'a>(&self, records: &'a [TranslationRecord]) -> Vec<&'a TranslationRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::history::MANUAL_ENTRY_LABEL;
    use crate::translate::{Language, TranslationResult};

    fn record(id: u64, file_name: &str, source_text: &str) -> TranslationRecord {
        TranslationRecord {
            id,
            file_name: file_name.to_string(),
            source_text: source_text.to_string(),
            translations: TranslationResult::empty(),
            timestamp: Utc::now(),
            source: None,
        }
    }

    fn sample() -> Vec<TranslationRecord> {
        vec![
            record(4, "song.mp3", "la la"),
            record(3, "notes.txt", "shopping list"),
            record(2, "scan.png", "invoice"),
            record(1, MANUAL_ENTRY_LABEL, "hello there"),
        ]
    }

    fn ids(records: Vec<&TranslationRecord>) -> Vec<u64> {
        records.into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let records = sample();
        assert_eq!(ids(HistoryFilter::default().apply(&records)), vec![4, 3, 2, 1]);
    }

    #[test]
    fn stt_facet_selects_audio() {
        let records = sample();
        let filter = HistoryFilter::new("", Some(TypeFacet::Stt));
        assert_eq!(ids(filter.apply(&records)), vec![4]);
    }

    #[test]
    fn text_facet_includes_manual_entries() {
        let records = sample();
        let filter = HistoryFilter::new("", Some(TypeFacet::Text));
        assert_eq!(ids(filter.apply(&records)), vec![3, 1]);
    }

    #[test]
    fn itt_facet_is_case_insensitive() {
        let records = vec![record(1, "PHOTO.JPEG", ""), record(2, "doc.Pdf", ""), record(3, "a.webm", "")];
        let filter = HistoryFilter::new("", Some(TypeFacet::Itt));
        assert_eq!(ids(filter.apply(&records)), vec![1, 2]);
    }

    #[test]
    fn query_searches_translations() {
        let mut records = sample();
        let mut translations = TranslationResult::empty();
        translations.set(Language::Es, "Factura PENDIENTE");
        records[2].translations = translations;

        let filter = HistoryFilter::new("pendiente", None);
        assert_eq!(ids(filter.apply(&records)), vec![2]);
    }

    #[test]
    fn query_and_facet_combine() {
        let records = sample();
        assert!(HistoryFilter::new("invoice", Some(TypeFacet::Stt)).apply(&records).is_empty());
        assert_eq!(ids(HistoryFilter::new("SONG", Some(TypeFacet::Stt)).apply(&records)), vec![4]);
    }

    #[test]
    fn suffix_wins_over_stored_source() {
        // The backend reports every non-image, non-text upload as audio_or_video
        let mut pdf = record(1, "scan.pdf", "");
        pdf.source = Some(SourceKind::Audio);
        let records = vec![pdf];

        assert_eq!(ids(HistoryFilter::new("", Some(TypeFacet::Itt)).apply(&records)), vec![1]);
        assert!(HistoryFilter::new("", Some(TypeFacet::Stt)).apply(&records).is_empty());
    }

    #[test]
    fn stored_source_covers_unrecognized_names() {
        let mut tagged = record(1, "recording", "");
        tagged.source = Some(SourceKind::Audio);
        let mut webm = record(2, "clip.webm", "");
        webm.source = Some(SourceKind::Audio);
        let untagged = record(3, "mystery.bin", "");
        let records = vec![tagged, webm, untagged];

        assert_eq!(ids(HistoryFilter::new("", Some(TypeFacet::Stt)).apply(&records)), vec![1, 2]);
        assert!(HistoryFilter::new("", Some(TypeFacet::Itt)).apply(&records).is_empty());
        assert!(HistoryFilter::new("", Some(TypeFacet::Text)).apply(&records).is_empty());
    }

    #[test]
    fn facet_names_parse() {
        assert_eq!(TypeFacet::parse_optional("").unwrap(), None);
        assert_eq!(TypeFacet::parse_optional("STT").unwrap(), Some(TypeFacet::Stt));
        assert!(TypeFacet::parse_optional("video").is_err());
    }
}
