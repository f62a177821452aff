// src/normalizer.rs
//! Raw feed item + optional enrichment → [`CanonicalEntry`].

use crate::entry::{CanonicalEntry, EntryStatus, StructuredContent};
use crate::ingest::{normalize_text, RawEntry};

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_DEPARTMENT: &str = "Not specified";

const PLAIN_TEXT_ENDPOINT: &str = "txt.php";
const STRUCTURED_ENDPOINT: &str = "xml.php";

/// Rewrite a plain-text rendering link to its XML rendering. Idempotent.
pub fn to_structured_url(link: &str) -> String {
    link.replace(PLAIN_TEXT_ENDPOINT, STRUCTURED_ENDPOINT)
}

/// Derives `category` from the title and `department` from the description.
pub trait FieldExtractor: Send + Sync {
    fn category(&self, title: &str) -> String;
    fn department(&self, description: &str) -> String;
}

/// Baseline policy: fixed fallbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackExtractor;

impl FieldExtractor for FallbackExtractor {
    fn category(&self, _title: &str) -> String {
        DEFAULT_CATEGORY.to_string()
    }

    fn department(&self, _description: &str) -> String {
        DEFAULT_DEPARTMENT.to_string()
    }
}

pub struct Normalizer<E: FieldExtractor = FallbackExtractor> {
    extractor: E,
}

impl Default for Normalizer<FallbackExtractor> {
    fn default() -> Self {
        Self::new(FallbackExtractor)
    }
}

impl<E: FieldExtractor> Normalizer<E> {
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    pub fn normalize(&self, raw: &RawEntry, content: Option<StructuredContent>) -> CanonicalEntry {
        let title = raw.title.as_deref().map(normalize_text).unwrap_or_default();
        let description = raw.summary.as_deref().map(normalize_text).unwrap_or_default();
        let link = raw
            .link
            .as_deref()
            .map(|l| to_structured_url(l.trim()))
            .unwrap_or_default();

        let category = non_empty_or(self.extractor.category(&title), DEFAULT_CATEGORY);
        let department = non_empty_or(self.extractor.department(&description), DEFAULT_DEPARTMENT);

        CanonicalEntry {
            id: raw.id.as_deref().unwrap_or_default().trim().to_string(),
            title,
            description,
            link,
            published_at: raw.published.clone().unwrap_or_default(),
            category,
            department,
            status: EntryStatus::Pending,
            xml_content: content,
        }
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TitlePrefix;

    impl FieldExtractor for TitlePrefix {
        fn category(&self, title: &str) -> String {
            title.split_whitespace().next().unwrap_or_default().to_string()
        }
        fn department(&self, _description: &str) -> String {
            String::new()
        }
    }

    #[test]
    fn structured_url_rewrite_is_idempotent() {
        let l = "https://www.boe.es/diario_boe/txt.php?id=BOE-A-2024-1";
        let once = to_structured_url(l);
        assert_eq!(once, "https://www.boe.es/diario_boe/xml.php?id=BOE-A-2024-1");
        assert_eq!(to_structured_url(&once), once);
    }

    #[test]
    fn missing_fields_become_empty_strings_and_fallbacks_apply() {
        let e = Normalizer::default().normalize(&RawEntry::default(), None);
        assert_eq!(e.id, "");
        assert_eq!(e.title, "");
        assert_eq!(e.link, "");
        assert_eq!(e.published_at, "");
        assert_eq!(e.category, DEFAULT_CATEGORY);
        assert_eq!(e.department, DEFAULT_DEPARTMENT);
        assert_eq!(e.status, EntryStatus::Pending);
        assert!(e.xml_content.is_none());
    }

    #[test]
    fn extractor_is_pluggable_and_blank_results_fall_back() {
        let raw = RawEntry {
            id: Some("x".into()),
            title: Some("Orden JUS/1/2024".into()),
            ..Default::default()
        };
        let e = Normalizer::new(TitlePrefix).normalize(&raw, None);
        assert_eq!(e.category, "Orden");
        assert_eq!(e.department, DEFAULT_DEPARTMENT);
    }

    #[test]
    fn enrichment_is_attached_when_present() {
        let content = StructuredContent {
            text: "cuerpo".into(),
            ..Default::default()
        };
        let e = Normalizer::default().normalize(&RawEntry::default(), Some(content.clone()));
        assert_eq!(e.xml_content, Some(content));
    }
}
