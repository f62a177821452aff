// src/change_detector.rs
use std::fmt;

use crate::entry::CanonicalEntry;

/// Content fields compared between stored and incoming entries, in report order.
/// `status` is not compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangedField {
    XmlContent,
    Title,
    Description,
    Link,
    PublishedAt,
    Category,
    Department,
}

impl ChangedField {
    pub const ALL: [ChangedField; 7] = [
        Self::XmlContent,
        Self::Title,
        Self::Description,
        Self::Link,
        Self::PublishedAt,
        Self::Category,
        Self::Department,
    ];

    fn differs(self, existing: &CanonicalEntry, incoming: &CanonicalEntry) -> bool {
        match self {
            // A failed fetch on this run (None) is not a content change.
            Self::XmlContent => match (&existing.xml_content, &incoming.xml_content) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(a), Some(b)) => a != b,
            },
            Self::Title => existing.title != incoming.title,
            Self::Description => existing.description != incoming.description,
            Self::Link => existing.link != incoming.link,
            Self::PublishedAt => existing.published_at != incoming.published_at,
            Self::Category => existing.category != incoming.category,
            Self::Department => existing.department != incoming.department,
        }
    }
}

impl fmt::Display for ChangedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::XmlContent => "xml content",
            Self::Title => "title",
            Self::Description => "description",
            Self::Link => "link",
            Self::PublishedAt => "publication date",
            Self::Category => "category",
            Self::Department => "department",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    New,
    /// Carries the first differing field in priority order.
    Updated(ChangedField),
    Unchanged,
}

/// Classify `incoming` against the stored entry with the same id.
pub fn detect(existing: Option<&CanonicalEntry>, incoming: &CanonicalEntry) -> Verdict {
    let Some(existing) = existing else {
        return Verdict::New;
    };
    ChangedField::ALL
        .into_iter()
        .find(|f| f.differs(existing, incoming))
        .map_or(Verdict::Unchanged, Verdict::Updated)
}

/// Every differing field, for logging.
pub fn diff(existing: &CanonicalEntry, incoming: &CanonicalEntry) -> Vec<ChangedField> {
    ChangedField::ALL
        .into_iter()
        .filter(|f| f.differs(existing, incoming))
        .collect()
}
