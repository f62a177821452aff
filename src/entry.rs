// src/entry.rs
//! Canonical record shape persisted in the store.
//!
//! Field names on disk follow the store format the monitor has always written
//! (`titulo`, `descripcion`, ...), so existing data files keep loading.

use serde::{Deserialize, Deserializer, Serialize};

/// Workflow marker for downstream review. Never part of change detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    #[default]
    #[serde(rename = "pendiente")]
    Pending,
    /// Any marker set by other tools; kept verbatim.
    #[serde(untagged)]
    Other(String),
}

/// Enrichment parsed from an entry's XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredContent {
    /// Body fragments, newline-joined.
    #[serde(rename = "texto", default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(rename = "departamento", default, deserialize_with = "null_as_default")]
    pub department: String,
    #[serde(rename = "rango", default, deserialize_with = "null_as_default")]
    pub rank: String,
    #[serde(rename = "titulo", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "fecha_publicacion", default, deserialize_with = "null_as_default")]
    pub published_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "titulo", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "descripcion", default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(rename = "fecha_publicacion", default, deserialize_with = "null_as_default")]
    pub published_at: String,
    #[serde(rename = "categoria", default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(rename = "departamento", default, deserialize_with = "null_as_default")]
    pub department: String,
    #[serde(rename = "estado", default, deserialize_with = "null_as_default")]
    pub status: EntryStatus,
    #[serde(
        rename = "contenido_xml",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub xml_content: Option<StructuredContent>,
}

// Older stores carry `null` for elements that were empty in the source document.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

impl CanonicalEntry {
    /// Title shortened for log lines.
    pub fn short_title(&self) -> String {
        truncate_chars(&self.title, 100)
    }
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}
