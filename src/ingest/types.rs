// src/ingest/types.rs
use crate::entry::StructuredContent;
use crate::error::Result;

/// One item as it comes off the feed, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
}

/// Primary feed. A failure here is fatal for the run.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>>;
    fn name(&self) -> &str;
}

/// Per-entry enrichment. Returns `None` on any failure and never errors out.
#[async_trait::async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<StructuredContent>;
}

/// Fetcher used when enrichment is disabled.
pub struct NoContent;

#[async_trait::async_trait]
impl ContentFetcher for NoContent {
    async fn fetch(&self, _url: &str) -> Option<StructuredContent> {
        None
    }
}
