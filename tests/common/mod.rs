// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use gazette_monitor::ingest::{ContentFetcher, FeedSource, RawEntry};
use gazette_monitor::notify::Notifier;
use gazette_monitor::{MonitorError, Result, StructuredContent};

pub const BOE_RSS: &str = include_str!("../fixtures/boe_rss.xml");
pub const BOE_DOCUMENT: &str = include_str!("../fixtures/boe_document.xml");

/// Feed returning a fixed batch, or failing when `entries` is `None`.
pub struct MockFeed {
    pub entries: Mutex<Option<Vec<RawEntry>>>,
}

impl MockFeed {
    pub fn new(entries: Vec<RawEntry>) -> Self {
        Self {
            entries: Mutex::new(Some(entries)),
        }
    }

    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(None),
        }
    }

    pub fn set(&self, entries: Vec<RawEntry>) {
        *self.entries.lock().unwrap() = Some(entries);
    }
}

#[async_trait]
impl FeedSource for MockFeed {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        self.entries
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| MonitorError::Fetch {
                url: "mock://feed".into(),
                reason: "HTTP 503".into(),
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Enrichment keyed by the URL actually requested.
#[derive(Default)]
pub struct MapFetcher {
    pub docs: Mutex<HashMap<String, StructuredContent>>,
    pub requested: Mutex<Vec<String>>,
}

impl MapFetcher {
    pub fn with(url: &str, content: StructuredContent) -> Self {
        let f = Self::default();
        f.insert(url, content);
        f
    }

    pub fn insert(&self, url: &str, content: StructuredContent) {
        self.docs.lock().unwrap().insert(url.to_string(), content);
    }
}

#[async_trait]
impl ContentFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> Option<StructuredContent> {
        self.requested.lock().unwrap().push(url.to_string());
        self.docs.lock().unwrap().get(url).cloned()
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        if self.fail {
            return Err(MonitorError::Notify("connection refused".into()));
        }
        Ok(())
    }
}

pub fn raw(id: &str, title: &str, summary: &str) -> RawEntry {
    RawEntry {
        id: Some(id.to_string()),
        title: Some(title.to_string()),
        summary: Some(summary.to_string()),
        link: Some(format!("https://www.boe.es/diario_boe/txt.php?id={id}")),
        published: Some("Wed, 10 Jan 2024 00:00:00 +0100".to_string()),
    }
}

pub fn xml_link(id: &str) -> String {
    format!("https://www.boe.es/diario_boe/xml.php?id={id}")
}
