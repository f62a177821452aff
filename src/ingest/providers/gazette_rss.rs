// src/ingest/providers/gazette_rss.rs
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::{MonitorError, Result};
use crate::ingest::scrub_html_entities_for_xml;
use crate::ingest::types::{FeedSource, RawEntry};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    guid: Option<Guid>,
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

// <guid isPermaLink="false">...</guid>; the attribute is irrelevant here.
#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Parse an RSS 2.0 document into raw entries.
///
/// The item id is the `guid`, or the link when the feed has no guid.
pub fn parse_rss(xml: &str) -> Result<Vec<RawEntry>> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean)
        .map_err(|e| MonitorError::Parse(format!("gazette rss: {e}")))?;

    let out = rss
        .channel
        .item
        .into_iter()
        .map(|it| {
            let guid = it
                .guid
                .map(|g| g.value.trim().to_string())
                .filter(|g| !g.is_empty());
            RawEntry {
                id: guid.or_else(|| it.link.clone()),
                title: it.title,
                summary: it.description,
                link: it.link,
                published: it.pub_date,
            }
        })
        .collect();
    Ok(out)
}

pub struct GazetteRssProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl GazetteRssProvider {
    pub fn from_fixture(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }
}

#[async_trait]
impl FeedSource for GazetteRssProvider {
    async fn fetch_entries(&self) -> Result<Vec<RawEntry>> {
        match &self.mode {
            Mode::Fixture(s) => parse_rss(s),
            Mode::Http { url, client } => {
                tracing::info!(%url, "fetching gazette feed");
                let resp = client
                    .get(url.as_str())
                    .send()
                    .await
                    .map_err(|e| MonitorError::fetch(url.as_str(), e))?;
                let status = resp.status();
                tracing::info!(status = status.as_u16(), "feed responded");
                if !status.is_success() {
                    return Err(MonitorError::fetch(url.as_str(), format!("HTTP {status}")));
                }
                let body = resp
                    .text()
                    .await
                    .map_err(|e| MonitorError::fetch(url.as_str(), e))?;
                let entries = parse_rss(&body)?;
                tracing::info!(count = entries.len(), "entries read from feed");
                Ok(entries)
            }
        }
    }

    fn name(&self) -> &str {
        match &self.mode {
            Mode::Fixture(_) => "fixture",
            Mode::Http { url, .. } => url,
        }
    }
}
