// src/ingest/providers/gazette_xml.rs
//! Enrichment from the gazette's per-document XML rendering.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::entry::StructuredContent;
use crate::error::{MonitorError, Result};
use crate::ingest::scrub_html_entities_for_xml;
use crate::ingest::types::ContentFetcher;
use crate::normalizer::to_structured_url;

// Elements that end a paragraph inside <texto>.
const BLOCK_ELEMENTS: &[&[u8]] = &[b"p", b"li", b"tr", b"div", b"texto"];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Department,
    Rank,
    Title,
    PublishedAt,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"departamento" => Some(Self::Department),
            b"rango" => Some(Self::Rank),
            b"titulo" => Some(Self::Title),
            b"fecha_publicacion" => Some(Self::PublishedAt),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Captured {
    department: Option<String>,
    rank: Option<String>,
    title: Option<String>,
    published_at: Option<String>,
}

impl Captured {
    fn slot(&mut self, f: Field) -> &mut Option<String> {
        match f {
            Field::Department => &mut self.department,
            Field::Rank => &mut self.rank,
            Field::Title => &mut self.title,
            Field::PublishedAt => &mut self.published_at,
        }
    }
}

/// Parse a gazette document.
///
/// `text` joins every paragraph found under `<texto>` elements with newlines;
/// the metadata fields take the first matching element anywhere in the tree.
pub fn parse_structured_content(xml: &str) -> Result<StructuredContent> {
    let cleaned = scrub_html_entities_for_xml(xml);
    let mut reader = Reader::from_str(&cleaned);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut saw_root = false;
    let mut texto_depth = 0usize;
    let mut paragraph = String::new();
    let mut fragments: Vec<String> = Vec::new();
    let mut captured = Captured::default();
    // (field, depth at which it was opened, accumulated text)
    let mut capture: Option<(Field, usize, String)> = None;

    loop {
        let ev = reader
            .read_event()
            .map_err(|e| MonitorError::Parse(format!("gazette xml: {e}")))?;
        match ev {
            Event::Start(e) => {
                depth += 1;
                saw_root = true;
                let name = e.local_name();
                let tag = name.as_ref();
                if tag == b"texto" {
                    texto_depth += 1;
                }
                if capture.is_none() {
                    if let Some(f) = Field::from_tag(tag) {
                        if captured.slot(f).is_none() {
                            capture = Some((f, depth, String::new()));
                        }
                    }
                }
            }
            Event::Empty(_) => saw_root = true,
            Event::End(e) => {
                let name = e.local_name();
                let tag = name.as_ref();
                if let Some((f, d, buf)) = capture.take() {
                    if d == depth {
                        *captured.slot(f) = Some(buf.trim().to_string());
                    } else {
                        capture = Some((f, d, buf));
                    }
                }
                if texto_depth > 0 && BLOCK_ELEMENTS.contains(&tag) && !paragraph.is_empty() {
                    fragments.push(std::mem::take(&mut paragraph));
                }
                if tag == b"texto" {
                    texto_depth = texto_depth.saturating_sub(1);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(t) => {
                let s = t
                    .unescape()
                    .map_err(|e| MonitorError::Parse(format!("gazette xml text: {e}")))?;
                push_text(&s, &mut capture, texto_depth, &mut paragraph);
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                let s = String::from_utf8_lossy(&raw);
                push_text(s.trim(), &mut capture, texto_depth, &mut paragraph);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(MonitorError::Parse("gazette xml: no root element".into()));
    }
    if depth != 0 {
        return Err(MonitorError::Parse(
            "gazette xml: document ends with open elements".into(),
        ));
    }

    Ok(StructuredContent {
        text: fragments.join("\n"),
        department: captured.department.unwrap_or_default(),
        rank: captured.rank.unwrap_or_default(),
        title: captured.title.unwrap_or_default(),
        published_at: captured.published_at.unwrap_or_default(),
    })
}

fn push_text(
    s: &str,
    capture: &mut Option<(Field, usize, String)>,
    texto_depth: usize,
    paragraph: &mut String,
) {
    if s.is_empty() {
        return;
    }
    if let Some((_, _, buf)) = capture.as_mut() {
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str(s);
    }
    if texto_depth > 0 {
        if !paragraph.is_empty() {
            paragraph.push(' ');
        }
        paragraph.push_str(s);
    }
}

/// Fetches the XML rendering of an entry and parses it. Any failure is logged
/// and reported as "no enrichment".
pub struct GazetteXmlFetcher {
    client: reqwest::Client,
}

impl GazetteXmlFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn try_fetch(&self, url: &str) -> Result<StructuredContent> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MonitorError::fetch(url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MonitorError::fetch(url, format!("HTTP {status}")));
        }
        let body = resp.text().await.map_err(|e| MonitorError::fetch(url, e))?;
        parse_structured_content(&body)
    }
}

#[async_trait]
impl ContentFetcher for GazetteXmlFetcher {
    async fn fetch(&self, url: &str) -> Option<StructuredContent> {
        let xml_url = to_structured_url(url);
        tracing::debug!(url = %xml_url, "fetching document xml");
        match self.try_fetch(&xml_url).await {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!(error = %e, url = %xml_url, "no enrichment for entry");
                None
            }
        }
    }
}
