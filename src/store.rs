// src/store.rs
//! Persisted JSON store and the reconciler that merges a run into it.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::change_detector::{detect, diff, Verdict};
use crate::entry::CanonicalEntry;
use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(rename = "total_entradas", default)]
    pub total_entries: u64,
    /// Cumulative count of net-new entries across all runs. Never decreases.
    #[serde(rename = "entradas_procesadas", default)]
    pub processed_entries: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    #[serde(rename = "ultimas_entradas", default)]
    pub entries: Vec<CanonicalEntry>,
    #[serde(rename = "estadisticas", default)]
    pub stats: Stats,
    #[serde(rename = "fecha_ultima_actualizacion", default)]
    pub last_updated_at: Option<String>,
}

impl Store {
    /// Load the store, creating an empty one on disk if the file is missing.
    /// Unparseable content is [`MonitorError::StoreCorrupt`]; it is never overwritten here.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "store not found, initializing");
                let store = Store::default();
                store.save(path)?;
                return Ok(store);
            }
            Err(e) => return Err(MonitorError::io(path, e)),
        };
        Self::from_json(&raw).map_err(|e| MonitorError::StoreCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Four-space indented JSON with raw UTF-8, no trailing newline.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.serialize(&mut ser)
            .map_err(|e| MonitorError::Parse(format!("serializing store: {e}")))?;
        Ok(buf)
    }

    /// Whole-file rewrite through a `.tmp` sibling, fsync and rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MonitorError::io(parent, e))?;
        }
        let json = self.to_json()?;
        let tmp = tmp_path(path);

        let written = (|| -> std::io::Result<()> {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(&json)?;
            f.sync_all()?;
            Ok(())
        })();
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(MonitorError::io(&tmp, e));
        }
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            MonitorError::io(path, e)
        })
    }

    /// Last `n` entries in insertion order.
    pub fn recent(&self, n: usize) -> &[CanonicalEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| "store.json".to_string());
    path.with_file_name(format!("{filename}.tmp"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Applies change verdicts to a store for the duration of one run.
pub struct Reconciler<'s> {
    store: &'s mut Store,
    index: HashMap<String, usize>,
    summary: RunSummary,
}

impl<'s> Reconciler<'s> {
    pub fn new(store: &'s mut Store) -> Self {
        let mut index = HashMap::with_capacity(store.entries.len());
        for (i, e) in store.entries.iter().enumerate() {
            if index.insert(e.id.clone(), i).is_some() {
                tracing::warn!(id = %e.id, "duplicate id in store; later copy wins lookups");
            }
        }
        Self {
            store,
            index,
            summary: RunSummary::default(),
        }
    }

    pub fn existing(&self, id: &str) -> Option<&CanonicalEntry> {
        self.index.get(id).map(|&i| &self.store.entries[i])
    }

    /// Verdict against the current in-memory state, including earlier entries of this run.
    pub fn verdict(&self, incoming: &CanonicalEntry) -> Verdict {
        detect(self.existing(&incoming.id), incoming)
    }

    pub fn apply(&mut self, mut incoming: CanonicalEntry, verdict: Verdict) {
        match (verdict, self.index.get(&incoming.id).copied()) {
            (Verdict::Unchanged, _) => self.summary.unchanged += 1,
            (Verdict::New, None) | (Verdict::Updated(_), None) => {
                tracing::info!(title = %incoming.short_title(), "new entry");
                self.index
                    .insert(incoming.id.clone(), self.store.entries.len());
                self.store.entries.push(incoming);
                self.summary.added += 1;
            }
            (Verdict::New, Some(pos)) | (Verdict::Updated(_), Some(pos)) => {
                let existing = &self.store.entries[pos];
                let fields = diff(existing, &incoming);
                if incoming.xml_content.is_none() {
                    incoming.xml_content = existing.xml_content.clone();
                }
                tracing::info!(
                    title = %incoming.short_title(),
                    fields = ?fields.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "entry updated"
                );
                self.store.entries[pos] = incoming;
                self.summary.updated += 1;
            }
        }
    }

    /// Detect and apply in one step.
    pub fn reconcile(&mut self, incoming: CanonicalEntry) -> Verdict {
        let verdict = self.verdict(&incoming);
        self.apply(incoming, verdict);
        verdict
    }

    /// Refresh aggregate stats and the timestamp.
    pub fn finish(self, now: DateTime<Utc>) -> RunSummary {
        let Reconciler { store, summary, .. } = self;
        store.stats.total_entries = store.entries.len() as u64;
        store.stats.processed_entries += summary.added as u64;
        store.last_updated_at = Some(now.to_rfc3339_opts(SecondsFormat::Secs, true));
        summary
    }
}
