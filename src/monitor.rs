// src/monitor.rs
//! One monitoring pass: feed → normalize/enrich → filter → reconcile → save → notify.

use std::path::Path;

use chrono::Utc;

use crate::change_detector::Verdict;
use crate::config::InclusionRules;
use crate::error::Result;
use crate::ingest::{ContentFetcher, FeedSource};
use crate::normalizer::{FallbackExtractor, FieldExtractor, Normalizer};
use crate::notify::{ChangeNotice, NotificationDispatcher, Notifier, SummaryPolicy};
use crate::relevance::{denylisted, evaluate};
use crate::store::{Reconciler, Store};

const RECENT_IN_REPORT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    /// Entries without a usable id.
    pub skipped: usize,
    pub vetoed: usize,
    pub excluded: usize,
    pub relevant: usize,
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

pub struct Monitor<'a, E: FieldExtractor = FallbackExtractor> {
    feed: &'a dyn FeedSource,
    content: &'a dyn ContentFetcher,
    notifier: &'a dyn Notifier,
    rules: InclusionRules,
    normalizer: Normalizer<E>,
    summary_policy: SummaryPolicy,
}

impl<'a> Monitor<'a> {
    pub fn new(
        feed: &'a dyn FeedSource,
        content: &'a dyn ContentFetcher,
        notifier: &'a dyn Notifier,
        rules: InclusionRules,
    ) -> Self {
        Self {
            feed,
            content,
            notifier,
            rules,
            normalizer: Normalizer::default(),
            summary_policy: SummaryPolicy::default(),
        }
    }
}

impl<'a, E: FieldExtractor> Monitor<'a, E> {
    pub fn with_normalizer<F: FieldExtractor>(self, normalizer: Normalizer<F>) -> Monitor<'a, F> {
        Monitor {
            feed: self.feed,
            content: self.content,
            notifier: self.notifier,
            rules: self.rules,
            normalizer,
            summary_policy: self.summary_policy,
        }
    }

    pub fn with_summary_policy(mut self, policy: SummaryPolicy) -> Self {
        self.summary_policy = policy;
        self
    }

    /// Run once against the store at `store_path`.
    ///
    /// A corrupt store or an unreachable feed aborts before anything is written.
    /// Notifications go out after the store is saved and never fail the run.
    pub async fn run(&self, store_path: &Path) -> Result<RunReport> {
        let mut store = Store::load_or_init(store_path)?;
        let raw_entries = self.feed.fetch_entries().await?;

        let mut report = RunReport {
            fetched: raw_entries.len(),
            ..Default::default()
        };
        tracing::info!(
            source = self.feed.name(),
            entries = report.fetched,
            "processing feed entries"
        );

        let mut changes: Vec<ChangeNotice> = Vec::new();
        let mut reconciler = Reconciler::new(&mut store);

        for raw in &raw_entries {
            // Id and denylist checks need no enrichment.
            let probe = self.normalizer.normalize(raw, None);
            if probe.id.is_empty() {
                tracing::warn!(title = %probe.short_title(), "entry without id skipped");
                report.skipped += 1;
                continue;
            }
            if let Some(term) = denylisted(&probe.title) {
                tracing::debug!(title = %probe.short_title(), term, "vetoed");
                report.vetoed += 1;
                continue;
            }

            let content = if probe.link.is_empty() {
                None
            } else {
                self.content.fetch(&probe.link).await
            };
            let entry = self.normalizer.normalize(raw, content);

            let relevance = evaluate(&entry, &self.rules);
            if !relevance.is_included() {
                report.excluded += 1;
                continue;
            }
            report.relevant += 1;
            tracing::info!(title = %entry.short_title(), "entry included");

            let verdict = reconciler.verdict(&entry);
            if verdict != Verdict::Unchanged {
                changes.push(ChangeNotice {
                    entry: entry.clone(),
                    verdict,
                    matched_terms: relevance.matched_terms(),
                });
            }
            reconciler.apply(entry, verdict);
        }

        let summary = reconciler.finish(Utc::now());
        report.added = summary.added;
        report.updated = summary.updated;
        report.unchanged = summary.unchanged;

        store.save(store_path)?;
        log_store_stats(&store, &report);

        let dispatch = NotificationDispatcher::new(self.notifier, self.summary_policy)
            .dispatch(&changes)
            .await;
        report.notifications_sent = dispatch.sent;
        report.notifications_failed = dispatch.failed;

        Ok(report)
    }
}

fn log_store_stats(store: &Store, report: &RunReport) {
    tracing::info!(
        added = report.added,
        updated = report.updated,
        relevant = report.relevant,
        fetched = report.fetched,
        total = store.stats.total_entries,
        processed = store.stats.processed_entries,
        last_update = store.last_updated_at.as_deref().unwrap_or("-"),
        "store updated"
    );
    for e in store.recent(RECENT_IN_REPORT) {
        tracing::info!(published = %e.published_at, title = %e.short_title(), "recent entry");
    }
}
