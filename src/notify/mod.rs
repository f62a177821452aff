// src/notify/mod.rs
pub mod email;
pub mod log;

use std::str::FromStr;

use crate::change_detector::Verdict;
use crate::entry::CanonicalEntry;
use crate::error::{MonitorError, Result};

pub use email::EmailNotifier;
pub use log::LogNotifier;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<()>;
}

/// When the end-of-run summary goes out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummaryPolicy {
    /// One summary every run, "no changes" included.
    #[default]
    Always,
    /// Skip the "no changes" summary.
    ChangesOnly,
}

impl FromStr for SummaryPolicy {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "always" => Ok(Self::Always),
            "changes" | "changes-only" | "quiet" => Ok(Self::ChangesOnly),
            other => Err(MonitorError::Config(format!("unknown NOTIFY_SUMMARY: {other}"))),
        }
    }
}

/// A New or Updated entry, with the terms that made it relevant.
#[derive(Debug, Clone)]
pub struct ChangeNotice {
    pub entry: CanonicalEntry,
    pub verdict: Verdict,
    pub matched_terms: Vec<String>,
}

impl ChangeNotice {
    pub fn subject(&self) -> String {
        match self.verdict {
            Verdict::Updated(_) => format!("Changes in {} entry", self.entry.category),
            _ => format!("New {} entry detected", self.entry.category),
        }
    }

    pub fn body(&self) -> String {
        let terms = if self.matched_terms.is_empty() {
            "-".to_string()
        } else {
            self.matched_terms.join(", ")
        };
        let mut body = format!(
            "Title: {}\nDepartment: {}\nMatched terms: {}\n",
            self.entry.title, self.entry.department, terms
        );
        if let Verdict::Updated(field) = self.verdict {
            body.push_str(&format!("Changed: {field}\n"));
        }
        body.push_str(&format!("Link: {}\n", self.entry.link));
        body
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

pub struct NotificationDispatcher<'a> {
    notifier: &'a dyn Notifier,
    policy: SummaryPolicy,
}

impl<'a> NotificationDispatcher<'a> {
    pub fn new(notifier: &'a dyn Notifier, policy: SummaryPolicy) -> Self {
        Self { notifier, policy }
    }

    /// One message per change, then one summary. Failures are logged and counted.
    pub async fn dispatch(&self, changes: &[ChangeNotice]) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut notified = 0usize;

        for change in changes {
            if change.verdict == Verdict::Unchanged {
                continue;
            }
            notified += 1;
            self.deliver(&change.subject(), &change.body(), &mut report)
                .await;
        }

        if notified > 0 {
            let body = format!(
                "{notified} new or updated entries were detected. \
                 See the individual messages for details.\n"
            );
            self.deliver("Gazette monitor: changes found", &body, &mut report)
                .await;
        } else if self.policy == SummaryPolicy::Always {
            self.deliver(
                "Gazette monitor: no changes",
                "Nothing new matched the inclusion rules in this run.\n",
                &mut report,
            )
            .await;
        } else {
            tracing::debug!("no changes; summary suppressed by policy");
        }

        report
    }

    async fn deliver(&self, subject: &str, body: &str, report: &mut DispatchReport) {
        match self.notifier.send(subject, body).await {
            Ok(()) => {
                tracing::info!(%subject, "notification sent");
                report.sent += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, %subject, "notification failed");
                report.failed += 1;
            }
        }
    }
}
