//! Gazette monitor: one pass over the feed, then exit.
//!
//! Exit code 0 on a completed run (including "nothing relevant"), 1 on a fatal
//! error. Diagnostics go to stderr and `<GAZETTE_LOG_DIR>/gazette_monitor.log`.

use std::process::ExitCode;

use anyhow::Context;
use gazette_monitor::config::{load_inclusion_rules, settings::log_dir_from_env, Settings};
use gazette_monitor::ingest::providers::{gazette_rss::GazetteRssProvider, gazette_xml::GazetteXmlFetcher};
use gazette_monitor::logging::init_tracing;
use gazette_monitor::notify::{EmailNotifier, LogNotifier, Notifier};
use gazette_monitor::{Monitor, RunReport};

async fn run(settings: Settings) -> anyhow::Result<RunReport> {
    let client = reqwest::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.http_timeout)
        .build()
        .context("building http client")?;

    let feed = GazetteRssProvider::from_url(settings.feed_url.as_str(), client.clone());
    let fetcher = GazetteXmlFetcher::new(client);
    let notifier: Box<dyn Notifier> = match &settings.smtp {
        Some(smtp) => Box::new(EmailNotifier::from_settings(smtp).context("email notifier")?),
        None => {
            tracing::warn!("SMTP not configured; notifications will only be logged");
            Box::new(LogNotifier)
        }
    };
    let rules = load_inclusion_rules();

    let monitor = Monitor::new(&feed, &fetcher, notifier.as_ref(), rules)
        .with_summary_policy(settings.summary_policy);
    let report = monitor
        .run(&settings.store_path)
        .await
        .with_context(|| format!("monitor run on {}", settings.store_path.display()))?;
    Ok(report)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Secrets first so they win over a generic .env.
    let _ = dotenvy::from_path("config/secrets.env");
    let _ = dotenvy::dotenv();

    let log_dir = log_dir_from_env();
    let _guard = match init_tracing(&log_dir) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("cannot initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(feed = %settings.feed_url, store = %settings.store_path.display(), "monitor run started");
    match run(settings).await {
        Ok(report) => {
            tracing::info!(
                fetched = report.fetched,
                relevant = report.relevant,
                added = report.added,
                updated = report.updated,
                notifications_failed = report.notifications_failed,
                "monitor run finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "monitor run failed");
            ExitCode::FAILURE
        }
    }
}
