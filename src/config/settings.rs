// src/config/settings.rs
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{MonitorError, Result};
use crate::notify::SummaryPolicy;

pub const DEFAULT_FEED_URL: &str = "https://www.boe.es/rss/boe.php?s=3";
pub const DEFAULT_STORE_PATH: &str = "data/datos_boe.json";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("gazette-monitor/", env!("CARGO_PKG_VERSION"));

/// SMTP credentials. All five variables must be present to enable email.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

impl SmtpSettings {
    /// `Ok(None)` when SMTP is not configured at all.
    pub fn from_env() -> Result<Option<Self>> {
        let vars = [
            "SMTP_SERVER",
            "SMTP_PORT",
            "SENDER_EMAIL",
            "SENDER_PASSWORD",
            "RECIPIENT_EMAIL",
        ];
        let values: Vec<Option<String>> = vars
            .iter()
            .map(|k| env::var(k).ok().filter(|v| !v.trim().is_empty()))
            .collect();
        if values.iter().all(Option::is_none) {
            return Ok(None);
        }
        if let Some(missing) = vars.iter().zip(&values).find(|(_, v)| v.is_none()) {
            return Err(MonitorError::Config(format!("{} missing", missing.0)));
        }
        let mut it = values.into_iter().flatten();
        let mut next = || it.next().unwrap_or_default();
        let server = next();
        let port_raw = next();
        let port = port_raw
            .trim()
            .parse()
            .map_err(|_| MonitorError::Config(format!("invalid SMTP_PORT: {port_raw}")))?;
        Ok(Some(Self {
            server,
            port,
            sender: next(),
            password: next(),
            recipient: next(),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub feed_url: String,
    pub store_path: PathBuf,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub summary_policy: SummaryPolicy,
    pub smtp: Option<SmtpSettings>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let timeout_secs = match env::var("GAZETTE_HTTP_TIMEOUT_SECS") {
            Ok(v) if !v.trim().is_empty() => v.trim().parse::<u64>().map_err(|_| {
                MonitorError::Config(format!("invalid GAZETTE_HTTP_TIMEOUT_SECS: {v}"))
            })?,
            _ => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        let summary_policy = match env::var("NOTIFY_SUMMARY") {
            Ok(v) => v.parse()?,
            Err(_) => SummaryPolicy::default(),
        };

        Ok(Self {
            feed_url: env_or("GAZETTE_FEED_URL", DEFAULT_FEED_URL),
            store_path: PathBuf::from(env_or("GAZETTE_STORE_PATH", DEFAULT_STORE_PATH)),
            http_timeout: Duration::from_secs(timeout_secs),
            user_agent: env_or("GAZETTE_USER_AGENT", DEFAULT_USER_AGENT),
            summary_policy,
            smtp: SmtpSettings::from_env()?,
        })
    }
}

/// `GAZETTE_LOG_DIR` or `logs`. Readable before the rest of the settings,
/// so logging can start even when they are invalid.
pub fn log_dir_from_env() -> PathBuf {
    PathBuf::from(env_or("GAZETTE_LOG_DIR", DEFAULT_LOG_DIR))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
