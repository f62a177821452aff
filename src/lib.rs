// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod change_detector;
pub mod config;
pub mod entry;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod monitor;
pub mod normalizer;
pub mod notify;
pub mod relevance;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::change_detector::{ChangedField, Verdict};
pub use crate::config::InclusionRules;
pub use crate::entry::{CanonicalEntry, EntryStatus, StructuredContent};
pub use crate::error::{MonitorError, Result};
pub use crate::monitor::{Monitor, RunReport};
pub use crate::store::Store;
