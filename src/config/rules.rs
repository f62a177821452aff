// src/config/rules.rs
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{MonitorError, Result};

pub const ENV_RULES_PATH: &str = "INCLUSION_RULES_PATH";
pub const DEFAULT_RULES_TOML: &str = "config/inclusiones.toml";
pub const DEFAULT_RULES_JSON: &str = "config/inclusiones.json";

/// Inclusion criteria for one run. Terms are trimmed, blank ones dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionRules {
    pub included_departments: BTreeSet<String>,
    pub included_keywords: BTreeSet<String>,
    pub included_ranks: BTreeSet<String>,
}

impl InclusionRules {
    pub fn new<D, K, R>(departments: D, keywords: K, ranks: R) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            included_departments: clean_set(departments),
            included_keywords: clean_set(keywords),
            included_ranks: clean_set(ranks),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.included_departments.is_empty()
            && self.included_keywords.is_empty()
            && self.included_ranks.is_empty()
    }
}

#[derive(Deserialize)]
struct RulesFile {
    #[serde(default)]
    departamentos_incluidos: Vec<String>,
    #[serde(default)]
    palabras_clave_incluidas: Vec<String>,
    #[serde(default)]
    rangos_incluidos: Vec<String>,
}

impl From<RulesFile> for InclusionRules {
    fn from(f: RulesFile) -> Self {
        InclusionRules::new(
            f.departamentos_incluidos,
            f.palabras_clave_incluidas,
            f.rangos_incluidos,
        )
    }
}

fn clean_set<I>(items: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    items
        .into_iter()
        .map(Into::into)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Load rules from an explicit path. Supports TOML or JSON.
/// A missing file is [`MonitorError::ConfigMissing`].
pub fn load_inclusion_rules_from(path: &Path) -> Result<InclusionRules> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(MonitorError::ConfigMissing)
        }
        Err(e) => return Err(MonitorError::io(path, e)),
    };
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_rules(&content, &ext)
}

fn parse_rules(s: &str, hint_ext: &str) -> Result<InclusionRules> {
    let try_toml = hint_ext == "toml";
    if try_toml {
        if let Ok(v) = toml::from_str::<RulesFile>(s) {
            return Ok(v.into());
        }
    }
    if let Ok(v) = serde_json::from_str::<RulesFile>(s) {
        return Ok(v.into());
    }
    if !try_toml {
        if let Ok(v) = toml::from_str::<RulesFile>(s) {
            return Ok(v.into());
        }
    }
    Err(MonitorError::Config("unsupported inclusion rules format".into()))
}

/// Resolve the rules file: `$INCLUSION_RULES_PATH`, then
/// `config/inclusiones.toml`, then `config/inclusiones.json`.
pub fn rules_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(ENV_RULES_PATH) {
        return Some(PathBuf::from(p));
    }
    [DEFAULT_RULES_TOML, DEFAULT_RULES_JSON]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Never fails: without usable rules the run proceeds with empty sets, so
/// nothing passes the relevance filter.
pub fn load_inclusion_rules() -> InclusionRules {
    let loaded = match rules_path() {
        Some(p) => load_inclusion_rules_from(&p).map(|r| (r, p)),
        None => Err(MonitorError::ConfigMissing),
    };
    match loaded {
        Ok((rules, path)) => {
            tracing::info!(
                path = %path.display(),
                departments = rules.included_departments.len(),
                keywords = rules.included_keywords.len(),
                ranks = rules.included_ranks.len(),
                "inclusion rules loaded"
            );
            rules
        }
        Err(MonitorError::ConfigMissing) => {
            tracing::warn!("no inclusion rules configured; every entry will be excluded");
            InclusionRules::default()
        }
        Err(e) => {
            tracing::error!(error = %e, "inclusion rules unusable; every entry will be excluded");
            InclusionRules::default()
        }
    }
}
