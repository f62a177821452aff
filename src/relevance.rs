// src/relevance.rs
//! Relevance filter: denylist veto, then department / keyword / rank+department rules.

use crate::config::InclusionRules;
use crate::entry::CanonicalEntry;

/// Title terms that exclude an entry before any inclusion rule runs.
pub const TITLE_DENYLIST: &[&str] = &[
    "universidad",
    "corrección de errores",
    "fe de erratas",
    "university",
    "correction of errors",
    "erratum",
];

/// Which inclusion rule matched, with the configured term(s) that hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatch {
    Department(String),
    Keyword(String),
    RankAndDepartment { rank: String, department: String },
}

impl RuleMatch {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Department(_) => "department",
            Self::Keyword(_) => "keyword",
            Self::RankAndDepartment { .. } => "rank+department",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Included,
    Excluded,
    /// Title hit the denylist; carries the offending term.
    Vetoed(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relevance {
    pub decision: Decision,
    pub matches: Vec<RuleMatch>,
}

impl Relevance {
    pub fn is_included(&self) -> bool {
        self.decision == Decision::Included
    }

    /// Distinct configured terms that matched, in rule order.
    pub fn matched_terms(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |t: &String| {
            if !out.contains(t) {
                out.push(t.clone());
            }
        };
        for m in &self.matches {
            match m {
                RuleMatch::Department(d) => push(d),
                RuleMatch::Keyword(k) => push(k),
                RuleMatch::RankAndDepartment { rank, department } => {
                    push(rank);
                    push(department);
                }
            }
        }
        out
    }
}

/// Lowercased space-joined text every rule searches in.
pub fn search_blob(entry: &CanonicalEntry) -> String {
    let xml = entry.xml_content.as_ref();
    [
        entry.title.as_str(),
        entry.description.as_str(),
        entry.department.as_str(),
        xml.map(|c| c.text.as_str()).unwrap_or_default(),
        xml.map(|c| c.department.as_str()).unwrap_or_default(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

fn first_hit<'a, I>(terms: I, blob: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    terms
        .into_iter()
        .filter(|t| !t.trim().is_empty())
        .find(|t| blob.contains(&t.to_lowercase()))
        .cloned()
}

pub fn denylisted(title: &str) -> Option<&'static str> {
    let title = title.to_lowercase();
    TITLE_DENYLIST.iter().copied().find(|t| title.contains(t))
}

pub fn evaluate(entry: &CanonicalEntry, rules: &InclusionRules) -> Relevance {
    if let Some(term) = denylisted(&entry.title) {
        tracing::debug!(title = %entry.short_title(), term, "vetoed by title denylist");
        return Relevance {
            decision: Decision::Vetoed(term),
            matches: Vec::new(),
        };
    }

    let blob = search_blob(entry);
    let mut matches = Vec::new();

    let department = first_hit(&rules.included_departments, &blob);
    if let Some(d) = &department {
        matches.push(RuleMatch::Department(d.clone()));
    }
    if let Some(k) = first_hit(&rules.included_keywords, &blob) {
        matches.push(RuleMatch::Keyword(k));
    }
    if let (Some(rank), Some(department)) = (first_hit(&rules.included_ranks, &blob), department) {
        matches.push(RuleMatch::RankAndDepartment { rank, department });
    }

    for m in &matches {
        tracing::debug!(title = %entry.short_title(), rule = m.label(), "inclusion rule matched");
    }

    let decision = if matches.is_empty() {
        Decision::Excluded
    } else {
        Decision::Included
    };
    Relevance { decision, matches }
}
