// src/config/mod.rs
pub mod rules;
pub mod settings;

pub use rules::{load_inclusion_rules, load_inclusion_rules_from, InclusionRules};
pub use settings::{Settings, SmtpSettings};
