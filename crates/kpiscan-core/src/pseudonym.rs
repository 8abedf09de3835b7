//! Pseudonymization of rankings for display.
//!
//! Every code except the subject's is replaced by a sequential alias, numbered
//! in ranking order of first appearance. Maps are rebuilt per (ranking, subject)
//! pair and never shared between charts.

use crate::model::RankingEntry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ALIAS_PREFIX: &str = "ALIAS";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PseudonymMap {
    subject: String,
    aliases: IndexMap<String, String>,
    prefix: String,
}

impl PseudonymMap {
    /// Displayed identity of `code`.
    pub fn alias_of<'a>(&'a self, code: &'a str) -> &'a str {
        let code_upper = code.to_uppercase();
        if !self.subject.is_empty() && code_upper == self.subject {
            return code;
        }
        self.aliases
            .get(&code_upper)
            .map(String::as_str)
            .unwrap_or(self.prefix.as_str())
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// `(code, alias)` pairs in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(c, a)| (c.as_str(), a.as_str()))
    }
}

/// A ranking row with the identity it is displayed under.
///
/// Only `alias` and `value` are serialized; the real code stays in memory for
/// highlighting and never reaches an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedEntry {
    #[serde(skip)]
    pub code: String,
    pub value: u32,
    pub alias: String,
}

pub fn build_map(ranking: &[RankingEntry], subject: &str) -> PseudonymMap {
    build_map_with_prefix(ranking, subject, DEFAULT_ALIAS_PREFIX)
}

/// Build a map assigning `{prefix}1`, `{prefix}2`, ... to non-subject codes in ranking order.
///
/// Codes compare case-insensitively; the subject always maps to itself.
pub fn build_map_with_prefix(ranking: &[RankingEntry], subject: &str, prefix: &str) -> PseudonymMap {
    let subject = subject.trim().to_uppercase();
    let mut aliases = IndexMap::new();

    for entry in ranking {
        let code = entry.code.trim().to_uppercase();
        if code.is_empty() || code == subject || aliases.contains_key(&code) {
            continue;
        }
        let alias = format!("{}{}", prefix, aliases.len() + 1);
        aliases.insert(code, alias);
    }

    PseudonymMap {
        subject,
        aliases,
        prefix: prefix.to_string(),
    }
}

/// Masked copy of `ranking`; values and order are untouched.
pub fn mask(ranking: &[RankingEntry], map: &PseudonymMap, subject: &str) -> Vec<MaskedEntry> {
    let subject = subject.trim().to_uppercase();
    ranking
        .iter()
        .map(|entry| {
            let alias = if !subject.is_empty() && entry.code.to_uppercase() == subject {
                entry.code.clone()
            } else {
                map.alias_of(&entry.code).to_string()
            };
            MaskedEntry {
                code: entry.code.clone(),
                value: entry.value,
                alias,
            }
        })
        .collect()
}

/// Unmasked view with every row displayed under its own code.
pub fn unmasked(ranking: &[RankingEntry]) -> Vec<MaskedEntry> {
    ranking
        .iter()
        .map(|entry| MaskedEntry {
            code: entry.code.clone(),
            value: entry.value,
            alias: entry.code.clone(),
        })
        .collect()
}
