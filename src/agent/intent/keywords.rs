//! Deterministic keyword derivation of the entity kinds a request names.
//!
//! This is the authoritative source for what gets provisioned; the
//! classifier's answer is only advisory.

use crate::entity_store::EntityKind;
use lazy_static::lazy_static;
use regex::Regex;

/// A phrase that, when present in a request, implicates a set of kinds.
#[derive(Debug, PartialEq, Eq)]
pub struct KeywordTrigger {
    pub phrase: &'static str,
    /// Kinds in provisioning order (dependencies first).
    pub kinds: &'static [EntityKind],
}

pub const TRIGGERS: &[KeywordTrigger] = &[
    KeywordTrigger {
        phrase: "recently played",
        kinds: &[EntityKind::Track, EntityKind::PlayHistory],
    },
    KeywordTrigger {
        phrase: "made for you",
        kinds: &[EntityKind::CuratedPlaylist],
    },
    KeywordTrigger {
        phrase: "popular albums",
        kinds: &[EntityKind::CuratedAlbum],
    },
];

lazy_static! {
    static ref QUOTES: Regex = Regex::new(r#"["'`\x{2018}\x{2019}\x{201C}\x{201D}]"#).unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Lowercase, drop quote characters and collapse whitespace runs.
pub fn normalize_query(query: &str) -> String {
    let lowered = query.to_lowercase();
    let unquoted = QUOTES.replace_all(&lowered, "");
    WHITESPACE.replace_all(unquoted.trim(), " ").into_owned()
}

/// Triggers present in the query, in table order.
pub fn matched_triggers(query: &str) -> Vec<&'static KeywordTrigger> {
    let normalized = normalize_query(query);
    TRIGGERS
        .iter()
        .filter(|trigger| normalized.contains(trigger.phrase))
        .collect()
}

/// The ordered, de-duplicated set of kinds the query implicates.
pub fn derive_entity_kinds(query: &str) -> Vec<EntityKind> {
    let mut kinds = Vec::new();
    for trigger in matched_triggers(query) {
        for kind in trigger.kinds {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
    }
    kinds
}
