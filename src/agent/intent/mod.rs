//! Request understanding: an advisory classifier plus deterministic keyword
//! derivation.

mod classifier;
mod keywords;
mod types;

pub use classifier::{parse_intent, IntentClassifier, LlmIntentClassifier, OfflineClassifier};
pub use keywords::{derive_entity_kinds, matched_triggers, normalize_query, KeywordTrigger, TRIGGERS};
pub use types::{ClassifierError, Intent, IntentOperation};
