//! Agent infrastructure for turning free-text requests into intents.
//!
//! This module provides:
//! - LLM provider abstraction (OpenAI-compatible backends)
//! - Intent classification on top of a provider, with an offline fallback
//! - Keyword derivation of the entity kinds a request names

pub mod intent;
pub mod llm;

pub use intent::{
    derive_entity_kinds, ClassifierError, Intent, IntentClassifier, IntentOperation,
    LlmIntentClassifier, OfflineClassifier,
};
pub use llm::{ApiKeySource, CompletionOptions, LlmError, LlmProvider, OpenAIProvider};
