//! Intent classifiers.

use super::types::{ClassifierError, Intent};
use crate::agent::llm::{CompletionOptions, LlmProvider, Message};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Maps a free-text request to a structured [`Intent`].
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Intent, ClassifierError>;
}

const SYSTEM_PROMPT: &str = r#"You classify requests made to a music app's data agent.
The app has three home-screen sections backed by storable entities:
- "recently played": tracks and the user's play history (entities "tracks", "recently_played")
- "made for you": curated playlists (entity "made_for_you")
- "popular albums": curated albums (entity "popular_albums")

Reply with a single JSON object and nothing else:
{
  "operation": "create_table" | "query_data" | "update_data",
  "entities": [entity names from the list above],
  "description": "one sentence describing the request",
  "needsEndpoint": true | false,
  "needsFrontendUpdate": true | false
}"#;

/// Classifier backed by a chat-completion model.
pub struct LlmIntentClassifier {
    llm: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl LlmIntentClassifier {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            options: CompletionOptions {
                json_output: true,
                ..CompletionOptions::default()
            },
        }
    }

    /// Set completion options.
    pub fn with_completion_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, text: &str) -> Result<Intent, ClassifierError> {
        let messages = [Message::system(SYSTEM_PROMPT), Message::user(text)];

        debug!(provider = self.llm.name(), model = self.llm.model(), "Classifying request");
        let response = self.llm.complete(&messages, &self.options).await?;

        parse_intent(&response.message.content)
    }
}

/// Parse the intent JSON out of a completion, tolerating prose or a code
/// fence around the object.
pub fn parse_intent(content: &str) -> Result<Intent, ClassifierError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => {
            return Err(ClassifierError::Malformed(format!(
                "no JSON object in response: {}",
                truncate(content, 120)
            )))
        }
    };

    serde_json::from_str(json).map_err(|e| ClassifierError::Malformed(e.to_string()))
}

/// Classifier used when no model endpoint is configured; every request runs
/// in degraded mode.
pub struct OfflineClassifier;

#[async_trait]
impl IntentClassifier for OfflineClassifier {
    async fn classify(&self, _text: &str) -> Result<Intent, ClassifierError> {
        Err(ClassifierError::Unavailable(
            "no LLM endpoint configured".to_string(),
        ))
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::intent::IntentOperation;
    use crate::agent::llm::{CompletionResponse, FinishReason, LlmError, MessageRole};
    use std::sync::Mutex;

    struct CannedProvider {
        reply: Result<String, ()>,
        seen: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned-1"
        }

        async fn complete(
            &self,
            messages: &[Message],
            options: &CompletionOptions,
        ) -> Result<CompletionResponse, LlmError> {
            assert!(options.json_output);
            self.seen.lock().unwrap().extend(messages.iter().cloned());
            match &self.reply {
                Ok(content) => Ok(CompletionResponse {
                    message: Message::assistant(content.clone()),
                    finish_reason: FinishReason::Stop,
                    usage: None,
                }),
                Err(()) => Err(LlmError::Connection("connection refused".to_string())),
            }
        }

        async fn health_check(&self) -> Result<(), LlmError> {
            Ok(())
        }
    }

    fn classifier(reply: Result<&str, ()>) -> (LlmIntentClassifier, Arc<CannedProvider>) {
        let provider = Arc::new(CannedProvider {
            reply: reply.map(str::to_string),
            seen: Mutex::new(Vec::new()),
        });
        (LlmIntentClassifier::new(provider.clone()), provider)
    }

    #[tokio::test]
    async fn test_classify_parses_fenced_json() {
        let (classifier, provider) = classifier(Ok(
            "Sure!\n```json\n{\"operation\": \"create_table\", \"entities\": [\"made_for_you\"], \"description\": \"store playlists\", \"needsEndpoint\": true, \"needsFrontendUpdate\": false}\n```",
        ));

        let intent = classifier.classify("store made for you").await.unwrap();
        assert_eq!(intent.operation, IntentOperation::CreateTable);
        assert_eq!(intent.entities, vec!["made_for_you".to_string()]);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].role, MessageRole::System);
        assert_eq!(seen[1].content, "store made for you");
    }

    #[tokio::test]
    async fn test_classify_surfaces_llm_failure() {
        let (classifier, _) = classifier(Err(()));
        let err = classifier.classify("anything").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Llm(LlmError::Connection(_))));
    }

    #[tokio::test]
    async fn test_classify_rejects_prose() {
        let (classifier, _) = classifier(Ok("I think you want a table."));
        let err = classifier.classify("anything").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_offline_classifier_is_unavailable() {
        let err = OfflineClassifier.classify("anything").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Unavailable(_)));
    }

    #[test]
    fn test_parse_intent_reports_schema_errors() {
        let err = parse_intent(r#"{"entities": []}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `operation`"));
    }
}
