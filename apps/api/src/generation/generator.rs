//! Post generation: orchestrates a single generate request.
//!
//! Flow: build prompt + schema for the mode → one forced tool call → parse and
//!       validate → best-effort save to history → return posts and saved flag.
//!
//! Nothing is retried. The posts are returned even when saving fails.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::generation::output_type::{OutputType, PostSequence, Topic};
use crate::generation::prompts::{build_user_prompt, POST_WRITER_SYSTEM};
use crate::generation::schema::{parse_posts, response_schema};
use crate::generation::{GenerationError, PostGenerator};
use crate::history::{save_best_effort, GenerationStore};
use crate::identity::Principal;
use crate::llm_client::{LlmProvider, ToolCallRequest};
use crate::models::generation::NewGeneration;

/// Fixed sampling temperature: varied phrasing that stays on topic.
pub const TEMPERATURE: f64 = 0.7;

const FORMAT_TOOL_NAME: &str = "format_response";
const FORMAT_TOOL_DESCRIPTION: &str =
    "Formats the output as a JSON object matching the provided schema.";

// ────────────────────────────────────────────────────────────────────────────
// Model-backed generator
// ────────────────────────────────────────────────────────────────────────────

/// `PostGenerator` backed by whichever hosted model provider is configured.
#[derive(Clone)]
pub struct LlmPostGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl LlmPostGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl PostGenerator for LlmPostGenerator {
    async fn generate(
        &self,
        topic: &Topic,
        mode: OutputType,
    ) -> Result<PostSequence, GenerationError> {
        let prompt = build_user_prompt(topic, mode);
        let schema = response_schema(mode);

        let raw = self
            .llm
            .call_tool(&ToolCallRequest {
                system: POST_WRITER_SYSTEM,
                prompt: &prompt,
                tool_name: FORMAT_TOOL_NAME,
                tool_description: FORMAT_TOOL_DESCRIPTION,
                parameters: &schema,
                temperature: TEMPERATURE,
            })
            .await?;

        parse_posts(&raw, mode)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generate + record
// ────────────────────────────────────────────────────────────────────────────

/// Result of a successful generation. `saved` is false when history could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationOutcome {
    pub topic: Topic,
    pub output_type: OutputType,
    pub tweets: PostSequence,
    pub saved: bool,
}

/// Generates posts for the principal and records them in history.
///
/// `store` is `None` when history is not configured; the outcome is then unsaved.
/// Only a generation failure is an error. A save failure just clears `saved`.
pub async fn generate_and_record(
    generator: &dyn PostGenerator,
    store: Option<&dyn GenerationStore>,
    principal: &Principal,
    topic: &Topic,
    mode: OutputType,
) -> Result<GenerationOutcome, GenerationError> {
    let tweets = generator.generate(topic, mode).await?;

    info!(
        "Generated {} post(s) ({}) for user {}",
        tweets.len(),
        mode,
        principal.id
    );

    let saved = match store {
        Some(store) => {
            save_best_effort(
                store,
                NewGeneration {
                    user_id: principal.id,
                    topic: topic.as_str().to_string(),
                    output_type: mode,
                    tweets: tweets.clone(),
                },
            )
            .await
        }
        None => {
            warn!("History is not configured; generation for user {} not saved", principal.id);
            false
        }
    };

    Ok(GenerationOutcome {
        topic: topic.clone(),
        output_type: mode,
        tweets,
        saved,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryGenerationStore;
    use crate::testing::{principal, FailingStore, ScriptedLlm, StubGenerator};

    #[tokio::test]
    async fn test_llm_generator_sends_mode_prompt_schema_and_temperature() {
        let llm = Arc::new(ScriptedLlm::returning(
            r#"{"thread": ["Hook 🧵", "Value", "Follow me 👉"]}"#,
        ));
        let generator = LlmPostGenerator::new(llm.clone());
        let topic = Topic::parse("Perplexity AI for research").unwrap();

        let posts = generator.generate(&topic, OutputType::Thread).await.unwrap();
        assert_eq!(posts.len(), 3);

        let seen = llm.last_request().unwrap();
        assert_eq!(seen.system, POST_WRITER_SYSTEM);
        assert!(seen.prompt.contains("Perplexity AI for research"));
        assert!(seen.prompt.contains("Twitter thread"));
        assert_eq!(seen.tool_name, FORMAT_TOOL_NAME);
        assert_eq!(seen.parameters["required"][0], "thread");
        assert!((seen.temperature - 0.7).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_every_mode_returns_its_contracted_length() {
        let cases = [
            (OutputType::Single, r#"{"tweet": "one"}"#, 1),
            (OutputType::Thread, r#"{"thread": ["a", "b", "c", "d"]}"#, 4),
            (OutputType::Variations, r#"{"variations": ["a", "b", "c"]}"#, 3),
        ];
        let topic = Topic::parse("AI tools").unwrap();

        for (mode, raw, expected_len) in cases {
            let generator = LlmPostGenerator::new(Arc::new(ScriptedLlm::returning(raw)));
            let posts = generator.generate(&topic, mode).await.unwrap();
            assert_eq!(posts.len(), expected_len, "mode {mode}");
        }
    }

    #[tokio::test]
    async fn test_non_json_model_output_is_invalid_format() {
        let generator =
            LlmPostGenerator::new(Arc::new(ScriptedLlm::returning("Here you go: great tweet!")));
        let topic = Topic::parse("AI tools").unwrap();
        let err = generator.generate(&topic, OutputType::Single).await.unwrap_err();
        assert!(matches!(err, GenerationError::InvalidFormat));
    }

    #[tokio::test]
    async fn test_provider_failure_is_surfaced() {
        let generator = LlmPostGenerator::new(Arc::new(ScriptedLlm::failing(503, "overloaded")));
        let topic = Topic::parse("AI tools").unwrap();
        let err = generator.generate(&topic, OutputType::Single).await.unwrap_err();
        assert!(matches!(err, GenerationError::Provider(_)));
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn test_generate_and_record_saves_to_history() {
        let generator = StubGenerator::new(vec!["AI is changing everything 🚀 #AI".to_string()]);
        let store = MemoryGenerationStore::new();
        let user = principal();
        let topic = Topic::parse("AI tools").unwrap();

        let outcome =
            generate_and_record(&generator, Some(&store), &user, &topic, OutputType::Single)
                .await
                .unwrap();

        assert!(outcome.saved);
        let history = store.list(user.id).await.unwrap();
        assert_eq!(history[0].topic, "AI tools");
        assert_eq!(history[0].tweets, outcome.tweets);
        assert_eq!(history[0].output_type, OutputType::Single);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_generated_posts() {
        let generator = StubGenerator::new(vec!["AI is changing everything 🚀 #AI".to_string()]);
        let user = principal();
        let topic = Topic::parse("AI tools").unwrap();

        let outcome =
            generate_and_record(&generator, Some(&FailingStore), &user, &topic, OutputType::Single)
                .await
                .unwrap();

        assert!(!outcome.saved);
        assert_eq!(outcome.tweets, vec!["AI is changing everything 🚀 #AI".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_store_yields_unsaved_outcome() {
        let generator = StubGenerator::new(vec!["post".to_string()]);
        let topic = Topic::parse("AI tools").unwrap();
        let outcome =
            generate_and_record(&generator, None, &principal(), &topic, OutputType::Single)
                .await
                .unwrap();
        assert!(!outcome.saved);
    }

    #[tokio::test]
    async fn test_generation_failure_does_not_save() {
        let generator = StubGenerator::failing();
        let store = MemoryGenerationStore::new();
        let user = principal();
        let topic = Topic::parse("AI tools").unwrap();

        let result =
            generate_and_record(&generator, Some(&store), &user, &topic, OutputType::Thread).await;

        assert!(result.is_err());
        assert!(store.list(user.id).await.unwrap().is_empty());
    }
}
