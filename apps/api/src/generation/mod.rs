// Post generation: topic + output mode -> hosted model -> validated posts.
// All model calls go through llm_client; nothing here talks HTTP directly.

pub mod generator;
pub mod handlers;
pub mod output_type;
pub mod prompts;
pub mod schema;

use async_trait::async_trait;
use thiserror::Error;

use crate::llm_client::LlmError;

pub use generator::{generate_and_record, GenerationOutcome, LlmPostGenerator};
pub use output_type::{OutputType, PostSequence, Topic, TopicError};

/// Every way a generation can fail. Display strings are shown to users as-is.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("The AI service request failed: {0}")]
    Provider(LlmError),

    #[error("Received an empty response from the AI.")]
    EmptyResponse,

    #[error("The AI returned an invalid response format.")]
    InvalidFormat,

    #[error("AI response did not contain a valid '{field}' {kind}.")]
    MissingField {
        field: &'static str,
        kind: &'static str,
    },

    #[error("AI response for a {mode} had {actual} posts, expected {expected}.")]
    UnexpectedLength {
        mode: OutputType,
        actual: usize,
        expected: &'static str,
    },

    #[error("AI response contained an empty post at position {position}.")]
    BlankPost { position: usize },
}

impl GenerationError {
    pub fn missing_field(mode: OutputType) -> Self {
        let kind = match mode {
            OutputType::Single => "field",
            OutputType::Thread | OutputType::Variations => "array",
        };
        GenerationError::MissingField {
            field: mode.field(),
            kind,
        }
    }

    pub fn unexpected_length(mode: OutputType, actual: usize) -> Self {
        let expected = match mode {
            OutputType::Single => "1",
            OutputType::Thread => "3-4",
            OutputType::Variations => "3",
        };
        GenerationError::UnexpectedLength {
            mode,
            actual,
            expected,
        }
    }
}

impl From<LlmError> for GenerationError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::EmptyContent => GenerationError::EmptyResponse,
            other => GenerationError::Provider(other),
        }
    }
}

/// The content-generation capability. Swap implementations without touching callers.
///
/// Carried in `AppState` as `Arc<dyn PostGenerator>`.
#[async_trait]
pub trait PostGenerator: Send + Sync {
    async fn generate(
        &self,
        topic: &Topic,
        mode: OutputType,
    ) -> Result<PostSequence, GenerationError>;
}
