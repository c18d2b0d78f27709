//! Response schemas per output mode, and validation of what the model sends back.

use serde_json::{json, Value};

use crate::generation::output_type::{OutputType, PostSequence};
use crate::generation::GenerationError;

/// JSON schema passed to the model as the `format_response` tool parameters.
pub fn response_schema(mode: OutputType) -> Value {
    match mode {
        OutputType::Single => json!({
            "type": "object",
            "properties": {
                "tweet": { "type": "string", "description": "The generated tweet content." }
            },
            "required": ["tweet"]
        }),
        OutputType::Thread => json!({
            "type": "object",
            "properties": {
                "thread": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 3,
                    "maxItems": 4,
                    "description": "An array of strings, where each string is a tweet in the thread."
                }
            },
            "required": ["thread"]
        }),
        OutputType::Variations => json!({
            "type": "object",
            "properties": {
                "variations": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 3,
                    "maxItems": 3,
                    "description": "An array of 3 distinct tweet variations."
                }
            },
            "required": ["variations"]
        }),
    }
}

/// Parses the raw tool output and enforces the mode's shape and length contract.
pub fn parse_posts(raw: &str, mode: OutputType) -> Result<PostSequence, GenerationError> {
    if raw.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(raw).map_err(|e| {
        tracing::error!("Failed to parse JSON response from AI: {e}");
        GenerationError::InvalidFormat
    })?;

    let field = mode.field();
    let posts = match (mode, value.get(field)) {
        (OutputType::Single, Some(Value::String(tweet))) => vec![tweet.clone()],
        (OutputType::Thread | OutputType::Variations, Some(Value::Array(items))) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| GenerationError::missing_field(mode))?,
        _ => return Err(GenerationError::missing_field(mode)),
    };

    if let Some(index) = posts.iter().position(|p| p.trim().is_empty()) {
        return Err(GenerationError::BlankPost {
            position: index + 1,
        });
    }

    let (min, max) = mode.post_count();
    if posts.len() < min || posts.len() > max {
        return Err(GenerationError::unexpected_length(mode, posts.len()));
    }

    Ok(posts)
}
