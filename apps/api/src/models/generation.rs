use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::generation::{OutputType, PostSequence};

/// Raw `generations` row. `output_type` is stored as its persisted text value.
#[derive(Debug, Clone, FromRow)]
pub struct GenerationRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub topic: String,
    pub output_type: String,
    pub tweets: Vec<String>,
}

/// One persisted generation result. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub topic: String,
    pub output_type: OutputType,
    pub tweets: PostSequence,
}

/// Fields supplied by the caller on insert; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGeneration {
    pub user_id: Uuid,
    pub topic: String,
    pub output_type: OutputType,
    pub tweets: PostSequence,
}

impl TryFrom<GenerationRow> for Generation {
    type Error = crate::generation::output_type::UnknownOutputType;

    fn try_from(row: GenerationRow) -> Result<Self, Self::Error> {
        Ok(Generation {
            id: row.id,
            created_at: row.created_at,
            user_id: row.user_id,
            topic: row.topic,
            output_type: row.output_type.parse()?,
            tweets: row.tweets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(output_type: &str) -> GenerationRow {
        GenerationRow {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            user_id: Uuid::new_v4(),
            topic: "AI tools".to_string(),
            output_type: output_type.to_string(),
            tweets: vec!["one".to_string()],
        }
    }

    #[test]
    fn test_row_with_persisted_output_type_converts() {
        let generation = Generation::try_from(row("multiple tweet variations")).unwrap();
        assert_eq!(generation.output_type, OutputType::Variations);
    }

    #[test]
    fn test_row_with_unknown_output_type_is_rejected() {
        assert!(Generation::try_from(row("poll")).is_err());
    }

    #[test]
    fn test_generation_json_uses_persisted_output_type() {
        let generation = Generation::try_from(row("single tweet")).unwrap();
        let value = serde_json::to_value(&generation).unwrap();
        assert_eq!(value["output_type"], "single tweet");
        assert_eq!(value["tweets"][0], "one");
    }
}
