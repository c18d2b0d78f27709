use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{GenerationStore, StoreError};
use crate::models::generation::{Generation, NewGeneration};

/// Process-local history, lost on restart. Used with `HISTORY_STORE=memory` and in tests.
#[derive(Default)]
pub struct MemoryGenerationStore {
    rows: RwLock<Vec<Generation>>,
}

impl MemoryGenerationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GenerationStore for MemoryGenerationStore {
    async fn save(&self, new: NewGeneration) -> Result<Generation, StoreError> {
        let generation = Generation {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            user_id: new.user_id,
            topic: new.topic,
            output_type: new.output_type,
            tweets: new.tweets,
        };
        self.rows.write().await.push(generation.clone());
        Ok(generation)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Generation>, StoreError> {
        let mut listed: Vec<Generation> = self
            .rows
            .read()
            .await
            .iter()
            .rev()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort: equal timestamps keep newest-inserted first
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::OutputType;

    fn new_generation(user_id: Uuid, topic: &str, output_type: OutputType, tweets: &[&str]) -> NewGeneration {
        NewGeneration {
            user_id,
            topic: topic.to_string(),
            output_type,
            tweets: tweets.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_list_for_new_user_is_empty() {
        let store = MemoryGenerationStore::new();
        assert!(store.list(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_list_round_trips_fields() {
        let store = MemoryGenerationStore::new();
        let user_id = Uuid::new_v4();
        let tweets = ["Hook 🧵", "Value", "Follow for more"];

        let saved = store
            .save(new_generation(user_id, "Rust async", OutputType::Thread, &tweets))
            .await
            .unwrap();

        let listed = store.list(user_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], saved);
        assert_eq!(listed[0].topic, "Rust async");
        assert_eq!(listed[0].output_type, OutputType::Thread);
        assert_eq!(listed[0].tweets, vec!["Hook 🧵", "Value", "Follow for more"]);
    }

    #[tokio::test]
    async fn test_most_recent_generation_is_listed_first() {
        let store = MemoryGenerationStore::new();
        let user_id = Uuid::new_v4();

        store
            .save(new_generation(user_id, "first", OutputType::Single, &["a"]))
            .await
            .unwrap();
        store
            .save(new_generation(user_id, "second", OutputType::Single, &["b"]))
            .await
            .unwrap();
        let latest = store
            .save(new_generation(user_id, "third", OutputType::Variations, &["x", "y", "z"]))
            .await
            .unwrap();

        let listed = store.list(user_id).await.unwrap();
        let topics: Vec<&str> = listed.iter().map(|g| g.topic.as_str()).collect();
        assert_eq!(topics, vec!["third", "second", "first"]);
        assert_eq!(listed[0].id, latest.id);
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_user() {
        let store = MemoryGenerationStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store
            .save(new_generation(alice, "alice topic", OutputType::Single, &["a"]))
            .await
            .unwrap();
        store
            .save(new_generation(bob, "bob topic", OutputType::Single, &["b"]))
            .await
            .unwrap();

        let listed = store.list(alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|g| g.user_id == alice));
    }
}
