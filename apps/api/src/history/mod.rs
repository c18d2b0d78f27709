//! Generation history: per-user storage of generated posts.
//!
//! Rows are insert-only. Every read is scoped by the caller's `user_id`, which
//! handlers take from the authenticated principal, never from the request body.

pub mod handlers;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::generation::{Generation, NewGeneration};

pub use memory::MemoryGenerationStore;
pub use postgres::PgGenerationStore;

/// Shown to users when history cannot be loaded.
pub const HISTORY_UNAVAILABLE_MESSAGE: &str =
    "Failed to fetch your saved generations. Please try again later.";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt generation row {id}: {reason}")]
    CorruptRow { id: Uuid, reason: String },

    #[error("History store is unavailable: {0}")]
    Unavailable(String),
}

/// Storage for generation records.
///
/// Carried in `AppState` as `Arc<dyn GenerationStore>`.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Inserts one record in a single statement and returns it with `id` and `created_at` set.
    async fn save(&self, new: NewGeneration) -> Result<Generation, StoreError>;

    /// All records for `user_id`, most recent first. No rows is `Ok(vec![])`.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Generation>, StoreError>;
}

/// Saves a generation without letting a failure reach the caller.
///
/// Returns whether the record was stored. A failure is logged and reported as
/// `false` so the generated posts are still shown, just without a saved mark.
pub async fn save_best_effort(store: &dyn GenerationStore, new: NewGeneration) -> bool {
    let user_id = new.user_id;
    match store.save(new).await {
        Ok(saved) => {
            info!("Saved generation {} for user {}", saved.id, user_id);
            true
        }
        Err(e) => {
            error!("Error saving generation for user {user_id}: {e}");
            false
        }
    }
}
