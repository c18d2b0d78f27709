use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{GenerationStore, StoreError};
use crate::models::generation::{Generation, GenerationRow, NewGeneration};

/// `generations` table in PostgreSQL.
#[derive(Clone)]
pub struct PgGenerationStore {
    pool: PgPool,
}

impl PgGenerationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Pool exhaustion or shutdown means the database is unreachable, not that a query failed.
fn store_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Database(other),
    }
}

fn into_generation(row: GenerationRow) -> Result<Generation, StoreError> {
    let id = row.id;
    Generation::try_from(row).map_err(|e| StoreError::CorruptRow {
        id,
        reason: e.to_string(),
    })
}

#[async_trait]
impl GenerationStore for PgGenerationStore {
    async fn save(&self, new: NewGeneration) -> Result<Generation, StoreError> {
        // Append-only: one INSERT, never UPDATE
        let row = sqlx::query_as::<_, GenerationRow>(
            r#"
            INSERT INTO generations (user_id, topic, output_type, tweets)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at, user_id, topic, output_type, tweets
            "#,
        )
        .bind(new.user_id)
        .bind(&new.topic)
        .bind(new.output_type.as_str())
        .bind(&new.tweets)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        into_generation(row)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Generation>, StoreError> {
        let rows = sqlx::query_as::<_, GenerationRow>(
            r#"
            SELECT id, created_at, user_id, topic, output_type, tweets
            FROM generations
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter().map(into_generation).collect()
    }
}
