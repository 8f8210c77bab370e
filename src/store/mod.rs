//! PostgreSQL queries, grouped per table.

pub mod analytics;
pub mod orders;
pub mod products;

use sqlx::PgPool;
use uuid::Uuid;

/// Multi-tenant guard: every request is scoped to an existing store.
pub async fn store_exists(db: &PgPool, store_id: Uuid) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM stores WHERE id = $1)")
        .bind(store_id)
        .fetch_one(db)
        .await?;
    Ok(row.0)
}
