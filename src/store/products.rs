//! Product queries used by the fulfillment flow.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::product::{self, Product};

#[derive(Debug, Clone, Copy)]
pub struct StockLevel {
    pub quantity: i32,
    pub is_archived: bool,
}

/// Loads the products referenced by an order's lines, scoped to the store.
pub async fn find_for_order(
    db: &PgPool,
    store_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE store_id = $1 AND id = ANY($2)")
        .bind(store_id)
        .bind(ids)
        .fetch_all(db)
        .await
}

/// Applies one signed stock adjustment. Read-modify-write on purpose:
/// the whole flow is sequential and unguarded (see fulfillment docs).
/// Returns `None` when the product no longer exists.
pub async fn adjust_stock(
    db: &PgPool,
    store_id: Uuid,
    product_id: Uuid,
    change: i64,
) -> Result<Option<StockLevel>, sqlx::Error> {
    let row: Option<(i32, bool)> =
        sqlx::query_as("SELECT quantity, is_archived FROM products WHERE id = $1 AND store_id = $2")
            .bind(product_id)
            .bind(store_id)
            .fetch_optional(db)
            .await?;
    let Some((quantity, was_archived)) = row else {
        return Ok(None);
    };

    let new_quantity = i64::from(quantity) + change;
    let is_archived = product::archived_after(new_quantity, was_archived);
    let quantity = new_quantity.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;

    sqlx::query(
        "UPDATE products SET quantity = $2, is_archived = $3, updated_at = NOW() WHERE id = $1",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(is_archived)
    .execute(db)
    .await?;

    Ok(Some(StockLevel {
        quantity,
        is_archived,
    }))
}
