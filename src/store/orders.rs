//! Order and order-item queries.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::order::{Order, OrderItem};

pub async fn insert(db: &PgPool, order: &Order) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orders (id, store_id, order_number, name, surname, phone, carrier, city, \
         address, tracking_number, is_paid, order_state, order_status, invoice_id, created_at, \
         updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
    )
    .bind(order.id)
    .bind(order.store_id)
    .bind(&order.order_number)
    .bind(&order.name)
    .bind(&order.surname)
    .bind(&order.phone)
    .bind(&order.carrier)
    .bind(&order.city)
    .bind(&order.address)
    .bind(&order.tracking_number)
    .bind(order.is_paid)
    .bind(&order.order_state)
    .bind(&order.order_status)
    .bind(&order.invoice_id)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn insert_items(db: &PgPool, items: &[OrderItem]) -> Result<(), sqlx::Error> {
    for item in items {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, product_id, name, unit_price, quantity, \
             created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(item.id)
        .bind(item.order_id)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(item.created_at)
        .execute(db)
        .await?;
    }
    Ok(())
}

pub async fn find(
    db: &PgPool,
    store_id: Uuid,
    order_id: Uuid,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND store_id = $2")
        .bind(order_id)
        .bind(store_id)
        .fetch_optional(db)
        .await
}

pub async fn list(
    db: &PgPool,
    store_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE store_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(store_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn count(db: &PgPool, store_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE store_id = $1")
        .bind(store_id)
        .fetch_one(db)
        .await?;
    Ok(row.0)
}

pub async fn items_of(db: &PgPool, order_id: Uuid) -> Result<Vec<OrderItem>, sqlx::Error> {
    sqlx::query_as::<_, OrderItem>(
        "SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at",
    )
    .bind(order_id)
    .fetch_all(db)
    .await
}

pub async fn delete_items(db: &PgPool, order_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete(db: &PgPool, order_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(order_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Rewrites the mutable order header fields after an edit.
pub async fn update_header(db: &PgPool, order: &Order) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE orders SET name = $2, surname = $3, phone = $4, carrier = $5, city = $6, \
         address = $7, is_paid = $8, order_state = $9, order_status = $10, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(order.id)
    .bind(&order.name)
    .bind(&order.surname)
    .bind(&order.phone)
    .bind(&order.carrier)
    .bind(&order.city)
    .bind(&order.address)
    .bind(order.is_paid)
    .bind(&order.order_state)
    .bind(&order.order_status)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn set_tracking(
    db: &PgPool,
    order_id: Uuid,
    tracking_number: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET tracking_number = $2, updated_at = NOW() WHERE id = $1")
        .bind(order_id)
        .bind(tracking_number)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_invoice(db: &PgPool, order_id: Uuid, invoice_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET invoice_id = $2, updated_at = NOW() WHERE id = $1")
        .bind(order_id)
        .bind(invoice_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Marks the order referenced by a settled invoice as paid. Returns the
/// order id when one matched.
pub async fn mark_paid_by_invoice(
    db: &PgPool,
    invoice_id: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "UPDATE orders SET is_paid = TRUE, order_status = 'paid', updated_at = NOW() \
         WHERE invoice_id = $1 RETURNING id",
    )
    .bind(invoice_id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(|(id,)| id))
}
