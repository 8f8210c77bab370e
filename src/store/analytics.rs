//! Revenue and stock aggregates per store.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn total_revenue(db: &PgPool, store_id: Uuid) -> Result<Decimal, sqlx::Error> {
    let row: (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(oi.unit_price * oi.quantity), 0) \
         FROM orders o JOIN order_items oi ON oi.order_id = o.id \
         WHERE o.store_id = $1 AND o.is_paid",
    )
    .bind(store_id)
    .fetch_one(db)
    .await?;
    Ok(row.0)
}

pub async fn sales_count(db: &PgPool, store_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE store_id = $1 AND is_paid")
            .bind(store_id)
            .fetch_one(db)
            .await?;
    Ok(row.0)
}

pub async fn stock_count(db: &PgPool, store_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM products \
         WHERE store_id = $1 AND NOT is_archived",
    )
    .bind(store_id)
    .fetch_one(db)
    .await?;
    Ok(row.0)
}

/// Paid revenue per calendar month of the given year, January first.
/// Months without sales stay at zero.
pub async fn revenue_by_month(
    db: &PgPool,
    store_id: Uuid,
    year: i32,
) -> Result<Vec<Decimal>, sqlx::Error> {
    let rows: Vec<(i32, Decimal)> = sqlx::query_as(
        "SELECT CAST(EXTRACT(MONTH FROM o.created_at) AS INT), \
                SUM(oi.unit_price * oi.quantity) \
         FROM orders o JOIN order_items oi ON oi.order_id = o.id \
         WHERE o.store_id = $1 AND o.is_paid \
           AND CAST(EXTRACT(YEAR FROM o.created_at) AS INT) = $2 \
         GROUP BY 1",
    )
    .bind(store_id)
    .bind(year)
    .fetch_all(db)
    .await?;

    let mut months = vec![Decimal::ZERO; 12];
    for (month, revenue) in rows {
        if (1..=12).contains(&month) {
            months[(month - 1) as usize] = revenue;
        }
    }
    Ok(months)
}
