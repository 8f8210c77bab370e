//! Revenue and stock analytics endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store;

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_revenue: Decimal,
    pub sales_count: i64,
    pub stock_count: i64,
}

pub async fn summary(
    State(s): State<AppState>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<Summary>, ApiError> {
    if !store::store_exists(&s.db, store_id).await? {
        return Err(ApiError::NotFound("store"));
    }
    Ok(Json(Summary {
        total_revenue: store::analytics::total_revenue(&s.db, store_id).await?,
        sales_count: store::analytics::sales_count(&s.db, store_id).await?,
        stock_count: store::analytics::stock_count(&s.db, store_id).await?,
    }))
}

#[derive(Debug, Deserialize)]
pub struct GraphParams {
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct GraphPoint {
    pub name: &'static str,
    pub total: Decimal,
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub async fn graph_revenue(
    State(s): State<AppState>,
    Path(store_id): Path<Uuid>,
    Query(p): Query<GraphParams>,
) -> Result<Json<Vec<GraphPoint>>, ApiError> {
    if !store::store_exists(&s.db, store_id).await? {
        return Err(ApiError::NotFound("store"));
    }
    let year = p.year.unwrap_or_else(|| Utc::now().year());
    let months = store::analytics::revenue_by_month(&s.db, store_id, year).await?;
    let graph = MONTHS
        .iter()
        .copied()
        .zip(months)
        .map(|(name, total)| GraphPoint { name, total })
        .collect();
    Ok(Json(graph))
}
