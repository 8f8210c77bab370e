//! Order management endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::Order;
use crate::error::ApiError;
use crate::fulfillment::{self, CreatedOrder, NewOrder, OrderUpdate, OrderWithItems};
use crate::state::AppState;
use crate::store;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

pub async fn list_orders(
    State(s): State<AppState>,
    Path(store_id): Path<Uuid>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Order>>, ApiError> {
    if !store::store_exists(&s.db, store_id).await? {
        return Err(ApiError::NotFound("store"));
    }
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let offset = i64::from((page - 1) * per_page);
    let orders = store::orders::list(&s.db, store_id, i64::from(per_page), offset).await?;
    let total = store::orders::count(&s.db, store_id).await?;
    Ok(Json(PaginatedResponse {
        data: orders,
        total,
        page,
    }))
}

pub async fn get_order(
    State(s): State<AppState>,
    Path((store_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<OrderWithItems>, ApiError> {
    let order = store::orders::find(&s.db, store_id, order_id)
        .await?
        .ok_or(ApiError::NotFound("order"))?;
    let items = store::orders::items_of(&s.db, order_id).await?;
    Ok(Json(OrderWithItems { order, items }))
}

pub async fn create_order(
    State(s): State<AppState>,
    Path(store_id): Path<Uuid>,
    Json(input): Json<NewOrder>,
) -> Result<(StatusCode, Json<CreatedOrder>), ApiError> {
    let created =
        fulfillment::create_order(&s.db, s.notifier.as_ref(), s.payments.as_ref(), store_id, input)
            .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_order(
    State(s): State<AppState>,
    Path((store_id, order_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<OrderUpdate>,
) -> Result<Json<OrderWithItems>, ApiError> {
    let updated = fulfillment::update_order(&s.db, store_id, order_id, input).await?;
    Ok(Json(updated))
}

pub async fn delete_order(
    State(s): State<AppState>,
    Path((store_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    fulfillment::delete_order(&s.db, store_id, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
