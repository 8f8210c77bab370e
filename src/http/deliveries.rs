//! Shipment creation and carrier directory lookups.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::clients::{CityOption, WarehouseOption};
use crate::domain::order::{Carrier, Order};
use crate::error::ApiError;
use crate::fulfillment::{self, ShipmentOptions};
use crate::state::AppState;

pub async fn create_shipment(
    State(s): State<AppState>,
    Path((store_id, order_id)): Path<(Uuid, Uuid)>,
    Json(options): Json<ShipmentOptions>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order =
        fulfillment::create_shipment(&s.db, &s.carriers, store_id, order_id, options).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

fn parse_carrier(value: &str) -> Result<Carrier, ApiError> {
    Carrier::parse(value).ok_or_else(|| ApiError::BadRequest(format!("unknown carrier {value}")))
}

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub q: String,
}

pub async fn search_cities(
    State(s): State<AppState>,
    Path(carrier): Path<String>,
    Query(query): Query<CityQuery>,
) -> Result<Json<Vec<CityOption>>, ApiError> {
    let carrier = parse_carrier(&carrier)?;
    let cities = s.carriers.get(carrier).search_cities(&query.q).await?;
    Ok(Json(cities))
}

#[derive(Debug, Deserialize)]
pub struct WarehouseQuery {
    pub city: String,
}

pub async fn list_warehouses(
    State(s): State<AppState>,
    Path(carrier): Path<String>,
    Query(query): Query<WarehouseQuery>,
) -> Result<Json<Vec<WarehouseOption>>, ApiError> {
    let carrier = parse_carrier(&carrier)?;
    let warehouses = s.carriers.get(carrier).warehouses(&query.city).await?;
    Ok(Json(warehouses))
}
