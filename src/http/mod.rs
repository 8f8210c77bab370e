//! HTTP surface: store-scoped order management, shipment creation,
//! carrier directory lookups, the payment webhook and analytics.

pub mod analytics;
pub mod deliveries;
pub mod orders;
pub mod webhooks;

use axum::routing::{get, post};
use axum::{Json, Router};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy", "service": "kazka-backoffice"})) }),
        )
        .route(
            "/api/v1/stores/:store_id/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route(
            "/api/v1/stores/:store_id/orders/:order_id",
            get(orders::get_order)
                .patch(orders::update_order)
                .delete(orders::delete_order),
        )
        .route(
            "/api/v1/stores/:store_id/orders/:order_id/shipment",
            post(deliveries::create_shipment),
        )
        .route(
            "/api/v1/delivery/:carrier/cities",
            get(deliveries::search_cities),
        )
        .route(
            "/api/v1/delivery/:carrier/warehouses",
            get(deliveries::list_warehouses),
        )
        .route(
            "/api/v1/stores/:store_id/analytics/summary",
            get(analytics::summary),
        )
        .route(
            "/api/v1/stores/:store_id/analytics/graph-revenue",
            get(analytics::graph_revenue),
        )
        .route("/api/v1/webhooks/payment", post(webhooks::payment_webhook))
        .with_state(state)
}
