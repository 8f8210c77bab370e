//! Payment provider webhook.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::clients::monobank::InvoiceStatus;
use crate::error::ApiError;
use crate::fulfillment;
use crate::state::AppState;

/// Raw-body handler: the signature covers the exact bytes sent, so the
/// JSON is parsed only after verification.
pub async fn payment_webhook(
    State(s): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let signature = headers
        .get("x-sign")
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    if !s.webhook_verifier.verify(&body, signature) {
        return Err(ApiError::Forbidden);
    }

    let status: InvoiceStatus =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    fulfillment::apply_invoice_status(&s.db, &status).await?;
    Ok(StatusCode::OK)
}
