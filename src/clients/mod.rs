//! Outbound integrations: parcel carriers, the payment provider and the
//! staff chat notification sink. Each lives behind a trait so the
//! fulfillment flow can be exercised without the network.

pub mod monobank;
pub mod nova_poshta;
pub mod telegram;
pub mod ukrposhta;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::order::Carrier;

#[derive(Debug, Error)]
pub enum CarrierError {
    #[error("carrier request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("carrier rejected request: {0}")]
    Rejected(String),

    #[error("carrier response missing {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("payment provider rejected request: {0}")]
    Rejected(String),

    #[error("invalid payment provider public key")]
    InvalidPublicKey,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification sink rejected message: {0}")]
    Rejected(String),
}

/// Order recipient as the carriers see it. `city` and `address` carry
/// carrier-side identifiers picked through the directory lookup.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub city: String,
    pub address: String,
}

/// Carrier-side references for a recipient contact record.
#[derive(Debug, Clone)]
pub struct RecipientRef {
    pub counterparty: String,
    pub contact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CargoType {
    Parcel,
    Documents,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Dimensions {
    pub width_cm: f64,
    pub height_cm: f64,
    pub length_cm: f64,
}

/// Parcel volume in cubic metres. Documents ship without one.
pub fn parcel_volume(cargo_type: CargoType, dimensions: Option<&Dimensions>) -> Option<f64> {
    if cargo_type == CargoType::Documents {
        return None;
    }
    dimensions.map(|d| d.width_cm * d.height_cm * d.length_cm / 1_000_000.0)
}

#[derive(Debug, Clone)]
pub struct ParcelSpec {
    pub weight_kg: f64,
    pub dimensions: Option<Dimensions>,
    pub cargo_type: CargoType,
    pub description: String,
    pub declared_value: Decimal,
    pub seats: u32,
}

#[derive(Debug, Clone)]
pub struct ShipmentRequest {
    pub recipient: Recipient,
    pub recipient_ref: RecipientRef,
    pub parcel: ParcelSpec,
    /// Amount to collect from the recipient on delivery, when the order
    /// is pay-on-delivery.
    pub cash_on_delivery: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct CreatedShipment {
    pub tracking_number: String,
    pub shipment_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CityOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WarehouseOption {
    pub id: String,
    pub name: String,
}

#[async_trait]
pub trait CarrierApi: Send + Sync {
    /// Looks up the recipient's contact record on the carrier side,
    /// creating it when absent.
    async fn ensure_recipient(&self, recipient: &Recipient) -> Result<RecipientRef, CarrierError>;

    async fn create_shipment(
        &self,
        request: &ShipmentRequest,
    ) -> Result<CreatedShipment, CarrierError>;

    async fn search_cities(&self, query: &str) -> Result<Vec<CityOption>, CarrierError>;

    async fn warehouses(&self, city_id: &str) -> Result<Vec<WarehouseOption>, CarrierError>;
}

#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    pub amount_minor: i64,
    pub reference: Uuid,
    pub destination: String,
}

#[derive(Debug, Clone)]
pub struct Invoice {
    pub invoice_id: String,
    pub page_url: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, PaymentError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn order_created(&self, text: &str) -> Result<(), NotifyError>;
}

/// Resolves the carrier stored on an order to its API client.
pub struct CarrierRegistry {
    nova_poshta: Arc<dyn CarrierApi>,
    ukrposhta: Arc<dyn CarrierApi>,
}

impl CarrierRegistry {
    pub fn new(nova_poshta: Arc<dyn CarrierApi>, ukrposhta: Arc<dyn CarrierApi>) -> Self {
        Self {
            nova_poshta,
            ukrposhta,
        }
    }

    pub fn get(&self, carrier: Carrier) -> &Arc<dyn CarrierApi> {
        match carrier {
            Carrier::NovaPoshta => &self.nova_poshta,
            Carrier::Ukrposhta => &self.ukrposhta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_cubic_metres() {
        let dims = Dimensions {
            width_cm: 20.0,
            height_cm: 10.0,
            length_cm: 30.0,
        };
        let volume = parcel_volume(CargoType::Parcel, Some(&dims));
        assert_eq!(volume, Some(0.006));
    }

    #[test]
    fn documents_have_no_volume() {
        let dims = Dimensions {
            width_cm: 20.0,
            height_cm: 10.0,
            length_cm: 30.0,
        };
        assert_eq!(parcel_volume(CargoType::Documents, Some(&dims)), None);
    }

    #[test]
    fn missing_dimensions_mean_no_volume() {
        assert_eq!(parcel_volume(CargoType::Parcel, None), None);
    }
}
