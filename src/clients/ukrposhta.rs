//! Ukrposhta e-commerce REST client (bearer-token API).

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    CarrierApi, CarrierError, CityOption, CreatedShipment, Recipient, RecipientRef,
    ShipmentRequest, WarehouseOption,
};
use crate::config::UkrposhtaConfig;

pub struct UkrposhtaClient {
    http: reqwest::Client,
    config: UkrposhtaConfig,
}

#[derive(Debug, Deserialize)]
struct ClientRow {
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct ShipmentRow {
    uuid: String,
    barcode: String,
}

#[derive(Debug, Deserialize)]
struct CityRow {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct PostOfficeRow {
    id: String,
    name: String,
}

impl UkrposhtaClient {
    pub fn new(http: reqwest::Client, config: UkrposhtaConfig) -> Self {
        Self { http, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

/// Shipment body for `POST /shipments`. Ukrposhta wants weight in grams
/// and the COD amount as `postPay`.
pub(crate) fn shipment_payload(config: &UkrposhtaConfig, request: &ShipmentRequest) -> Value {
    let parcel = &request.parcel;
    let weight_g = (parcel.weight_kg * 1000.0).round() as i64;
    let length_cm = parcel
        .dimensions
        .map(|d| d.length_cm.round() as i64)
        .unwrap_or(20);
    let mut body = json!({
        "sender": { "uuid": config.sender_uuid },
        "recipient": { "uuid": request.recipient_ref.contact },
        "deliveryType": "W2W",
        "paidByRecipient": true,
        "type": "STANDARD",
        "declaredPrice": parcel.declared_value.to_f64(),
        "description": parcel.description,
        "parcels": [{ "weight": weight_g, "length": length_cm }],
    });
    if let Some(amount) = &request.cash_on_delivery {
        body["postPay"] = json!(amount.to_f64());
    }
    body
}

#[async_trait]
impl CarrierApi for UkrposhtaClient {
    async fn ensure_recipient(&self, recipient: &Recipient) -> Result<RecipientRef, CarrierError> {
        let found: Vec<ClientRow> = self
            .http
            .get(self.url("/clients/phone"))
            .bearer_auth(&self.config.bearer_token)
            .query(&[("phoneNumber", recipient.phone.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(row) = found.into_iter().next() {
            return Ok(RecipientRef {
                counterparty: row.uuid.clone(),
                contact: row.uuid,
            });
        }

        let created: ClientRow = self
            .http
            .post(self.url("/clients"))
            .bearer_auth(&self.config.bearer_token)
            .json(&json!({
                "type": "INDIVIDUAL",
                "firstName": recipient.first_name,
                "lastName": recipient.last_name,
                "phoneNumber": recipient.phone,
                "addressId": recipient.address,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(RecipientRef {
            counterparty: created.uuid.clone(),
            contact: created.uuid,
        })
    }

    async fn create_shipment(
        &self,
        request: &ShipmentRequest,
    ) -> Result<CreatedShipment, CarrierError> {
        let body = shipment_payload(&self.config, request);
        let row: ShipmentRow = self
            .http
            .post(self.url("/shipments"))
            .bearer_auth(&self.config.bearer_token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(CreatedShipment {
            tracking_number: row.barcode,
            shipment_ref: Some(row.uuid),
        })
    }

    async fn search_cities(&self, query: &str) -> Result<Vec<CityOption>, CarrierError> {
        let rows: Vec<CityRow> = self
            .http
            .get(self.url("/address-classifier/cities"))
            .bearer_auth(&self.config.bearer_token)
            .query(&[("name", query)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| CityOption {
                id: row.id,
                name: row.name,
            })
            .collect())
    }

    async fn warehouses(&self, city_id: &str) -> Result<Vec<WarehouseOption>, CarrierError> {
        let rows: Vec<PostOfficeRow> = self
            .http
            .get(self.url("/address-classifier/postoffices"))
            .bearer_auth(&self.config.bearer_token)
            .query(&[("cityId", city_id)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| WarehouseOption {
                id: row.id,
                name: row.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::clients::{CargoType, Dimensions, ParcelSpec};

    fn test_request(cod: Option<Decimal>) -> ShipmentRequest {
        ShipmentRequest {
            recipient: Recipient {
                first_name: "Олена".into(),
                last_name: "Шевченко".into(),
                phone: "+380671234567".into(),
                city: "12345".into(),
                address: "67890".into(),
            },
            recipient_ref: RecipientRef {
                counterparty: "uuid-r".into(),
                contact: "uuid-r".into(),
            },
            parcel: ParcelSpec {
                weight_kg: 0.75,
                dimensions: Some(Dimensions {
                    width_cm: 20.0,
                    height_cm: 5.0,
                    length_cm: 28.0,
                }),
                cargo_type: CargoType::Parcel,
                description: "Книги".into(),
                declared_value: Decimal::new(32000, 2),
                seats: 1,
            },
            cash_on_delivery: cod,
        }
    }

    fn test_config() -> UkrposhtaConfig {
        UkrposhtaConfig {
            base_url: "https://www.ukrposhta.ua/ecom/0.0.1".into(),
            bearer_token: "token".into(),
            sender_uuid: "uuid-s".into(),
        }
    }

    #[test]
    fn weight_is_converted_to_grams() {
        let body = shipment_payload(&test_config(), &test_request(None));
        assert_eq!(body["parcels"][0]["weight"], 750);
        assert_eq!(body["parcels"][0]["length"], 28);
        assert!(body.get("postPay").is_none());
    }

    #[test]
    fn cod_amount_becomes_post_pay() {
        let body = shipment_payload(&test_config(), &test_request(Some(Decimal::new(32000, 2))));
        assert_eq!(body["postPay"], 320.0);
        assert_eq!(body["recipient"]["uuid"], "uuid-r");
        assert_eq!(body["sender"]["uuid"], "uuid-s");
    }
}
