//! Nova Poshta JSON API client.
//!
//! Every call POSTs the same envelope to one endpoint:
//! `{ apiKey, modelName, calledMethod, methodProperties }` and gets back
//! `{ success, data: [...], errors: [...] }`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    parcel_volume, CarrierApi, CarrierError, CargoType, CityOption, CreatedShipment, Recipient,
    RecipientRef, ShipmentRequest, WarehouseOption,
};
use crate::config::NovaPoshtaConfig;

pub struct NovaPoshtaClient {
    http: reqwest::Client,
    config: NovaPoshtaConfig,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default = "Vec::new")]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CounterpartyRow {
    #[serde(rename = "Ref")]
    reference: String,
    #[serde(rename = "ContactPerson", default)]
    contact_person: Option<ContactList>,
}

#[derive(Debug, Deserialize)]
struct ContactList {
    #[serde(default = "Vec::new")]
    data: Vec<ContactRow>,
}

#[derive(Debug, Deserialize)]
struct ContactRow {
    #[serde(rename = "Ref")]
    reference: String,
}

#[derive(Debug, Deserialize)]
struct WaybillRow {
    #[serde(rename = "Ref")]
    reference: String,
    #[serde(rename = "IntDocNumber")]
    int_doc_number: String,
}

#[derive(Debug, Deserialize)]
struct DirectoryRow {
    #[serde(rename = "Ref")]
    reference: String,
    #[serde(rename = "Description")]
    description: String,
}

impl NovaPoshtaClient {
    pub fn new(http: reqwest::Client, config: NovaPoshtaConfig) -> Self {
        Self { http, config }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        properties: Value,
    ) -> Result<Vec<T>, CarrierError> {
        let body = json!({
            "apiKey": self.config.api_key,
            "modelName": model,
            "calledMethod": method,
            "methodProperties": properties,
        });
        let envelope: Envelope<T> = self
            .http
            .post(&self.config.base_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if !envelope.success {
            return Err(CarrierError::Rejected(envelope.errors.join("; ")));
        }
        Ok(envelope.data)
    }
}

/// `InternetDocument.save` method properties for a shipment.
pub(crate) fn waybill_payload(config: &NovaPoshtaConfig, request: &ShipmentRequest) -> Value {
    let parcel = &request.parcel;
    let mut properties = json!({
        "PayerType": "Recipient",
        "PaymentMethod": "Cash",
        "CargoType": match parcel.cargo_type {
            CargoType::Parcel => "Parcel",
            CargoType::Documents => "Documents",
        },
        "ServiceType": "WarehouseWarehouse",
        "Weight": parcel.weight_kg.to_string(),
        "SeatsAmount": parcel.seats.to_string(),
        "Description": parcel.description,
        "Cost": parcel.declared_value.to_string(),
        "CitySender": config.sender_city_ref,
        "Sender": config.sender_ref,
        "SenderAddress": config.sender_address_ref,
        "ContactSender": config.sender_contact_ref,
        "SendersPhone": config.sender_phone,
        "CityRecipient": request.recipient.city,
        "Recipient": request.recipient_ref.counterparty,
        "RecipientAddress": request.recipient.address,
        "ContactRecipient": request.recipient_ref.contact,
        "RecipientsPhone": request.recipient.phone,
    });
    if let Some(volume) = parcel_volume(parcel.cargo_type, parcel.dimensions.as_ref()) {
        properties["VolumeGeneral"] = json!(format!("{volume:.4}"));
    }
    if let Some(amount) = &request.cash_on_delivery {
        properties["BackwardDeliveryData"] = json!([{
            "PayerType": "Recipient",
            "CargoType": "Money",
            "RedeliveryString": amount.to_string(),
        }]);
    }
    properties
}

#[async_trait]
impl CarrierApi for NovaPoshtaClient {
    async fn ensure_recipient(&self, recipient: &Recipient) -> Result<RecipientRef, CarrierError> {
        let found: Vec<CounterpartyRow> = self
            .call(
                "Counterparty",
                "getCounterparties",
                json!({
                    "CounterpartyProperty": "Recipient",
                    "FindByString": recipient.phone,
                }),
            )
            .await?;

        if let Some(row) = found.into_iter().next() {
            let contacts: Vec<ContactRow> = self
                .call(
                    "Counterparty",
                    "getCounterpartyContactPersons",
                    json!({ "Ref": row.reference }),
                )
                .await?;
            let contact = contacts
                .into_iter()
                .next()
                .ok_or(CarrierError::MissingField("contact person"))?;
            return Ok(RecipientRef {
                counterparty: row.reference,
                contact: contact.reference,
            });
        }

        let created: Vec<CounterpartyRow> = self
            .call(
                "Counterparty",
                "save",
                json!({
                    "FirstName": recipient.first_name,
                    "LastName": recipient.last_name,
                    "Phone": recipient.phone,
                    "CounterpartyType": "PrivatePerson",
                    "CounterpartyProperty": "Recipient",
                }),
            )
            .await?;
        let row = created
            .into_iter()
            .next()
            .ok_or(CarrierError::MissingField("counterparty"))?;
        let contact = row
            .contact_person
            .and_then(|list| list.data.into_iter().next())
            .ok_or(CarrierError::MissingField("contact person"))?;
        Ok(RecipientRef {
            counterparty: row.reference,
            contact: contact.reference,
        })
    }

    async fn create_shipment(
        &self,
        request: &ShipmentRequest,
    ) -> Result<CreatedShipment, CarrierError> {
        let properties = waybill_payload(&self.config, request);
        let rows: Vec<WaybillRow> = self
            .call("InternetDocument", "save", properties)
            .await?;
        let row = rows
            .into_iter()
            .next()
            .ok_or(CarrierError::MissingField("waybill"))?;
        Ok(CreatedShipment {
            tracking_number: row.int_doc_number,
            shipment_ref: Some(row.reference),
        })
    }

    async fn search_cities(&self, query: &str) -> Result<Vec<CityOption>, CarrierError> {
        let rows: Vec<DirectoryRow> = self
            .call("Address", "getCities", json!({ "FindByString": query }))
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| CityOption {
                id: row.reference,
                name: row.description,
            })
            .collect())
    }

    async fn warehouses(&self, city_id: &str) -> Result<Vec<WarehouseOption>, CarrierError> {
        let rows: Vec<DirectoryRow> = self
            .call("Address", "getWarehouses", json!({ "CityRef": city_id }))
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| WarehouseOption {
                id: row.reference,
                name: row.description,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::clients::{Dimensions, ParcelSpec};

    fn test_config() -> NovaPoshtaConfig {
        NovaPoshtaConfig {
            base_url: "https://api.novaposhta.ua/v2.0/json/".into(),
            api_key: "key".into(),
            sender_city_ref: "city-s".into(),
            sender_ref: "sender".into(),
            sender_address_ref: "addr-s".into(),
            sender_contact_ref: "contact-s".into(),
            sender_phone: "+380501112233".into(),
        }
    }

    fn test_request(cargo_type: CargoType, cod: Option<Decimal>) -> ShipmentRequest {
        ShipmentRequest {
            recipient: Recipient {
                first_name: "Олена".into(),
                last_name: "Шевченко".into(),
                phone: "+380671234567".into(),
                city: "city-r".into(),
                address: "addr-r".into(),
            },
            recipient_ref: RecipientRef {
                counterparty: "cp-r".into(),
                contact: "contact-r".into(),
            },
            parcel: ParcelSpec {
                weight_kg: 1.2,
                dimensions: Some(Dimensions {
                    width_cm: 20.0,
                    height_cm: 10.0,
                    length_cm: 30.0,
                }),
                cargo_type,
                description: "Книги".into(),
                declared_value: Decimal::new(59800, 2),
                seats: 1,
            },
            cash_on_delivery: cod,
        }
    }

    #[test]
    fn waybill_carries_volume_for_parcels() {
        let payload = waybill_payload(&test_config(), &test_request(CargoType::Parcel, None));
        assert_eq!(payload["VolumeGeneral"], "0.0060");
        assert_eq!(payload["CargoType"], "Parcel");
        assert!(payload.get("BackwardDeliveryData").is_none());
    }

    #[test]
    fn documents_ship_without_volume() {
        let payload = waybill_payload(&test_config(), &test_request(CargoType::Documents, None));
        assert!(payload.get("VolumeGeneral").is_none());
        assert_eq!(payload["CargoType"], "Documents");
    }

    #[test]
    fn cod_order_gets_cash_collection_clause() {
        let payload = waybill_payload(
            &test_config(),
            &test_request(CargoType::Parcel, Some(Decimal::new(59800, 2))),
        );
        let backward = &payload["BackwardDeliveryData"][0];
        assert_eq!(backward["CargoType"], "Money");
        assert_eq!(backward["RedeliveryString"], "598.00");
    }

    #[test]
    fn recipient_refs_land_in_payload() {
        let payload = waybill_payload(&test_config(), &test_request(CargoType::Parcel, None));
        assert_eq!(payload["Recipient"], "cp-r");
        assert_eq!(payload["ContactRecipient"], "contact-r");
        assert_eq!(payload["CityRecipient"], "city-r");
        assert_eq!(payload["Sender"], "sender");
    }
}
