//! Merchant invoice API client and webhook signature verification.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_ASN1};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Invoice, InvoiceRequest, PaymentError, PaymentProvider};
use crate::config::PaymentConfig;

/// Hryvnia, ISO 4217.
const CCY_UAH: u32 = 980;

pub struct MonobankClient {
    http: reqwest::Client,
    config: PaymentConfig,
    webhook_url: String,
}

#[derive(Debug, Deserialize)]
struct InvoiceResponse {
    #[serde(rename = "invoiceId")]
    invoice_id: String,
    #[serde(rename = "pageUrl")]
    page_url: String,
}

impl MonobankClient {
    pub fn new(http: reqwest::Client, config: PaymentConfig, webhook_url: String) -> Self {
        Self {
            http,
            config,
            webhook_url,
        }
    }
}

pub(crate) fn invoice_payload(
    request: &InvoiceRequest,
    redirect_url: &str,
    webhook_url: &str,
) -> Value {
    json!({
        "amount": request.amount_minor,
        "ccy": CCY_UAH,
        "merchantPaymInfo": {
            "reference": request.reference.to_string(),
            "destination": request.destination,
        },
        "redirectUrl": redirect_url,
        "webHookUrl": webhook_url,
    })
}

#[async_trait]
impl PaymentProvider for MonobankClient {
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<Invoice, PaymentError> {
        let body = invoice_payload(request, &self.config.redirect_url, &self.webhook_url);
        let response = self
            .http
            .post(format!(
                "{}/api/merchant/invoice/create",
                self.config.base_url.trim_end_matches('/')
            ))
            .header("X-Token", &self.config.token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PaymentError::Rejected(text));
        }
        let invoice: InvoiceResponse = response.json().await?;
        Ok(Invoice {
            invoice_id: invoice.invoice_id,
            page_url: invoice.page_url,
        })
    }
}

/// Webhook payload carrying the invoice status.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceStatus {
    #[serde(rename = "invoiceId")]
    pub invoice_id: String,
    pub status: String,
    #[serde(default)]
    pub reference: Option<String>,
}

impl InvoiceStatus {
    pub fn is_settled(&self) -> bool {
        self.status == "success"
    }
}

/// Checks the `X-Sign` header: a base64 ECDSA P-256 signature over the
/// raw webhook body, against the provider public key.
pub struct WebhookVerifier {
    public_key: Vec<u8>,
}

impl WebhookVerifier {
    pub fn new(public_key_base64: &str) -> Result<Self, PaymentError> {
        let public_key = BASE64
            .decode(public_key_base64.trim())
            .map_err(|_| PaymentError::InvalidPublicKey)?;
        Ok(Self { public_key })
    }

    pub fn verify(&self, body: &[u8], signature_base64: &str) -> bool {
        let Ok(signature) = BASE64.decode(signature_base64.trim()) else {
            return false;
        };
        UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, &self.public_key)
            .verify(body, &signature)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use ring::rand::SystemRandom;
    use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn invoice_payload_shape() {
        let reference = Uuid::new_v4();
        let request = InvoiceRequest {
            amount_minor: 59800,
            reference,
            destination: "Замовлення №ORD-00001234".into(),
        };
        let body = invoice_payload(&request, "https://shop.example/thanks", "https://shop.example/api/v1/webhooks/payment");
        assert_eq!(body["amount"], 59800);
        assert_eq!(body["ccy"], 980);
        assert_eq!(body["merchantPaymInfo"]["reference"], reference.to_string());
        assert_eq!(body["webHookUrl"], "https://shop.example/api/v1/webhooks/payment");
    }

    #[test]
    fn webhook_signature_round_trip() {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng).unwrap();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &rng)
                .unwrap();

        let body = br#"{"invoiceId":"inv-1","status":"success"}"#;
        let signature = key_pair.sign(&rng, body).unwrap();

        let verifier =
            WebhookVerifier::new(&BASE64.encode(key_pair.public_key().as_ref())).unwrap();
        assert!(verifier.verify(body, &BASE64.encode(signature.as_ref())));

        let tampered = br#"{"invoiceId":"inv-1","status":"failure"}"#;
        assert!(!verifier.verify(tampered, &BASE64.encode(signature.as_ref())));
        assert!(!verifier.verify(body, "not-base64!!"));
    }

    #[test]
    fn settled_only_on_success() {
        let paid: InvoiceStatus =
            serde_json::from_str(r#"{"invoiceId":"inv-1","status":"success"}"#).unwrap();
        assert!(paid.is_settled());
        let failed: InvoiceStatus =
            serde_json::from_str(r#"{"invoiceId":"inv-1","status":"failure"}"#).unwrap();
        assert!(!failed.is_settled());
    }
}
