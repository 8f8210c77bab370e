//! Shared application state handed to every handler.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::clients::monobank::{MonobankClient, WebhookVerifier};
use crate::clients::nova_poshta::NovaPoshtaClient;
use crate::clients::telegram::TelegramNotifier;
use crate::clients::ukrposhta::UkrposhtaClient;
use crate::clients::{CarrierRegistry, Notifier, PaymentProvider};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub carriers: Arc<CarrierRegistry>,
    pub payments: Arc<dyn PaymentProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub webhook_verifier: Arc<WebhookVerifier>,
}

impl AppState {
    pub fn from_config(config: &Config, db: PgPool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        let carriers = CarrierRegistry::new(
            Arc::new(NovaPoshtaClient::new(
                http.clone(),
                config.nova_poshta.clone(),
            )),
            Arc::new(UkrposhtaClient::new(http.clone(), config.ukrposhta.clone())),
        );
        let payments = MonobankClient::new(http.clone(), config.payment.clone(), config.webhook_url());
        let notifier = TelegramNotifier::new(http, config.telegram.clone());
        let webhook_verifier = WebhookVerifier::new(&config.payment.public_key_base64)
            .context("invalid MONOBANK_PUBLIC_KEY")?;

        Ok(Self {
            db,
            carriers: Arc::new(carriers),
            payments: Arc::new(payments),
            notifier: Arc::new(notifier),
            webhook_verifier: Arc::new(webhook_verifier),
        })
    }
}
