//! Environment-driven configuration.

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Base URL this service is reachable at, used for webhook callbacks.
    pub public_url: String,
    pub nova_poshta: NovaPoshtaConfig,
    pub ukrposhta: UkrposhtaConfig,
    pub payment: PaymentConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone)]
pub struct NovaPoshtaConfig {
    pub base_url: String,
    pub api_key: String,
    pub sender_city_ref: String,
    pub sender_ref: String,
    pub sender_address_ref: String,
    pub sender_contact_ref: String,
    pub sender_phone: String,
}

#[derive(Debug, Clone)]
pub struct UkrposhtaConfig {
    pub base_url: String,
    pub bearer_token: String,
    pub sender_uuid: String,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub base_url: String,
    pub token: String,
    /// Provider ECDSA public key (base64, uncompressed P-256 point) used
    /// to check webhook signatures.
    pub public_key_base64: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub base_url: String,
    pub bot_token: String,
    pub chat_id: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: optional("PORT", "8083").parse().context("PORT must be a number")?,
            public_url: required("PUBLIC_URL")?,
            nova_poshta: NovaPoshtaConfig {
                base_url: optional("NOVA_POSHTA_URL", "https://api.novaposhta.ua/v2.0/json/"),
                api_key: required("NOVA_POSHTA_API_KEY")?,
                sender_city_ref: required("NOVA_POSHTA_SENDER_CITY_REF")?,
                sender_ref: required("NOVA_POSHTA_SENDER_REF")?,
                sender_address_ref: required("NOVA_POSHTA_SENDER_ADDRESS_REF")?,
                sender_contact_ref: required("NOVA_POSHTA_SENDER_CONTACT_REF")?,
                sender_phone: required("NOVA_POSHTA_SENDER_PHONE")?,
            },
            ukrposhta: UkrposhtaConfig {
                base_url: optional("UKRPOSHTA_URL", "https://www.ukrposhta.ua/ecom/0.0.1"),
                bearer_token: required("UKRPOSHTA_BEARER_TOKEN")?,
                sender_uuid: required("UKRPOSHTA_SENDER_UUID")?,
            },
            payment: PaymentConfig {
                base_url: optional("MONOBANK_URL", "https://api.monobank.ua"),
                token: required("MONOBANK_TOKEN")?,
                public_key_base64: required("MONOBANK_PUBLIC_KEY")?,
                redirect_url: required("PAYMENT_REDIRECT_URL")?,
            },
            telegram: TelegramConfig {
                base_url: optional("TELEGRAM_URL", "https://api.telegram.org"),
                bot_token: required("TELEGRAM_BOT_TOKEN")?,
                chat_id: required("TELEGRAM_CHAT_ID")?,
            },
        })
    }

    pub fn webhook_url(&self) -> String {
        format!(
            "{}/api/v1/webhooks/payment",
            self.public_url.trim_end_matches('/')
        )
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} is not set"))
}

fn optional(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
