//! Telegram bot notification sink.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Notifier, NotifyError};
use crate::config::TelegramConfig;

pub struct TelegramNotifier {
    http: reqwest::Client,
    config: TelegramConfig,
}

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(http: reqwest::Client, config: TelegramConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn order_created(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.base_url.trim_end_matches('/'),
            self.config.bot_token
        );
        let response: BotResponse = self
            .http
            .post(url)
            .json(&json!({ "chat_id": self.config.chat_id, "text": text }))
            .send()
            .await?
            .json()
            .await?;
        if !response.ok {
            return Err(NotifyError::Rejected(
                response.description.unwrap_or_else(|| "unknown".into()),
            ));
        }
        Ok(())
    }
}
