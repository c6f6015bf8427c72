//! Telegram Bot API transport (`POST /bot<token>/sendMessage`).

use super::Notifier;
use crate::config::TelegramConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct TelegramBot {
    client: Client,
    base_url: String,
    token: String,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramBot {
    pub fn new(config: &TelegramConfig, token: String, chat_id: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("failed to build Telegram HTTP client")?;
        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            token,
            chat_id,
        })
    }
}

#[async_trait]
impl Notifier for TelegramBot {
    async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let body = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        // The URL embeds the bot token, so keep it out of error messages.
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Telegram request failed: {}", e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Telegram sendMessage failed ({}): {}", status, text);
        }

        let parsed: ApiResponse = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("failed to parse Telegram response: {}", e.without_url()))?;
        if !parsed.ok {
            anyhow::bail!(
                "Telegram rejected message: {}",
                parsed.description.unwrap_or_default()
            );
        }
        Ok(())
    }
}
