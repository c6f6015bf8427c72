use super::HomeworkSource;
use crate::config::PracticumConfig;
use crate::error::RelayError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub struct PracticumClient {
    client: Client,
    token: String,
    endpoint: String,
}

impl PracticumClient {
    pub fn new(config: &PracticumConfig, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("failed to build Practicum HTTP client")?;
        Ok(Self {
            client,
            token,
            endpoint: config.endpoint.clone(),
        })
    }

    fn auth_header(&self) -> String {
        format!("OAuth {}", self.token)
    }
}

#[async_trait]
impl HomeworkSource for PracticumClient {
    async fn fetch_statuses(&self, from_date: i64) -> Result<Value, RelayError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, self.auth_header())
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(endpoint = %self.endpoint, error = %e, "homework API unreachable");
                RelayError::Transport(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::error!(endpoint = %self.endpoint, %status, "homework API returned error status");
            return Err(RelayError::UnexpectedStatus(status));
        }

        resp.json::<Value>().await.map_err(|e| {
            tracing::error!(error = %e, "failed to decode homework API response");
            RelayError::Decode(e)
        })
    }
}
