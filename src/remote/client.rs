// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};
use crate::error::{DirectoryError, Result};
use crate::remote::traits::DirectoryClient;
use crate::store::models::Airline;

/// Fetches the airline directory over HTTP. One attempt per call.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    client: Client,
    url: String,
}

impl HttpDirectoryClient {
    pub fn new(url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("airline-directory/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn fetch_all(&self) -> Result<Vec<Airline>> {
        info!(url = %self.url, "Fetching airline directory");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .inspect_err(|e| {
                error!(url = %self.url, error = %e, "Airline directory request failed")
            })?;

        let body = response.text().await?;
        let airlines: Vec<Airline> = serde_json::from_str(&body).map_err(|e| {
            error!(url = %self.url, error = %e, "Airline directory payload is malformed");
            DirectoryError::Decode(e)
        })?;

        info!(count = airlines.len(), "Fetched airline directory");
        Ok(airlines)
    }
}
