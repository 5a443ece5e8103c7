use crate::config::toml_config::SourceConfig;
use crate::utils::error::{Result, SyncError};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;

/// Downloads the raw subscription list with a single GET.
pub struct SourceFetcher {
    client: Client,
    config: SourceConfig,
}

impl SourceFetcher {
    pub fn new(client: Client, config: SourceConfig) -> Self {
        Self { client, config }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub async fn fetch(&self) -> Result<String> {
        tracing::debug!("Fetching subscription list from: {}", self.config.url);

        let response = self
            .client
            .get(&self.config.url)
            .header(USER_AGENT, &self.config.user_agent)
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Source response status: {}", status);

        if !status.is_success() {
            return Err(SyncError::FetchStatusError {
                url: self.config.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        tracing::debug!("Fetched {} bytes", body.len());
        Ok(body)
    }
}
