use crate::config::toml_config::{PayloadShape, ProviderConfig, ResponseShape};
use crate::core::fallback;
use crate::domain::model::{ConfigDocument, DocumentOrigin};
use crate::utils::error::{Result, SyncError};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Turns a link list into a Clash document.
///
/// Providers are tried in the order given (callers pass them already sorted
/// by priority). The first one that answers 2xx with a non-empty document
/// wins. When all fail, the fallback template is rendered if enabled.
pub struct Converter {
    client: Client,
    providers: Vec<ProviderConfig>,
    user_agent: String,
    fallback_enabled: bool,
}

impl Converter {
    pub fn new(
        client: Client,
        providers: Vec<ProviderConfig>,
        user_agent: String,
        fallback_enabled: bool,
    ) -> Self {
        Self {
            client,
            providers,
            user_agent,
            fallback_enabled,
        }
    }

    pub fn providers(&self) -> &[ProviderConfig] {
        &self.providers
    }

    pub async fn convert(
        &self,
        links: &[String],
        updated_at: &str,
        source_url: &str,
    ) -> Result<ConfigDocument> {
        let joined = links.join("\n");

        for provider in &self.providers {
            tracing::info!("Trying provider {} ({})", provider.name, provider.endpoint);
            match self.request(provider, links, &joined).await {
                Ok(content) => {
                    tracing::info!(
                        "✅ Provider {} returned {} bytes",
                        provider.name,
                        content.len()
                    );
                    return Ok(ConfigDocument {
                        content,
                        origin: DocumentOrigin::Provider {
                            name: provider.name.clone(),
                            endpoint: provider.endpoint.clone(),
                        },
                    });
                }
                Err(e) => {
                    tracing::warn!("Provider {} failed: {}", provider.name, e);
                }
            }
        }

        if !self.fallback_enabled {
            return Err(SyncError::ConversionError {
                attempts: self.providers.len(),
            });
        }

        tracing::warn!(
            "All {} providers failed, rendering fallback template",
            self.providers.len()
        );
        Ok(ConfigDocument {
            content: fallback::render(links, updated_at, source_url),
            origin: DocumentOrigin::Fallback,
        })
    }

    async fn request(
        &self,
        provider: &ProviderConfig,
        links: &[String],
        joined: &str,
    ) -> Result<String> {
        let builder = self
            .client
            .post(&provider.endpoint)
            .header(USER_AGENT, &self.user_agent)
            .timeout(Duration::from_secs(provider.timeout_seconds));

        let builder = match provider.payload {
            PayloadShape::LinksJson => builder.json(&links_payload(links, joined)),
            PayloadShape::TargetJson => builder.json(&target_payload(joined, &provider.target)),
            PayloadShape::Form => {
                builder.form(&[("url", joined), ("target", provider.target.as_str())])
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("Provider {} response status: {}", provider.name, status);

        if !status.is_success() {
            return Err(SyncError::FetchStatusError {
                url: provider.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let content = match provider.response {
            ResponseShape::Raw => body,
            ResponseShape::JsonContent => extract_content(&body, &provider.endpoint)?,
        };

        if content.trim().is_empty() {
            return Err(SyncError::InvalidResponseError {
                endpoint: provider.endpoint.clone(),
                message: "empty document".to_string(),
            });
        }

        Ok(content)
    }
}

pub fn links_payload(links: &[String], joined: &str) -> Value {
    json!({
        "urls": links,
        "source": joined,
    })
}

pub fn target_payload(joined: &str, target: &str) -> Value {
    json!({
        "url": joined,
        "target": target,
        "rename": "",
        "include": "",
        "exclude": "",
        "config": "",
        "emoji": "true",
    })
}

/// 從 `content` 或 `data.content` 取出配置內容
pub fn extract_content(body: &str, endpoint: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body)?;

    value
        .get("content")
        .or_else(|| value.get("data").and_then(|data| data.get("content")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| SyncError::InvalidResponseError {
            endpoint: endpoint.to_string(),
            message: "no content or data.content field".to_string(),
        })
}
