use crate::config::toml_config::{EmptyLinksPolicy, SyncConfig};
use crate::core::converter::Converter;
use crate::core::fetcher::SourceFetcher;
use crate::core::filter::LineFilter;
use crate::core::writer::OutputWriter;
use crate::domain::model::{LoadReport, TransformResult};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::{Result, SyncError};
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::Client;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 以指定 UTC 偏移取得目前時間 (預設東八區)
pub fn now_with_offset(hours: i32) -> Result<DateTime<FixedOffset>> {
    let offset = hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| SyncError::InvalidConfigValueError {
            field: "output.utc_offset_hours".to_string(),
            value: hours.to_string(),
            reason: "Offset out of range".to_string(),
        })?;
    Ok(Utc::now().with_timezone(&offset))
}

pub struct SyncPipeline<S: Storage> {
    fetcher: SourceFetcher,
    filter: LineFilter,
    converter: Converter,
    writer: OutputWriter<S>,
    on_empty: EmptyLinksPolicy,
    placeholder_link: String,
    run_time: DateTime<FixedOffset>,
}

impl<S: Storage> SyncPipeline<S> {
    pub fn new(storage: S, config: &SyncConfig) -> Result<Self> {
        let client = Client::new();
        let run_time = now_with_offset(config.output.utc_offset_hours)?;

        Ok(Self {
            fetcher: SourceFetcher::new(client.clone(), config.source.clone()),
            filter: LineFilter::from_config(&config.filter),
            converter: Converter::new(
                client,
                config.active_providers(),
                config.source.user_agent.clone(),
                config.fallback.enabled,
            ),
            writer: OutputWriter::new(
                storage,
                config.output.links_file.clone(),
                config.output.config_file.clone(),
                config.output.annotate_remote,
            ),
            on_empty: config.filter.on_empty,
            placeholder_link: config.filter.placeholder_link.clone(),
            run_time,
        })
    }

    /// 固定執行時間，讓輸出可重現
    pub fn with_run_time(mut self, run_time: DateTime<FixedOffset>) -> Self {
        self.run_time = run_time;
        self
    }

    pub fn timestamp(&self) -> String {
        self.run_time.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for SyncPipeline<S> {
    async fn extract(&self) -> Result<Vec<String>> {
        let text = self.fetcher.fetch().await?;
        let links = self.filter.filter(&text);
        tracing::debug!(
            "Filtered {} lines down to {} links",
            text.lines().count(),
            links.len()
        );

        if !links.is_empty() {
            return Ok(links);
        }

        match self.on_empty {
            EmptyLinksPolicy::Fail => Err(SyncError::EmptyLinksError {
                source_url: self.fetcher.url().to_string(),
            }),
            EmptyLinksPolicy::Placeholder => {
                tracing::warn!(
                    "No links in source, substituting placeholder {}",
                    self.placeholder_link
                );
                Ok(vec![self.placeholder_link.clone()])
            }
        }
    }

    async fn transform(&self, links: Vec<String>) -> Result<TransformResult> {
        let document = self
            .converter
            .convert(&links, &self.timestamp(), self.fetcher.url())
            .await?;
        Ok(TransformResult { links, document })
    }

    async fn load(&self, result: TransformResult) -> Result<LoadReport> {
        self.writer
            .write(
                &result.links,
                &result.document,
                &self.timestamp(),
                self.fetcher.url(),
            )
            .await
    }

    fn run_time(&self) -> DateTime<FixedOffset> {
        self.run_time
    }
}
