use crate::domain::model::{PublishOutcome, RunReport};
use crate::domain::ports::{Pipeline, Publisher};
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    publisher: Option<Box<dyn Publisher>>,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            publisher: None,
        }
    }

    pub fn with_publisher(mut self, publisher: Box<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("开始更新Clash订阅...");

        // Extract
        let links = self.pipeline.extract().await?;
        tracing::info!("成功获取 {} 个订阅链接", links.len());

        // Transform
        let result = self.pipeline.transform(links).await?;
        tracing::info!(
            "Clash配置来源: {} ({} 字符)",
            result.document.origin,
            result.document.content.chars().count()
        );

        // Load
        let load = self.pipeline.load(result).await?;

        let publish = match &self.publisher {
            None => PublishOutcome::Skipped,
            Some(_) if !load.changed => {
                tracing::info!("Output unchanged, nothing to publish");
                PublishOutcome::Skipped
            }
            Some(publisher) => match publisher.publish(self.pipeline.run_time()).await {
                Ok(message) => {
                    tracing::info!("✅ 更新完成并提交: {}", message);
                    PublishOutcome::Published { message }
                }
                Err(e) => {
                    // 提交失敗只記錄，不重試也不影響結果
                    tracing::warn!("⚠️ 更新成功但提交失败: {}", e);
                    PublishOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            },
        };

        Ok(RunReport { load, publish })
    }
}
