use crate::domain::model::{LoadReport, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// 給日誌與報告使用的完整路徑
    fn display_path(&self, path: &str) -> String;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<String>>;
    async fn transform(&self, links: Vec<String>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<LoadReport>;
    /// 本次執行的時間，所有標頭與提交訊息共用
    fn run_time(&self) -> DateTime<FixedOffset>;
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Commits and pushes the written files, returning the commit message used.
    async fn publish(&self, run_time: DateTime<FixedOffset>) -> Result<String>;
}
