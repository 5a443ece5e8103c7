use serde::{Deserialize, Serialize};
use std::fmt;

/// 配置文件的來源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentOrigin {
    Provider { name: String, endpoint: String },
    Fallback,
}

impl fmt::Display for DocumentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentOrigin::Provider { name, endpoint } => write!(f, "{} ({})", name, endpoint),
            DocumentOrigin::Fallback => write!(f, "fallback template"),
        }
    }
}

/// Clash 配置文件，內容視為不透明文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    pub content: String,
    pub origin: DocumentOrigin,
}

impl ConfigDocument {
    pub fn is_fallback(&self) -> bool {
        self.origin == DocumentOrigin::Fallback
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub links: Vec<String>,
    pub document: ConfigDocument,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub links_path: String,
    pub config_path: String,
    pub link_count: usize,
    pub origin: DocumentOrigin,
    /// 任一檔案內容與寫入前不同
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Skipped,
    Published { message: String },
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub load: LoadReport,
    pub publish: PublishOutcome,
}
