use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Source {url} answered with status {status}")]
    FetchStatusError { url: String, status: u16 },

    #[error("Unusable response from {endpoint}: {message}")]
    InvalidResponseError { endpoint: String, message: String },

    #[error("No subscription links found in {source_url}")]
    EmptyLinksError { source_url: String },

    #[error("All {attempts} conversion providers failed and the fallback template is disabled")]
    ConversionError { attempts: usize },

    #[error("Publish step `{step}` failed: {message}")]
    PublishError { step: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Publish,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::HttpError(_) | SyncError::FetchStatusError { .. } => ErrorCategory::Network,
            SyncError::SerializationError(_)
            | SyncError::InvalidResponseError { .. }
            | SyncError::EmptyLinksError { .. }
            | SyncError::ConversionError { .. } => ErrorCategory::Data,
            SyncError::IoError(_) => ErrorCategory::Storage,
            SyncError::PublishError { .. } => ErrorCategory::Publish,
            SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 發佈失敗不影響已寫入的檔案
            ErrorCategory::Publish => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 依嚴重程度決定的程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::HttpError(_) => "Check network connectivity and retry later",
            SyncError::FetchStatusError { .. } => {
                "Verify that source.url points to a reachable raw text file"
            }
            SyncError::SerializationError(_) | SyncError::InvalidResponseError { .. } => {
                "The provider answered with an unexpected body; check its payload and response shape"
            }
            SyncError::EmptyLinksError { .. } => {
                "Add links to the source file or set filter.on_empty = \"placeholder\""
            }
            SyncError::ConversionError { .. } => {
                "Enable [fallback] or add a working entry to [[providers]]"
            }
            SyncError::IoError(_) => "Check that output.path exists and is writable",
            SyncError::PublishError { .. } => {
                "Make sure output.path is a git work tree with push credentials"
            }
            SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::ConfigValidationError { .. } => {
                "Fix the configuration file and run again (try --dry-run)"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::HttpError(e) if e.is_timeout() => "網路請求逾時".to_string(),
            SyncError::HttpError(_) => "網路請求失敗".to_string(),
            SyncError::FetchStatusError { status, .. } => {
                format!("獲取訂閱鏈接失敗 (HTTP {})", status)
            }
            SyncError::EmptyLinksError { .. } => "未獲取到有效鏈接".to_string(),
            SyncError::ConversionError { .. } => "Clash配置生成失敗".to_string(),
            SyncError::IoError(e) => format!("檔案寫入失敗: {}", e),
            SyncError::PublishError { step, .. } => format!("提交失敗 (git {})", step),
            SyncError::SerializationError(_) | SyncError::InvalidResponseError { .. } => {
                "轉換服務回應格式異常".to_string()
            }
            SyncError::MissingConfigError { field }
            | SyncError::InvalidConfigValueError { field, .. }
            | SyncError::ConfigValidationError { field, .. } => {
                format!("配置錯誤: {}", field)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
