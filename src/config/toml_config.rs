use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/cler1818/Note/refs/heads/main/ceshi";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const WORKER_BASE: &str = "https://sublink-worker.schnappi6868.workers.dev/";
const SUBLINK_BASE: &str = "https://sublink.works/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub source: SourceConfig,
    pub filter: FilterConfig,
    pub providers: Vec<ProviderConfig>,
    pub fallback: FallbackConfig,
    pub output: OutputConfig,
    pub publish: PublishConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyLinksPolicy {
    Fail,
    Placeholder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub comment_markers: Vec<String>,
    pub annotation_words: Vec<String>,
    pub on_empty: EmptyLinksPolicy,
    pub placeholder_link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    /// `{"urls": [...], "source": "..."}`
    LinksJson,
    /// `{"url": "...", "target": "clash", ...}`
    TargetJson,
    /// `url=...&target=clash`
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    Raw,
    JsonContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub endpoint: String,
    pub payload: PayloadShape,
    #[serde(default = "default_response_shape")]
    pub response: ResponseShape,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub links_file: String,
    pub config_file: String,
    /// 對轉換服務回傳的配置加上更新資訊標頭
    pub annotate_remote: bool,
    pub utc_offset_hours: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub enabled: bool,
    pub git_binary: String,
    pub remote: String,
    pub refspec: String,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    /// `{time}` 會被替換成 HH:MM:SS
    pub message: String,
}

fn default_true() -> bool {
    true
}

fn default_target() -> String {
    "clash".to_string()
}

fn default_provider_timeout() -> u64 {
    60
}

fn default_response_shape() -> ResponseShape {
    ResponseShape::Raw
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            filter: FilterConfig::default(),
            providers: default_providers(),
            fallback: FallbackConfig::default(),
            output: OutputConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_seconds: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            comment_markers: vec!["#".to_string()],
            annotation_words: Vec::new(),
            on_empty: EmptyLinksPolicy::Fail,
            placeholder_link: "ss://placeholder@example.com:443".to_string(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: ".".to_string(),
            links_file: "订阅链接.txt".to_string(),
            config_file: "lzhp529.yaml".to_string(),
            annotate_remote: true,
            utc_offset_hours: 8,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            git_binary: "git".to_string(),
            remote: "origin".to_string(),
            refspec: "HEAD".to_string(),
            author_name: None,
            author_email: None,
            message: "🔄 自动更新Clash配置 [{time}]".to_string(),
        }
    }
}

/// 內建的轉換服務清單，依序嘗試
pub fn default_providers() -> Vec<ProviderConfig> {
    let provider = |name: &str, endpoint: String, payload, response, priority| ProviderConfig {
        name: name.to_string(),
        endpoint,
        payload,
        response,
        priority,
        enabled: true,
        target: default_target(),
        timeout_seconds: default_provider_timeout(),
    };

    vec![
        provider(
            "sublink-worker-api",
            format!("{}api/convert", WORKER_BASE),
            PayloadShape::LinksJson,
            ResponseShape::Raw,
            10,
        ),
        provider(
            "sublink-worker-convert",
            format!("{}convert", WORKER_BASE),
            PayloadShape::LinksJson,
            ResponseShape::Raw,
            20,
        ),
        provider(
            "sublink-works-convert",
            format!("{}api/convert", SUBLINK_BASE),
            PayloadShape::LinksJson,
            ResponseShape::Raw,
            30,
        ),
        provider(
            "sublink-works-api",
            format!("{}api/", SUBLINK_BASE),
            PayloadShape::TargetJson,
            ResponseShape::JsonContent,
            40,
        ),
        provider(
            "sublink-worker-form",
            WORKER_BASE.to_string(),
            PayloadShape::Form,
            ResponseShape::Raw,
            50,
        ),
    ]
}

impl SyncConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GIT_REMOTE})，未定義的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 依 priority 排序後的啟用中轉換服務
    pub fn active_providers(&self) -> Vec<ProviderConfig> {
        let mut providers: Vec<ProviderConfig> =
            self.providers.iter().filter(|p| p.enabled).cloned().collect();
        // sort_by_key 為穩定排序，同優先級保持宣告順序
        providers.sort_by_key(|p| p.priority);
        providers
    }

    /// `--dry-run` 顯示的執行計畫，不發送請求也不寫檔
    pub fn plan_summary(&self) -> String {
        let mut lines = vec![
            "🔍 Dry Run Analysis:".to_string(),
            String::new(),
            "📡 Source:".to_string(),
            format!("  URL: {}", self.source.url),
            format!("  Timeout: {}s", self.source.timeout_seconds),
            format!(
                "  Comment markers: {:?}, annotation words: {:?}",
                self.filter.comment_markers, self.filter.annotation_words
            ),
            format!("  On empty: {:?}", self.filter.on_empty),
            String::new(),
            "⚙️ Providers (in order):".to_string(),
        ];

        let providers = self.active_providers();
        if providers.is_empty() {
            lines.push("  (none)".to_string());
        }
        for (index, provider) in providers.iter().enumerate() {
            lines.push(format!(
                "  {}. {} -> {} [payload: {:?}, response: {:?}, timeout: {}s]",
                index + 1,
                provider.name,
                provider.endpoint,
                provider.payload,
                provider.response,
                provider.timeout_seconds
            ));
        }
        lines.push(format!(
            "  Fallback template: {}",
            if self.fallback.enabled { "enabled" } else { "disabled" }
        ));

        lines.push(String::new());
        lines.push("💾 Output:".to_string());
        lines.push(format!("  Path: {}", self.output.path));
        lines.push(format!("  Links: {}", self.output.links_file));
        lines.push(format!("  Config: {}", self.output.config_file));
        lines.push(format!("  UTC offset: {:+}h", self.output.utc_offset_hours));

        lines.push(String::new());
        if self.publish.enabled {
            lines.push(format!(
                "🚀 Publish: {} push {} {}",
                self.publish.git_binary, self.publish.remote, self.publish.refspec
            ));
        } else {
            lines.push("🚀 Publish: disabled".to_string());
        }

        lines.push(String::new());
        lines.push("✅ Dry run complete. No request was sent and no file was written.".to_string());
        lines.join("\n")
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.url", &self.source.url)?;
        validation::validate_positive_number(
            "source.timeout_seconds",
            self.source.timeout_seconds,
            1,
        )?;

        if self.filter.on_empty == EmptyLinksPolicy::Placeholder {
            validation::validate_non_empty_string(
                "filter.placeholder_link",
                &self.filter.placeholder_link,
            )?;
        }
        if self.filter.comment_markers.iter().any(|m| m.is_empty()) {
            return Err(SyncError::InvalidConfigValueError {
                field: "filter.comment_markers".to_string(),
                value: String::new(),
                reason: "An empty marker would treat every line as a comment".to_string(),
            });
        }

        for provider in &self.providers {
            let field = format!("providers.{}", provider.name);
            validation::validate_non_empty_string("providers.name", &provider.name)?;
            validation::validate_url(&format!("{}.endpoint", field), &provider.endpoint)?;
            validation::validate_positive_number(
                &format!("{}.timeout_seconds", field),
                provider.timeout_seconds,
                1,
            )?;
        }
        validation::validate_unique_names(
            "providers",
            self.providers.iter().map(|p| p.name.as_str()),
        )?;

        if self.active_providers().is_empty() && !self.fallback.enabled {
            return Err(SyncError::ConfigValidationError {
                field: "providers".to_string(),
                message: "No enabled provider and the fallback template is disabled".to_string(),
            });
        }

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_path("output.links_file", &self.output.links_file)?;
        validation::validate_path("output.config_file", &self.output.config_file)?;
        if self.output.links_file == self.output.config_file {
            return Err(SyncError::ConfigValidationError {
                field: "output.config_file".to_string(),
                message: "Link file and configuration file must differ".to_string(),
            });
        }
        validation::validate_range("output.utc_offset_hours", self.output.utc_offset_hours, -12, 14)?;

        if self.publish.enabled {
            validation::validate_non_empty_string("publish.git_binary", &self.publish.git_binary)?;
            validation::validate_non_empty_string("publish.remote", &self.publish.remote)?;
            validation::validate_non_empty_string("publish.refspec", &self.publish.refspec)?;
            validation::validate_non_empty_string("publish.message", &self.publish.message)?;

            match (&self.publish.author_name, &self.publish.author_email) {
                (Some(_), None) => {
                    return Err(SyncError::MissingConfigError {
                        field: "publish.author_email".to_string(),
                    })
                }
                (None, Some(_)) => {
                    return Err(SyncError::MissingConfigError {
                        field: "publish.author_name".to_string(),
                    })
                }
                _ => {}
            }
        }

        Ok(())
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(config.providers.len(), 5);
        assert_eq!(config.filter.on_empty, EmptyLinksPolicy::Fail);
        assert_eq!(config.output.utc_offset_hours, 8);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = SyncConfig::from_toml_str("").unwrap();
        assert_eq!(config.output.links_file, "订阅链接.txt");
        assert_eq!(config.output.config_file, "lzhp529.yaml");
        assert!(config.fallback.enabled);
        assert!(!config.publish.enabled);
    }

    #[test]
    fn test_parse_provider_list() {
        let toml_content = r#"
[source]
url = "https://example.com/list"

[filter]
annotation_words = ["备注"]
on_empty = "placeholder"

[[providers]]
name = "secondary"
endpoint = "https://b.example.com/convert"
payload = "form"
priority = 20

[[providers]]
name = "primary"
endpoint = "https://a.example.com/api/"
payload = "target_json"
response = "json_content"
priority = 10

[[providers]]
name = "disabled"
endpoint = "https://c.example.com/"
payload = "links_json"
enabled = false
"#;

        let config = SyncConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.filter.annotation_words, vec!["备注".to_string()]);
        assert_eq!(config.filter.on_empty, EmptyLinksPolicy::Placeholder);

        let active = config.active_providers();
        let names: Vec<&str> = active.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["primary", "secondary"]);
        assert_eq!(active[0].response, ResponseShape::JsonContent);
        assert_eq!(active[1].response, ResponseShape::Raw);
        assert_eq!(active[1].target, "clash");
        assert_eq!(active[1].timeout_seconds, 60);
    }

    #[test]
    fn test_plan_summary_lists_providers_in_order() {
        let toml_content = r#"
[source]
url = "https://example.com/list"

[[providers]]
name = "late"
endpoint = "https://b.example.com/convert"
payload = "form"
priority = 20

[[providers]]
name = "early"
endpoint = "https://a.example.com/api/"
payload = "target_json"
priority = 10

[fallback]
enabled = false
"#;
        let config = SyncConfig::from_toml_str(toml_content).unwrap();
        let plan = config.plan_summary();

        assert!(plan.contains("  URL: https://example.com/list"));
        let early = plan.find("  1. early -> https://a.example.com/api/").unwrap();
        let late = plan.find("  2. late -> https://b.example.com/convert").unwrap();
        assert!(early < late);
        assert!(plan.contains("  Fallback template: disabled"));
        assert!(plan.contains("🚀 Publish: disabled"));
        assert!(plan.contains("  UTC offset: +8h"));
    }

    #[test]
    fn test_plan_summary_with_publish_and_no_providers() {
        let mut config = SyncConfig::default();
        config.providers.clear();
        config.publish.enabled = true;
        config.publish.remote = "upstream".to_string();
        config.publish.refspec = "main".to_string();

        let plan = config.plan_summary();
        assert!(plan.contains("⚙️ Providers (in order):\n  (none)\n  Fallback template: enabled"));
        assert!(plan.contains("🚀 Publish: git push upstream main"));
    }

    #[test]
    fn test_equal_priority_keeps_declaration_order() {
        let toml_content = r#"
[[providers]]
name = "first"
endpoint = "https://a.example.com/"
payload = "form"

[[providers]]
name = "second"
endpoint = "https://b.example.com/"
payload = "form"
"#;
        let config = SyncConfig::from_toml_str(toml_content).unwrap();
        let names: Vec<String> = config.active_providers().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CLASH_SYNC_TEST_SOURCE", "https://test.example.com/list");

        let toml_content = r#"
[source]
url = "${CLASH_SYNC_TEST_SOURCE}"

[publish]
remote = "${CLASH_SYNC_TEST_UNSET_REMOTE}"
"#;

        let config = SyncConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.source.url, "https://test.example.com/list");
        assert_eq!(config.publish.remote, "${CLASH_SYNC_TEST_UNSET_REMOTE}");

        std::env::remove_var("CLASH_SYNC_TEST_SOURCE");
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = SyncConfig::from_toml_str("[source]\nurl = \"invalid-url\"\n").unwrap();
        assert!(invalid_url.validate().is_err());

        let duplicate = SyncConfig::from_toml_str(
            r#"
[[providers]]
name = "same"
endpoint = "https://a.example.com/"
payload = "form"

[[providers]]
name = "same"
endpoint = "https://b.example.com/"
payload = "form"
"#,
        )
        .unwrap();
        assert!(duplicate.validate().is_err());

        let nothing_to_try = SyncConfig::from_toml_str(
            "providers = []\n\n[fallback]\nenabled = false\n",
        )
        .unwrap();
        assert!(nothing_to_try.validate().is_err());

        let same_files = SyncConfig::from_toml_str(
            "[output]\nlinks_file = \"out.yaml\"\nconfig_file = \"out.yaml\"\n",
        )
        .unwrap();
        assert!(same_files.validate().is_err());

        let half_identity = SyncConfig::from_toml_str(
            "[publish]\nenabled = true\nauthor_name = \"bot\"\n",
        )
        .unwrap();
        assert!(matches!(
            half_identity.validate(),
            Err(SyncError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_unknown_payload_shape_is_rejected() {
        let result = SyncConfig::from_toml_str(
            r#"
[[providers]]
name = "bad"
endpoint = "https://a.example.com/"
payload = "xml"
"#,
        );
        assert!(matches!(
            result,
            Err(SyncError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\npath = \"./public\"\nutc_offset_hours = 0\n")
            .unwrap();

        let config = SyncConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.path, "./public");
        assert_eq!(config.output.utc_offset_hours, 0);
    }
}
