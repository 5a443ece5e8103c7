pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::SyncConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "clash-sub-sync")]
#[command(about = "Fetch a subscription list, convert it to a Clash config and write both files")]
pub struct CliConfig {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override source.url
    #[arg(long)]
    pub source_url: Option<String>,

    /// Override output.path
    #[arg(long)]
    pub output_path: Option<String>,

    /// Commit and push the written files
    #[arg(long)]
    pub publish: bool,

    /// Fail instead of rendering the fallback template
    #[arg(long)]
    pub no_fallback: bool,

    /// Show what would be done without touching the network or disk
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入配置檔並套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::from_file(path)?,
            None => SyncConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut SyncConfig) {
        if let Some(url) = &self.source_url {
            config.source.url = url.clone();
        }
        if let Some(path) = &self.output_path {
            config.output.path = path.clone();
        }
        if self.publish {
            config.publish.enabled = true;
        }
        if self.no_fallback {
            config.fallback.enabled = false;
        }
    }
}
