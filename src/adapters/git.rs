use crate::config::toml_config::PublishConfig;
use crate::domain::ports::Publisher;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use std::path::PathBuf;
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitStep {
    pub name: &'static str,
    pub args: Vec<String>,
}

impl GitStep {
    fn new(name: &'static str, args: &[&str]) -> Self {
        Self {
            name,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Stages, commits and pushes the output files with the `git` binary.
pub struct GitPublisher {
    config: PublishConfig,
    workdir: PathBuf,
    files: Vec<String>,
}

impl GitPublisher {
    /// `files` are relative to `workdir`.
    pub fn new(config: PublishConfig, workdir: impl Into<PathBuf>, files: Vec<String>) -> Self {
        Self {
            config,
            workdir: workdir.into(),
            files,
        }
    }

    pub fn commit_message(&self, run_time: DateTime<FixedOffset>) -> String {
        self.config
            .message
            .replace("{time}", &run_time.format("%H:%M:%S").to_string())
    }

    pub fn plan(&self, message: &str) -> Vec<GitStep> {
        let mut steps = Vec::new();

        // 僅設定在此倉庫，不動全域設定
        if let Some(name) = &self.config.author_name {
            steps.push(GitStep::new("config", &["config", "user.name", name.as_str()]));
        }
        if let Some(email) = &self.config.author_email {
            steps.push(GitStep::new("config", &["config", "user.email", email.as_str()]));
        }

        let mut add = GitStep::new("add", &["add", "--"]);
        add.args.extend(self.files.iter().cloned());
        steps.push(add);

        steps.push(GitStep::new("commit", &["commit", "-m", message]));
        steps.push(GitStep::new(
            "push",
            &["push", self.config.remote.as_str(), self.config.refspec.as_str()],
        ));
        steps
    }

    async fn run_step(&self, step: &GitStep) -> Result<()> {
        tracing::debug!("Running {} {}", self.config.git_binary, step.args.join(" "));

        let output = Command::new(&self.config.git_binary)
            .args(&step.args)
            .current_dir(&self.workdir)
            .output()
            .await
            .map_err(|e| SyncError::PublishError {
                step: step.name.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(SyncError::PublishError {
                step: step.name.to_string(),
                message: format!("{} ({})", detail.trim(), output.status),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Publisher for GitPublisher {
    async fn publish(&self, run_time: DateTime<FixedOffset>) -> Result<String> {
        let message = self.commit_message(run_time);

        for step in self.plan(&message) {
            self.run_step(&step).await?;
        }

        Ok(message)
    }
}
