use crate::domain::model::{ConfigDocument, LoadReport};
use crate::domain::ports::Storage;
use crate::utils::error::Result;

const PREVIEW_CHARS: usize = 100;

pub fn render_links_file(links: &[String], updated_at: &str, source_url: &str) -> String {
    let mut content = format!("# 更新时间: {}\n# 源自网站源: {}\n\n", updated_at, source_url);
    for link in links {
        content.push_str(link);
        content.push('\n');
    }
    content
}

/// 轉換服務回傳的配置前加上的標頭，含來源內容預覽
pub fn render_remote_banner(links: &[String], updated_at: &str, source_url: &str) -> String {
    let source_text = links.join("\n");
    let total_chars = source_text.chars().count();
    // 預覽只取單行，避免換行破壞註解
    let preview: String = source_text
        .chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();

    let ellipsis = if total_chars > PREVIEW_CHARS { "..." } else { "" };

    format!(
        "# =========================================\n\
         # 自动更新时间: {}\n\
         # 源地址: {}\n\
         # 源内容: {}{}（共{}字符）\n\
         # =========================================\n\n",
        updated_at, source_url, preview, ellipsis, total_chars
    )
}

/// Writes the link file and the configuration file, overwriting both.
pub struct OutputWriter<S: Storage> {
    storage: S,
    links_file: String,
    config_file: String,
    annotate_remote: bool,
}

impl<S: Storage> OutputWriter<S> {
    pub fn new(storage: S, links_file: String, config_file: String, annotate_remote: bool) -> Self {
        Self {
            storage,
            links_file,
            config_file,
            annotate_remote,
        }
    }

    pub fn render_config(
        &self,
        links: &[String],
        document: &ConfigDocument,
        updated_at: &str,
        source_url: &str,
    ) -> String {
        if self.annotate_remote && !document.is_fallback() {
            let mut content = render_remote_banner(links, updated_at, source_url);
            content.push_str(&document.content);
            content
        } else {
            document.content.clone()
        }
    }

    pub async fn write(
        &self,
        links: &[String],
        document: &ConfigDocument,
        updated_at: &str,
        source_url: &str,
    ) -> Result<LoadReport> {
        let links_content = render_links_file(links, updated_at, source_url);
        let config_content = self.render_config(links, document, updated_at, source_url);

        let mut changed = false;
        for (path, content) in [
            (&self.links_file, &links_content),
            (&self.config_file, &config_content),
        ] {
            let previous = self.storage.read_file(path).await.ok();
            let differs = previous.as_deref() != Some(content.as_bytes());
            changed |= differs;

            tracing::debug!("Writing {} ({} bytes, changed: {})", path, content.len(), differs);
            self.storage.write_file(path, content.as_bytes()).await?;
            tracing::info!("已更新 {}", self.storage.display_path(path));
        }

        Ok(LoadReport {
            links_path: self.storage.display_path(&self.links_file),
            config_path: self.storage.display_path(&self.config_file),
            link_count: links.len(),
            origin: document.origin.clone(),
            changed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use crate::domain::model::DocumentOrigin;
    use tempfile::TempDir;

    fn links() -> Vec<String> {
        vec!["http://a".to_string(), "http://b".to_string()]
    }

    fn remote_document() -> ConfigDocument {
        ConfigDocument {
            content: "proxies: []\n".to_string(),
            origin: DocumentOrigin::Provider {
                name: "p".to_string(),
                endpoint: "https://p.example.com".to_string(),
            },
        }
    }

    #[test]
    fn test_links_file_layout() {
        let content = render_links_file(&links(), "2026-10-18 09:00:00", "https://src");
        assert_eq!(
            content,
            "# 更新时间: 2026-10-18 09:00:00\n# 源自网站源: https://src\n\nhttp://a\nhttp://b\n"
        );
    }

    #[test]
    fn test_banner_preview_is_truncated_by_chars() {
        let long = vec!["节".repeat(150)];
        let banner = render_remote_banner(&long, "t", "s");
        assert!(banner.contains(&format!("# 源内容: {}...（共150字符）", "节".repeat(100))));
        assert_eq!(banner.lines().filter(|l| l.starts_with('#')).count(), 5);
        assert!(banner.ends_with("=\n\n"));
    }

    #[test]
    fn test_short_preview_has_no_ellipsis() {
        let banner = render_remote_banner(&links(), "t", "s");
        assert!(banner.contains("# 源内容: http://a http://b（共17字符）\n"));

        let exact = vec!["a".repeat(100)];
        let banner = render_remote_banner(&exact, "t", "s");
        assert!(banner.contains(&format!("# 源内容: {}（共100字符）", "a".repeat(100))));
        assert!(!banner.contains("..."));
    }

    #[tokio::test]
    async fn test_write_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        let writer = OutputWriter::new(
            storage,
            "links.txt".to_string(),
            "clash.yaml".to_string(),
            true,
        );

        let first = writer
            .write(&links(), &remote_document(), "2026-10-18 09:00:00", "https://src")
            .await
            .unwrap();
        let links_before = std::fs::read(temp_dir.path().join("links.txt")).unwrap();
        let config_before = std::fs::read(temp_dir.path().join("clash.yaml")).unwrap();

        let second = writer
            .write(&links(), &remote_document(), "2026-10-18 09:00:00", "https://src")
            .await
            .unwrap();

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(second.link_count, 2);
        assert_eq!(std::fs::read(temp_dir.path().join("links.txt")).unwrap(), links_before);
        assert_eq!(std::fs::read(temp_dir.path().join("clash.yaml")).unwrap(), config_before);

        let config = String::from_utf8(config_before).unwrap();
        assert!(config.starts_with("# =========================================\n"));
        assert!(config.ends_with("proxies: []\n"));
    }

    #[tokio::test]
    async fn test_write_overwrites_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("clash.yaml"), "stale content that is longer").unwrap();

        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        let writer = OutputWriter::new(
            storage,
            "links.txt".to_string(),
            "clash.yaml".to_string(),
            false,
        );

        writer
            .write(&links(), &remote_document(), "2026-10-18 09:00:00", "https://src")
            .await
            .unwrap();

        let config = std::fs::read_to_string(temp_dir.path().join("clash.yaml")).unwrap();
        assert_eq!(config, "proxies: []\n");
    }

    #[tokio::test]
    async fn test_fallback_document_is_not_annotated() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        let writer = OutputWriter::new(storage, "l.txt".to_string(), "c.yaml".to_string(), true);

        let document = ConfigDocument {
            content: "# 更新时间: t\nport: 7890\n".to_string(),
            origin: DocumentOrigin::Fallback,
        };
        let rendered = writer.render_config(&links(), &document, "t", "s");
        assert_eq!(rendered, document.content);
    }
}
