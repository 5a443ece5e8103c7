use crate::config::toml_config::FilterConfig;

/// Drops blank and comment lines from a subscription list.
///
/// A trimmed line is a comment when it starts with one of the comment
/// markers or contains one of the annotation words. Surviving lines are
/// returned trimmed and in input order; duplicates are kept.
#[derive(Debug, Clone)]
pub struct LineFilter {
    comment_markers: Vec<String>,
    annotation_words: Vec<String>,
}

impl LineFilter {
    pub fn new(comment_markers: Vec<String>, annotation_words: Vec<String>) -> Self {
        Self {
            comment_markers,
            annotation_words,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(
            config.comment_markers.clone(),
            config.annotation_words.clone(),
        )
    }

    pub fn is_comment(&self, line: &str) -> bool {
        self.comment_markers
            .iter()
            .any(|marker| line.starts_with(marker.as_str()))
            || self
                .annotation_words
                .iter()
                .any(|word| line.contains(word.as_str()))
    }

    pub fn filter(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !self.is_comment(line))
            .map(str::to_string)
            .collect()
    }
}

impl Default for LineFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}
