//! Server configuration for karmafeedd, loaded from TOML.
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/karmafeed"
//!
//! [feed]
//! max_comment_depth = 12
//! default_page_size = 20
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,

    #[serde(default)]
    pub feed: FeedSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding all persistent data for this instance.
    pub data_dir: String,
}

/// Feed policy overrides; anything left out keeps the in-code default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedSection {
    pub max_comment_depth: Option<i64>,
    pub default_page_size: Option<usize>,
}

impl ServerConfig {
    /// A bare name resolves to `/etc/karmafeed/<name>.toml`; anything
    /// containing `/` or `.` is treated as a path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/karmafeed/{name_or_path}.toml"))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("read config {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parse config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Feed policy knobs with config-file overrides applied.
    pub fn feed_config(&self) -> feed::FeedConfig {
        let mut config = feed::FeedConfig::default();
        if self.feed.max_comment_depth.is_some() {
            config.max_comment_depth = self.feed.max_comment_depth;
        }
        if let Some(size) = self.feed.default_page_size {
            config.default_page_size = size;
        }
        config
    }
}
