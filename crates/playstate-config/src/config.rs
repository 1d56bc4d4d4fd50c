use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Offered as the default answer when no server URL is configured
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8096";

/// Offered as the default answer when no backup file is configured
pub const DEFAULT_BACKUP_FILE: &str = "jellyplaytime.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the media server; empty means "ask at run time"
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Items requested per catalog page while building the index
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Upper bound on played items fetched per user
    #[serde(default = "default_played_items_limit")]
    pub played_items_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout; a timed out call counts as a transport failure
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_page_size() -> usize {
    500
}

fn default_played_items_limit() -> u32 {
    10_000
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { page_size: default_page_size() }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { played_items_limit: default_played_items_limit() }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs() }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.catalog.page_size == 0 {
            return Err(anyhow::anyhow!("catalog.page_size must be greater than zero"));
        }
        if self.export.played_items_limit == 0 {
            return Err(anyhow::anyhow!("export.played_items_limit must be greater than zero"));
        }
        if self.http.timeout_secs == 0 {
            return Err(anyhow::anyhow!("http.timeout_secs must be greater than zero"));
        }

        let url = self.server.url.trim();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow::anyhow!("server.url must start with http:// or https:// (got '{}')", url));
        }

        Ok(())
    }

    /// Configured server URL without trailing slashes, if any
    pub fn server_url(&self) -> Option<String> {
        let url = self.server.url.trim().trim_end_matches('/');
        if url.is_empty() {
            None
        } else {
            Some(url.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            server: ServerConfig { url: "http://media.lan:8096".to_string() },
            backup: BackupConfig { file: Some(PathBuf::from("/srv/backups/plays.json")) },
            catalog: CatalogConfig { page_size: 250 },
            export: ExportConfig::default(),
            http: HttpConfig { timeout_secs: 30 },
        };

        config.save_to_file(file.path()).unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.server.url, "http://media.lan:8096");
        assert_eq!(loaded.backup.file, Some(PathBuf::from("/srv/backups/plays.json")));
        assert_eq!(loaded.catalog.page_size, 250);
        assert_eq!(loaded.export.played_items_limit, 10_000);
        assert_eq!(loaded.http.timeout_secs, 30);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[server]\nurl = \"http://nas:8096/\"\n").unwrap();
        assert_eq!(config.catalog.page_size, 500);
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.backup.file, None);
        assert_eq!(config.server_url().as_deref(), Some("http://nas:8096"));
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.catalog.page_size = 0;
        assert!(config.validate().is_err());

        config.catalog.page_size = 500;
        config.server.url = "nas:8096".to_string();
        assert!(config.validate().is_err());

        config.server.url = "https://nas:8920".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.server_url(), None);
    }
}
