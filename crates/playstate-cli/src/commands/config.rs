use super::connection::load_config;
use crate::output::{summary_table, Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use playstate_config::{mask_secret, Config, CredentialStore, PathManager};
use serde_json::json;

pub fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(&paths, full, output),
        crate::ConfigCommands::Set {
            url,
            api_key,
            file,
            page_size,
            played_items_limit,
            timeout_secs,
        } => {
            let changes = ConfigChanges {
                url,
                api_key,
                file,
                page_size,
                played_items_limit,
                timeout_secs,
            };
            set_config(&paths, changes, output)
        }
    }
}

fn show_config(paths: &PathManager, full: bool, output: &Output) -> Result<()> {
    let config = load_config(paths)?;
    let mut cred_store = CredentialStore::new(paths.credentials_file());
    cred_store
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", paths.credentials_file().display(), e))?;

    let api_key = match cred_store.get_api_key() {
        Some(key) if full => key.clone(),
        Some(key) => mask_secret(key),
        None => "(not set)".to_string(),
    };
    let server_url = config.server_url().unwrap_or_else(|| "(prompt)".to_string());
    let backup_file = config
        .backup
        .file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(prompt)".to_string());

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!("\n{}", "Configuration".bright_cyan().bold());
            println!();

            let files = summary_table(
                "Files",
                &[
                    ("Config File", paths.config_file().display().to_string()),
                    ("Credentials File", paths.credentials_file().display().to_string()),
                    ("Log File", paths.log_file().display().to_string()),
                ],
            );
            println!("{}", files);
            println!();

            let server = summary_table(
                "Server",
                &[
                    ("URL", server_url),
                    ("API Key", api_key),
                    ("Timeout", format!("{} seconds", config.http.timeout_secs)),
                ],
            );
            println!("{}", server);
            println!();

            let transfer = summary_table(
                "Backup & Restore",
                &[
                    ("Backup File", backup_file),
                    ("Catalog Page Size", config.catalog.page_size.to_string()),
                    ("Played Items Limit", config.export.played_items_limit.to_string()),
                ],
            );
            println!("{}", transfer);
            println!();
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": paths.config_file().display().to_string(),
                "credentials_file": paths.credentials_file().display().to_string(),
                "log_file": paths.log_file().display().to_string(),
                "server": {
                    "url": config.server_url(),
                    "api_key": cred_store.get_api_key().map(|_| api_key),
                    "timeout_secs": config.http.timeout_secs,
                },
                "backup": { "file": config.backup.file },
                "catalog": { "page_size": config.catalog.page_size },
                "export": { "played_items_limit": config.export.played_items_limit },
            }));
        }
    }

    Ok(())
}

pub struct ConfigChanges {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub file: Option<std::path::PathBuf>,
    pub page_size: Option<usize>,
    pub played_items_limit: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl ConfigChanges {
    fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.api_key.is_none()
            && self.file.is_none()
            && self.page_size.is_none()
            && self.played_items_limit.is_none()
            && self.timeout_secs.is_none()
    }

    /// Apply everything except the API key, which lives in the credentials file
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.server.url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(file) = &self.file {
            config.backup.file = Some(file.clone());
        }
        if let Some(page_size) = self.page_size {
            config.catalog.page_size = page_size;
        }
        if let Some(limit) = self.played_items_limit {
            config.export.played_items_limit = limit;
        }
        if let Some(timeout) = self.timeout_secs {
            config.http.timeout_secs = timeout;
        }
    }
}

fn set_config(paths: &PathManager, changes: ConfigChanges, output: &Output) -> Result<()> {
    if changes.is_empty() {
        output.warn("Nothing to change. Pass at least one setting, e.g. --url or --api-key.");
        return Ok(());
    }

    let config_file = paths.config_file();
    let mut config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    changes.apply(&mut config);
    config
        .validate()
        .map_err(|e| eyre!("Configuration not saved: {}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;
    tracing::info!(path = %config_file.display(), "Saved configuration");

    if let Some(key) = changes.api_key.as_deref().map(str::trim) {
        let credentials_file = paths.credentials_file();
        let mut cred_store = CredentialStore::new(credentials_file.clone());
        cred_store
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
        if key.is_empty() {
            cred_store.remove_api_key();
        } else {
            cred_store.set_api_key(key.to_string());
        }
        cred_store
            .save()
            .map_err(|e| eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;
        tracing::info!(api_key = %mask_secret(key), "Saved API key");
    }

    output.success(format!("Configuration saved to {}", config_file.display()));
    Ok(())
}
