use super::prompts;
use crate::output::Output;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use playstate_config::{mask_secret, Config, CredentialStore, PathManager, DEFAULT_BACKUP_FILE, DEFAULT_SERVER_URL};
use playstate_sources::JellyfinServer;
use std::path::PathBuf;
use std::time::Duration;

/// Connection settings given on the command line, if any
pub struct ConnectionArgs {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

/// Load `config.toml` (or defaults) and reject invalid values up front
pub fn load_config(paths: &PathManager) -> Result<Config> {
    let config_file = paths.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
    Ok(config)
}

/// Flag, then config file, then prompt
pub fn resolve_server_url(config: &Config, flag: Option<String>) -> Result<String> {
    if let Some(url) = non_blank(flag) {
        return Ok(url);
    }
    if let Some(url) = config.server_url() {
        return Ok(url);
    }
    let answer = prompts::prompt_string("Jellyfin server URL", Some(DEFAULT_SERVER_URL))?;
    Ok(if answer.is_empty() { DEFAULT_SERVER_URL.to_string() } else { answer })
}

/// Flag, then credentials file, then prompt
pub fn resolve_api_key(paths: &PathManager, flag: Option<String>) -> Result<String> {
    if let Some(key) = non_blank(flag) {
        return Ok(key);
    }

    let credentials_file = paths.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    if let Some(key) = cred_store.get_api_key() {
        return Ok(key.trim().to_string());
    }

    let key = prompts::prompt_password("Jellyfin API key")?;
    non_blank(Some(key)).ok_or_else(|| eyre!("An API key is required"))
}

/// Flag, then config file, then prompt
pub fn resolve_backup_file(config: &Config, flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    if let Some(path) = config.backup.file.clone().filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    let answer = prompts::prompt_string("Backup file", Some(DEFAULT_BACKUP_FILE))?;
    Ok(PathBuf::from(if answer.is_empty() { DEFAULT_BACKUP_FILE.to_string() } else { answer }))
}

/// Build a client for the server named by flags, config or prompt
pub fn connect(config: &Config, paths: &PathManager, args: ConnectionArgs, output: &Output) -> Result<JellyfinServer> {
    let url = resolve_server_url(config, args.url)?;
    let api_key = resolve_api_key(paths, args.api_key)?;

    tracing::info!(url = %url, api_key = %mask_secret(&api_key), "Connecting to server");
    let server = JellyfinServer::new(&url, &api_key, Duration::from_secs(config.http.timeout_secs))
        .wrap_err_with(|| format!("Could not set up a client for {}", url))?;

    output.info(format!("Using server {}", url));
    Ok(server)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
