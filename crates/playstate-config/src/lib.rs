pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{BackupConfig, CatalogConfig, Config, ExportConfig, HttpConfig, ServerConfig, DEFAULT_BACKUP_FILE, DEFAULT_SERVER_URL};
pub use credentials::{mask_secret, CredentialStore};
pub use paths::{base_path_override, PathManager};
