use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const API_KEY: &str = "jellyfin_api_key";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get_api_key(&self) -> Option<&String> {
        self.credentials.get(API_KEY).filter(|key| !key.trim().is_empty())
    }

    pub fn set_api_key(&mut self, key: String) {
        self.credentials.insert(API_KEY.to_string(), key);
    }

    pub fn remove_api_key(&mut self) {
        self.credentials.remove(API_KEY);
    }
}

/// Replace every character of a secret with `*` so only its length shows
pub fn mask_secret(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_credential_store_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_api_key("0123456789abcdef".to_string());
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        assert_eq!(loaded_store.get_api_key(), Some(&"0123456789abcdef".to_string()));
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/playstate-test"));
        store.set_api_key("   ".to_string());
        assert_eq!(store.get_api_key(), None);
        assert!(store.credentials.contains_key(API_KEY));
        store.remove_api_key();
        assert!(!store.credentials.contains_key(API_KEY));
    }

    #[test]
    fn test_removed_api_key_stays_removed_after_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_api_key("0123456789abcdef".to_string());
        store.save().unwrap();
        store.remove_api_key();
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        assert_eq!(loaded_store.get_api_key(), None);
        assert!(loaded_store.credentials.is_empty());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcd"), "****");
        assert_eq!(mask_secret(""), "");
    }
}
