//! Application configuration management.
//!
//! Configuration decides, once at startup, whether a remote document store
//! is used and where the local cache lives. It is stored at
//! `~/.config/sitekeep/config.json` and can be overridden from the
//! environment:
//!
//! - `SITEKEEP_REMOTE_URL`, `SITEKEEP_REMOTE_API_KEY`
//! - `SITEKEEP_CACHE_DIR`
//! - `SITEKEEP_TIMEOUT_SECS`
//! - `SITEKEEP_OFFLINE=1` (local cache only)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::FileCache;
use crate::remote::HttpDocumentStore;
use crate::storage::{StorageAdapter, DEFAULT_COLLECTION_PATH, DEFAULT_REQUEST_TIMEOUT};
use crate::store::ContentStore;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "sitekeep";

/// Config file name
const CONFIG_FILE: &str = "config.json";

fn default_collection_path() -> String {
    DEFAULT_COLLECTION_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_collection_path")]
    pub collection_path: String,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            collection_path: default_collection_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: Option<RemoteConfig>,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    pub cache_dir: Option<PathBuf>,
    pub offline_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: None,
            request_timeout_secs: default_timeout_secs(),
            cache_dir: None,
            offline_mode: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Point the config at a remote store, keeping its collection path if
    /// one was already set.
    pub fn set_remote(&mut self, base_url: &str, api_key: Option<String>) {
        let base_url = base_url.trim().to_string();
        match self.remote {
            Some(ref mut remote) => {
                remote.base_url = base_url;
                remote.api_key = api_key;
            }
            None => {
                self.remote = Some(RemoteConfig {
                    api_key,
                    ..RemoteConfig::new(base_url)
                })
            }
        }
        self.offline_mode = false;
    }

    /// Forget the remote store; the local cache becomes the only store.
    pub fn clear_remote(&mut self) {
        self.remote = None;
    }

    /// Apply `SITEKEEP_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = set("SITEKEEP_REMOTE_URL") {
            match self.remote {
                Some(ref mut remote) => remote.base_url = url,
                None => self.remote = Some(RemoteConfig::new(url)),
            }
        }
        if let Some(key) = set("SITEKEEP_REMOTE_API_KEY") {
            if let Some(ref mut remote) = self.remote {
                remote.api_key = Some(key);
            }
        }
        if let Some(dir) = set("SITEKEEP_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = set("SITEKEEP_TIMEOUT_SECS") {
            match secs.trim().parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => warn!(value = %secs, "Ignoring invalid SITEKEEP_TIMEOUT_SECS"),
            }
        }
        if let Some(flag) = set("SITEKEEP_OFFLINE") {
            self.offline_mode = matches!(flag.trim(), "1" | "true" | "yes");
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Remote settings, unless offline mode is forced.
    pub fn active_remote(&self) -> Option<&RemoteConfig> {
        if self.offline_mode {
            None
        } else {
            self.remote.as_ref()
        }
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Build the storage adapter this configuration describes.
    pub fn storage(&self) -> Result<StorageAdapter> {
        let cache = Arc::new(FileCache::new(self.cache_dir()?)?);

        match self.active_remote() {
            Some(remote) => {
                let mut client = HttpDocumentStore::new(&remote.base_url, self.request_timeout())
                    .context("Failed to build remote store client")?;
                if let Some(ref key) = remote.api_key {
                    client = client.with_api_key(key);
                }
                info!(url = %remote.base_url, "Using remote document store");
                Ok(StorageAdapter::with_remote(
                    cache,
                    Arc::new(client),
                    remote.collection_path.clone(),
                    self.request_timeout(),
                ))
            }
            None => {
                info!("No remote store configured, using local cache only");
                Ok(StorageAdapter::local_only(cache))
            }
        }
    }

    pub fn open_store(&self) -> Result<ContentStore> {
        Ok(ContentStore::new(self.storage()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_is_local_only() {
        let config = Config::default();
        assert!(config.active_remote().is_none());
        assert_eq!(config.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[
            ("SITEKEEP_REMOTE_URL", "https://store.example.com"),
            ("SITEKEEP_REMOTE_API_KEY", "k"),
            ("SITEKEEP_TIMEOUT_SECS", "3"),
            ("SITEKEEP_CACHE_DIR", "/tmp/sitekeep"),
        ]));

        let remote = config.active_remote().unwrap();
        assert_eq!(remote.base_url, "https://store.example.com");
        assert_eq!(remote.api_key.as_deref(), Some("k"));
        assert_eq!(remote.collection_path, "site_data");
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.cache_dir().unwrap(), PathBuf::from("/tmp/sitekeep"));
    }

    #[test]
    fn test_offline_flag_disables_remote() {
        let mut config = Config {
            remote: Some(RemoteConfig::new("https://store.example.com")),
            ..Config::default()
        };
        config.apply_overrides(lookup(&[("SITEKEEP_OFFLINE", "1")]));
        assert!(config.remote.is_some());
        assert!(config.active_remote().is_none());
    }

    #[test]
    fn test_invalid_timeout_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup(&[("SITEKEEP_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.request_timeout_secs, default_timeout_secs());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"remote":{"base_url":"https://x"}}"#).unwrap();
        assert_eq!(config.request_timeout_secs, default_timeout_secs());
        assert_eq!(config.remote.unwrap().collection_path, "site_data");
    }

    #[test]
    fn test_set_remote_keeps_collection_path() {
        let mut config = Config {
            remote: Some(RemoteConfig {
                collection_path: "studio".to_string(),
                ..RemoteConfig::new("https://old.example.com")
            }),
            offline_mode: true,
            ..Config::default()
        };
        config.set_remote(" https://new.example.com ", Some("k".to_string()));

        let remote = config.active_remote().unwrap();
        assert_eq!(remote.base_url, "https://new.example.com");
        assert_eq!(remote.api_key.as_deref(), Some("k"));
        assert_eq!(remote.collection_path, "studio");

        config.clear_remote();
        assert!(config.active_remote().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("sitekeep-config-{}", std::process::id()))
            .join(CONFIG_FILE);
        let config = Config {
            remote: Some(RemoteConfig::new("https://store.example.com")),
            request_timeout_secs: 7,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
