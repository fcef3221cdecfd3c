//! Remote-sync configuration persisted next to the collections.

use super::error::ConfigError;
use crate::repo::RepoResult;
use crate::store::{KvStore, SYNC_CONFIG_KEY};
use log::warn;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_PATH: &str = "labnote_data.json";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_path() -> String {
    DEFAULT_PATH.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

/// Where and how to mirror the database remotely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// File path inside the repository.
    #[serde(default = "default_path")]
    pub path: String,
    /// Contents API root, without trailing slash.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            path: default_path(),
            api_base: default_api_base(),
        }
    }
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("path", &self.path)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl SyncConfig {
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            ..Self::default()
        }
    }

    /// Precondition for every remote call: token, owner and repo are set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.owner.trim().is_empty() {
            return Err(ConfigError::MissingOwner);
        }
        if self.repo.trim().is_empty() {
            return Err(ConfigError::MissingRepo);
        }
        Ok(())
    }

    /// Loads the stored config; missing or unreadable config yields defaults.
    pub fn load(store: &impl KvStore) -> Self {
        let raw = match store.get(SYNC_CONFIG_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(err) => {
                warn!(
                    "event=sync_config_load module=sync status=error error_code=store_read_failed error={err}"
                );
                return Self::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(
                "event=sync_config_load module=sync status=error error_code=corrupt_config error={err}"
            );
            Self::default()
        })
    }

    /// Persists the config under its fixed key.
    pub fn save(&self, store: &impl KvStore) -> RepoResult<()> {
        let raw = serde_json::to_string(self)?;
        store.set(SYNC_CONFIG_KEY, &raw)?;
        Ok(())
    }
}
