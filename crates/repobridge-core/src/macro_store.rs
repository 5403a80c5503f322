//! Per-macro-instance persistence.
//!
//! Each embedded macro instance is identified by a `local_id`. Its
//! non-secret settings live in `macros.toml` under `macro-config-{id}`;
//! its access token lives in `secrets.toml` under `macro-token-{id}`,
//! a separate file readable only by its owner.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::types::{ConnectionParameters, Provider};

const CONFIG_FILE: &str = "macros.toml";
const SECRETS_FILE: &str = "secrets.toml";

pub fn token_key(local_id: &str) -> String {
    format!("macro-token-{}", local_id)
}

pub fn config_key(local_id: &str) -> String {
    format!("macro-config-{}", local_id)
}

/// Non-secret settings collected for a macro instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroConfig {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl MacroConfig {
    /// Connection parameters without a token.
    pub fn to_params(&self) -> ConnectionParameters {
        ConnectionParameters {
            provider: self.provider,
            host: self.host.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            token: None,
        }
    }

    /// File path, if one is configured and non-empty.
    pub fn file_path(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// File-backed store for macro configs and tokens.
#[derive(Debug, Clone)]
pub struct MacroStore {
    dir: PathBuf,
}

impl MacroStore {
    /// Store rooted at the platform config directory.
    pub fn from_default_dir() -> anyhow::Result<Self> {
        Ok(Self::new(crate::config::store::default_config_dir()?))
    }

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.dir.join(SECRETS_FILE)
    }

    pub fn save_token(&self, local_id: &str, token: &str) -> anyhow::Result<()> {
        if local_id.is_empty() || token.is_empty() {
            anyhow::bail!("localId and token are required");
        }

        let path = self.secrets_path();
        let mut secrets: BTreeMap<String, String> = read_table(&path)?;
        secrets.insert(token_key(local_id), token.to_string());
        write_table(&path, &secrets)?;
        restrict_permissions(&path)?;

        tracing::debug!(local_id = %local_id, token_length = token.len(), "Saved macro token");
        Ok(())
    }

    pub fn load_token(&self, local_id: &str) -> anyhow::Result<Option<String>> {
        if local_id.is_empty() {
            return Ok(None);
        }
        let mut secrets: BTreeMap<String, String> = read_table(&self.secrets_path())?;
        Ok(secrets
            .remove(&token_key(local_id))
            .filter(|token| !token.is_empty()))
    }

    pub fn save_config(&self, local_id: &str, config: &MacroConfig) -> anyhow::Result<()> {
        if local_id.is_empty() {
            anyhow::bail!("localId is required");
        }

        let path = self.config_path();
        let mut configs: BTreeMap<String, MacroConfig> = read_table(&path)?;
        configs.insert(config_key(local_id), config.clone());
        write_table(&path, &configs)?;

        tracing::debug!(local_id = %local_id, provider = %config.provider, "Saved macro config");
        Ok(())
    }

    pub fn load_config(&self, local_id: &str) -> anyhow::Result<Option<MacroConfig>> {
        if local_id.is_empty() {
            return Ok(None);
        }
        let mut configs: BTreeMap<String, MacroConfig> = read_table(&self.config_path())?;
        let config = configs.remove(&config_key(local_id));
        tracing::debug!(local_id = %local_id, has_config = config.is_some(), "Loaded macro config");
        Ok(config)
    }

    /// Remove both the config and the token of a macro instance.
    ///
    /// Returns true if anything was removed.
    pub fn delete(&self, local_id: &str) -> anyhow::Result<bool> {
        let mut removed = false;

        let config_path = self.config_path();
        let mut configs: BTreeMap<String, MacroConfig> = read_table(&config_path)?;
        if configs.remove(&config_key(local_id)).is_some() {
            write_table(&config_path, &configs)?;
            removed = true;
        }

        let secrets_path = self.secrets_path();
        let mut secrets: BTreeMap<String, String> = read_table(&secrets_path)?;
        if secrets.remove(&token_key(local_id)).is_some() {
            write_table(&secrets_path, &secrets)?;
            restrict_permissions(&secrets_path)?;
            removed = true;
        }

        Ok(removed)
    }
}

fn read_table<T: DeserializeOwned + Default>(path: &Path) -> anyhow::Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_table<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
