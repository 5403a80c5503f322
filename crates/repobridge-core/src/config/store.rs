//! Config store for loading and saving repobridge.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::ResolverConfig;

pub const CONFIG_FILE_NAME: &str = "repobridge.toml";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store rooted at the platform config directory.
    pub fn from_default_dir() -> anyhow::Result<Self> {
        Ok(Self::from_dir(default_config_dir()?))
    }

    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self::from_path(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    pub fn from_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> anyhow::Result<ResolverConfig> {
        if !self.config_path.exists() {
            return Ok(ResolverConfig::default());
        }
        let content = std::fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;
        ResolverConfig::from_toml_str(&content)
    }

    pub fn save(&self, config: &ResolverConfig) -> anyhow::Result<()> {
        let content = config
            .to_toml()
            .context("Failed to serialize config to TOML")?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}

/// `<config dir>/repobridge`
pub fn default_config_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("repobridge"))
}
