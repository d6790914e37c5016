use crate::domain::ManagerCli;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_FILE_NAME: &str = "inventory.toml";
pub const DEFAULT_SSH_KEY_CANDIDATES: [&str; 2] = ["~/.ssh/id_incus", "~/.ssh/id_lxc"];
pub const DEFAULT_SSH_COMMON_ARGS: &str =
    "-o StrictHostKeyChecking=no -o UserKnownHostsFile=/dev/null";
pub const DEFAULT_USER: &str = "ec";
pub const DEFAULT_FEDORA_USER: &str = "fedora";

pub fn default_config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config/incus-inventory")
}

pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join(DEFAULT_CONFIG_FILE_NAME)
}

#[derive(Deserialize, Debug, Default)]
pub struct ManagerConfig {
    /// Skip detection and always use this client
    pub command: Option<ManagerCli>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SshConfig {
    pub key_candidates: Option<Vec<String>>,
    pub common_args: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct DefaultsConfig {
    pub user: Option<String>,
    pub fedora_user: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub manager: ManagerConfig,
    #[serde(default)]
    pub ssh: SshConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Values the inventory builder works with, after defaults and path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySettings {
    pub command: Option<ManagerCli>,
    pub ssh_key: PathBuf,
    pub ssh_common_args: String,
    pub default_user: String,
    pub fedora_user: String,
}

impl AppConfig {
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).with_context(|| format!("parsing {:?}", path))
    }

    pub fn ssh_key_candidates(&self) -> Vec<PathBuf> {
        match &self.ssh.key_candidates {
            Some(candidates) if !candidates.is_empty() => {
                candidates.iter().map(|c| expand_path(c)).collect()
            }
            _ => DEFAULT_SSH_KEY_CANDIDATES
                .iter()
                .map(|c| expand_path(c))
                .collect(),
        }
    }

    pub fn resolve(&self) -> InventorySettings {
        InventorySettings {
            command: self.manager.command,
            ssh_key: select_ssh_key(&self.ssh_key_candidates()),
            ssh_common_args: self
                .ssh
                .common_args
                .clone()
                .unwrap_or_else(|| DEFAULT_SSH_COMMON_ARGS.to_string()),
            default_user: self
                .defaults
                .user
                .clone()
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            fedora_user: self
                .defaults
                .fedora_user
                .clone()
                .unwrap_or_else(|| DEFAULT_FEDORA_USER.to_string()),
        }
    }
}

/// Reads `inventory.toml` from `config_dir`; a missing file means defaults.
pub fn load_app_config(config_dir: &Path) -> Result<AppConfig> {
    let path = config_path(config_dir);

    if !path.exists() {
        debug!("no config at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    AppConfig::parse(&content, &path)
}

/// Like [`load_app_config`], but a broken config file only produces a warning.
pub fn load_app_config_or_default(config_dir: &Path) -> AppConfig {
    match load_app_config(config_dir) {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring config in {:?}: {:#}", config_dir, e);
            AppConfig::default()
        }
    }
}

pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// First candidate that exists, otherwise the first candidate.
pub fn select_ssh_key(candidates: &[PathBuf]) -> PathBuf {
    candidates
        .iter()
        .find(|path| path.exists())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_default()
}
