use crate::error::{InstallerError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Installer settings, built once at startup and handed to every step.
///
/// Read from an optional `agent-os-installer.yaml` in the project root.
/// Every field has a default, so a missing or partial file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallerConfig {
    /// `owner/name` of the Agent OS repository cloned with `gh`.
    #[serde(default = "default_repository")]
    pub repository: String,
    /// Directory name of the Agent OS checkout under the home directory.
    #[serde(default = "default_install_dir_name")]
    pub install_dir_name: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_install_timeout")]
    pub install_timeout_secs: u64,
    #[serde(default = "default_config_timeout")]
    pub config_timeout_secs: u64,
    #[serde(default = "default_stan_level")]
    pub recommended_stan_level: u32,
    /// Overrides the detected home directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,

    /// Project root. Runtime only.
    #[serde(skip)]
    pub root: PathBuf,
    /// Answer yes to every confirmation. Runtime only.
    #[serde(skip)]
    pub assume_yes: bool,
}

fn default_repository() -> String {
    "artisan-build/agent-os".to_string()
}

fn default_install_dir_name() -> String {
    "agent-os".to_string()
}

fn default_profile() -> String {
    "laravel".to_string()
}

fn default_install_timeout() -> u64 {
    300
}

fn default_config_timeout() -> u64 {
    30
}

fn default_stan_level() -> u32 {
    5
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            install_dir_name: default_install_dir_name(),
            profile: default_profile(),
            install_timeout_secs: default_install_timeout(),
            config_timeout_secs: default_config_timeout(),
            recommended_stan_level: default_stan_level(),
            home: None,
            root: PathBuf::from("."),
            assume_yes: false,
        }
    }
}

impl InstallerConfig {
    pub fn for_project(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load `agent-os-installer.yaml` from `root`, falling back to defaults
    /// when the file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::installer_config_path(root);
        let mut cfg = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                Self::default()
            } else {
                serde_yaml::from_str(&data)?
            }
        } else {
            Self::default()
        };
        cfg.root = root.to_path_buf();
        Ok(cfg)
    }

    pub fn home_dir(&self) -> Result<PathBuf> {
        match &self.home {
            Some(home) => Ok(home.clone()),
            None => home::home_dir().ok_or(InstallerError::HomeNotFound),
        }
    }

    /// `~/agent-os`
    pub fn agent_os_dir(&self) -> Result<PathBuf> {
        Ok(self.home_dir()?.join(&self.install_dir_name))
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    pub fn config_timeout(&self) -> Duration {
        Duration::from_secs(self.config_timeout_secs)
    }

    pub fn manifest_path(&self) -> PathBuf {
        paths::manifest_path(&self.root)
    }

    /// Resolve a project-relative path against the root.
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}
