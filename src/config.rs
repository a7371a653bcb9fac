//! Botyard configuration file handling
//!
//! Loads and manages the ~/.config/botyard/config.yaml file.

use crate::registry::RegistryConfig;
use crate::supervisor::ManagerConfig;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Botyard configuration
///
/// Represents the ~/.config/botyard/config.yaml file: where the registry
/// database and bot logs live, where ingested repositories are cloned to,
/// and which runtime launches bot entrypoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotyardConfig {
    /// Path to the SQLite registry database
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,

    /// Directory bot log files are appended under
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,

    /// Default workspace directory for cloning repositories
    /// Defaults to ~/Workspace if not specified
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// Program used to launch bot entrypoints
    #[serde(default = "default_runtime")]
    pub runtime: String,
}

fn default_registry_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("botyard");
    path.push("registry.db");
    path
}

fn default_logs_dir() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("botyard");
    path.push("logs");
    path
}

fn default_workspace_dir() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("Workspace");
    path
}

fn default_runtime() -> String {
    "python3".to_string()
}

impl BotyardConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self {
            registry_path: default_registry_path(),
            logs_dir: default_logs_dir(),
            workspace_dir: default_workspace_dir(),
            runtime: default_runtime(),
        }
    }

    /// Load configuration from the default path (~/.config/botyard/config.yaml)
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::BotyardError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading Botyard configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            registry = %config.registry_path.display(),
            runtime = %config.runtime,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load the default config file, falling back to defaults when absent
    ///
    /// An explicitly-selected file that does not exist is an error; the
    /// default file merely not having been written yet is not.
    pub fn load_or_default() -> Result<Self> {
        if Self::default_path().exists() {
            Self::load_default()
        } else {
            Ok(Self::new())
        }
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving Botyard configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/botyard/config.yaml)
    pub fn default_path() -> PathBuf {
        // Always use ~/.config for consistency across platforms (macOS, Linux)
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("botyard");
        path.push("config.yaml");
        path
    }

    /// Registry settings derived from this configuration
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            path: self.registry_path.clone(),
            wal_mode: true,
        }
    }

    /// Supervisor settings derived from this configuration
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            logs_dir: self.logs_dir.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

impl Default for BotyardConfig {
    fn default() -> Self {
        Self::new()
    }
}
