//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/skilltree/skilltree.toml`
//! 3. Local config: `<trees_dir>/.skilltree.toml`
//! 4. Environment variables: `SKILLTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::StorageHandle;

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub trees_dir: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub storage: Option<StorageHandle>,
}

/// Unified configuration for skilltree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding tree definition files (default: cwd)
    pub trees_dir: PathBuf,
    /// Directory for saved tree state (default: XDG data dir)
    pub state_dir: PathBuf,
    /// Storage handle passed to save handlers
    pub storage: StorageHandle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trees_dir: PathBuf::from("."),
            state_dir: default_state_dir(),
            storage: StorageHandle::Local,
        }
    }
}

fn default_state_dir() -> PathBuf {
    ProjectDirs::from("", "", "skilltree")
        .map(|dirs| dirs.data_dir().join("state"))
        .unwrap_or_else(|| PathBuf::from("~/.skilltree/state"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string; unknown variables are left as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Get the XDG config directory for skilltree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "skilltree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("skilltree.toml"))
}

/// Get the path to the local config file in a trees directory.
pub fn local_config_path(trees_dir: &Path) -> PathBuf {
    trees_dir.join(".skilltree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn parse_storage(value: &str) -> Result<StorageHandle, ApplicationError> {
    match value.trim().to_lowercase().as_str() {
        "local" => Ok(StorageHandle::Local),
        "session" => Ok(StorageHandle::Session),
        other => Err(ApplicationError::Config {
            message: format!("invalid storage '{other}', expected 'local' or 'session'"),
        }),
    }
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.trees_dir = PathBuf::from(expand_env_vars(&self.trees_dir.to_string_lossy()));
        self.state_dir = PathBuf::from(expand_env_vars(&self.state_dir.to_string_lossy()));
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            trees_dir: overlay
                .trees_dir
                .clone()
                .unwrap_or_else(|| self.trees_dir.clone()),
            state_dir: overlay
                .state_dir
                .clone()
                .unwrap_or_else(|| self.state_dir.clone()),
            storage: overlay.storage.unwrap_or(self.storage),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `trees_dir` - Optional trees directory; also the location of the local config
    ///
    /// An explicit `trees_dir` argument wins over the configured one, except
    /// for `SKILLTREE_TREES_DIR`.
    pub fn load(trees_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = trees_dir {
            current.trees_dir = dir.to_path_buf();
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let mut raw = load_raw_settings(&local_path)?;
                // The local file lives inside trees_dir; it cannot move it
                raw.trees_dir = None;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply SKILLTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SKILLTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("trees_dir") {
            settings.trees_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("state_dir") {
            settings.state_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("storage") {
            settings.storage = parse_storage(&val)?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# skilltree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/skilltree/skilltree.toml
#   Local:  <trees_dir>/.skilltree.toml
#   Env:    SKILLTREE_* environment variables

# Directory containing tree definition files (*.toml)
# trees_dir = "~/skilltrees"

# Directory where tree state is saved
# state_dir = "~/.local/share/skilltree/state"

# Storage handle passed to the save handler: "local" or "session"
# storage = "local"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
