//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! branchwork has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: Overrides stored next to the edited document
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$BRANCHWORK_CONFIG` if set (warns when the file is missing)
//! 2. `$XDG_CONFIG_HOME/branchwork/config.toml`
//! 3. `~/.branchwork/config.toml`
//!
//! # Project Config Location
//!
//! `.branchwork/config.toml` in the document's directory.
//!
//! # Example
//!
//! ```no_run
//! use branchwork::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/project"))).unwrap();
//! let config = result.config;
//!
//! println!("Style: {}", config.style());
//! println!("Clearing allowed: {}", config.allow_clear());
//! ```

pub mod schema;

pub use schema::{BranchConfig, ConfigFile, DiagramStyle, EngineConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default number of ledger events kept in memory.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessor methods apply precedence rules: project config overrides
/// global config, which overrides defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: ConfigFile,
    /// Project configuration (if found)
    pub project: Option<ConfigFile>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `project_dir` is provided, also loads project config from it.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing config files are not an error.
    pub fn load(project_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();
        let global_path = Self::find_global(&mut warnings);
        let mut result = Self::load_from(global_path.as_deref(), project_dir)?;
        warnings.append(&mut result.warnings);
        result.warnings = warnings;
        Ok(result)
    }

    /// Load configuration from an explicit global file and project directory.
    pub fn load_from(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let global = match global_path {
            Some(path) => Self::read_config(path)?,
            None => ConfigFile::default(),
        };

        let (project, project_path) = match project_dir {
            Some(dir) => Self::load_project(dir)?,
            None => (None, None),
        };

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path: global_path.map(Path::to_path_buf),
                project_path,
            },
            warnings: Vec::new(),
        })
    }

    /// Locate the global config file, if any exists.
    fn find_global(warnings: &mut Vec<ConfigWarning>) -> Option<PathBuf> {
        if let Ok(path) = std::env::var("BRANCHWORK_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            warnings.push(ConfigWarning {
                message: format!(
                    "BRANCHWORK_CONFIG points to missing file '{}', ignoring it",
                    path.display()
                ),
                path,
            });
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("branchwork/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".branchwork/config.toml"))
            .filter(|path| path.exists())
    }

    fn load_project(dir: &Path) -> Result<(Option<ConfigFile>, Option<PathBuf>), ConfigError> {
        let path = Self::project_config_path(dir);
        if !path.exists() {
            return Ok((None, None));
        }
        let config = Self::read_config(&path)?;
        Ok((Some(config), Some(path)))
    }

    fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Canonical project config path for a document directory.
    pub fn project_config_path(dir: &Path) -> PathBuf {
        dir.join(".branchwork/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    fn layered<T>(&self, pick: impl Fn(&ConfigFile) -> Option<T>) -> Option<T> {
        self.project
            .as_ref()
            .and_then(&pick)
            .or_else(|| pick(&self.global))
    }

    /// Diagram style. Defaults to `mtr`.
    pub fn style(&self) -> DiagramStyle {
        self.layered(|c| c.style).unwrap_or_default()
    }

    /// Whether branch types may be cleared. Defaults to `true`.
    pub fn allow_clear(&self) -> bool {
        self.layered(|c| c.branch.as_ref().and_then(|b| b.allow_clear))
            .unwrap_or(true)
    }

    /// Whether the executor verifies touched stations. Defaults to `true`.
    pub fn verify_mutations(&self) -> bool {
        self.layered(|c| c.engine.as_ref().and_then(|e| e.verify_mutations))
            .unwrap_or(true)
    }

    /// Ledger capacity. Defaults to [`DEFAULT_HISTORY_LIMIT`].
    pub fn history_limit(&self) -> usize {
        self.layered(|c| c.engine.as_ref().and_then(|e| e.history_limit))
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}
