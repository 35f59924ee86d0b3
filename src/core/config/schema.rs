//! core::config::schema
//!
//! Configuration schema types.
//!
//! The same schema is used for the global file and the project file; the
//! project file wins key by key.
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g. the history limit must
//! be positive).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Diagram style the document is edited for.
///
/// Styles differ in which branch controls they offer: `shmetro` diagrams
/// draw branches without an upper/lower choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramStyle {
    #[default]
    Mtr,
    Gzmtr,
    Shmetro,
}

impl DiagramStyle {
    pub const ALL: [DiagramStyle; 3] = [DiagramStyle::Mtr, DiagramStyle::Gzmtr, DiagramStyle::Shmetro];

    /// Whether branches can be moved between the upper and lower slot.
    pub fn supports_branch_position(self) -> bool {
        !matches!(self, DiagramStyle::Shmetro)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiagramStyle::Mtr => "mtr",
            DiagramStyle::Gzmtr => "gzmtr",
            DiagramStyle::Shmetro => "shmetro",
        }
    }
}

impl FromStr for DiagramStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "invalid style '{}', must be one of: mtr, gzmtr, shmetro",
                    s
                ))
            })
    }
}

impl fmt::Display for DiagramStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration file (global or project scope).
///
/// # Example
///
/// ```toml
/// style = "gzmtr"
///
/// [branch]
/// allow_clear = true
///
/// [engine]
/// verify_mutations = true
/// history_limit = 64
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Diagram style
    pub style: Option<DiagramStyle>,

    /// Branch editing policy
    pub branch: Option<BranchConfig>,

    /// Dispatcher settings
    pub engine: Option<EngineConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(engine) = &self.engine {
            engine.validate()?;
        }
        Ok(())
    }
}

/// Branch editing policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BranchConfig {
    /// Whether a branch type may be cleared once set
    pub allow_clear: Option<bool>,
}

/// Dispatcher settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Verify touched stations after every mutation
    pub verify_mutations: Option<bool>,

    /// Number of ledger events kept in memory
    pub history_limit: Option<usize>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == Some(0) {
            return Err(ConfigError::InvalidValue(
                "engine.history_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod config_file {
        use super::*;

        #[test]
        fn defaults() {
            let config = ConfigFile::default();
            assert!(config.style.is_none());
            assert!(config.branch.is_none());
            assert!(config.engine.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn parses_all_sections() {
            let toml = r#"
                style = "shmetro"

                [branch]
                allow_clear = false

                [engine]
                verify_mutations = false
                history_limit = 8
            "#;
            let config: ConfigFile = toml::from_str(toml).unwrap();
            assert_eq!(config.style, Some(DiagramStyle::Shmetro));
            assert_eq!(config.branch.unwrap().allow_clear, Some(false));
            let engine = config.engine.unwrap();
            assert_eq!(engine.verify_mutations, Some(false));
            assert_eq!(engine.history_limit, Some(8));
        }

        #[test]
        fn roundtrip() {
            let config = ConfigFile {
                style: Some(DiagramStyle::Gzmtr),
                branch: Some(BranchConfig {
                    allow_clear: Some(true),
                }),
                engine: Some(EngineConfig {
                    verify_mutations: Some(true),
                    history_limit: Some(16),
                }),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: ConfigFile = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }

        #[test]
        fn reject_unknown_fields() {
            let toml = r#"
                style = "mtr"
                unknown_field = true
            "#;

            let result: Result<ConfigFile, _> = toml::from_str(toml);
            assert!(result.is_err());
        }

        #[test]
        fn reject_unknown_style() {
            let result: Result<ConfigFile, _> = toml::from_str(r#"style = "bvg""#);
            assert!(result.is_err());
        }

        #[test]
        fn zero_history_limit_invalid() {
            let config = ConfigFile {
                engine: Some(EngineConfig {
                    history_limit: Some(0),
                    ..Default::default()
                }),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }

    mod diagram_style {
        use super::*;

        #[test]
        fn branch_position_support() {
            assert!(DiagramStyle::Mtr.supports_branch_position());
            assert!(DiagramStyle::Gzmtr.supports_branch_position());
            assert!(!DiagramStyle::Shmetro.supports_branch_position());
        }

        #[test]
        fn parse() {
            assert_eq!("gzmtr".parse::<DiagramStyle>().unwrap(), DiagramStyle::Gzmtr);
            assert!("tokyo".parse::<DiagramStyle>().is_err());
        }
    }
}
