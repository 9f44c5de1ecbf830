//! Core configuration types and data structures

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Smallest accepted tab size
pub const MIN_TAB_SIZE: i32 = 1;
/// Largest accepted tab size
pub const MAX_TAB_SIZE: i32 = 9;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Default template and output locations
    pub template: TemplateSettings,
    /// Token delimiters
    pub tokens: TokenSettings,
    /// Indentation
    pub indent: IndentSettings,
}

/// Default template and output locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TemplateSettings {
    /// Template loaded when no path is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Output file used when no path is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Token delimiters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenSettings {
    /// Token start delimiter
    pub start: String,
    /// Token end delimiter
    pub end: String,
    /// Escape character, stored as a one-character string
    pub escape: String,
}

/// Indentation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndentSettings {
    /// Initial tab size
    pub tab_size: i32,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            start: "<#=".to_string(),
            end: "#>".to_string(),
            escape: "\\".to_string(),
        }
    }
}

impl TokenSettings {
    /// The escape character, if `escape` holds exactly one character
    pub fn escape_char(&self) -> Option<char> {
        let mut chars = self.escape.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl Default for IndentSettings {
    fn default() -> Self {
        Self { tab_size: 4 }
    }
}

impl AppConfig {
    /// Check delimiters and tab size
    pub fn validate(&self) -> Result<()> {
        let tokens = &self.tokens;
        if tokens.start.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Token start delimiter must not be blank".to_string(),
            ));
        }
        if tokens.end.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Token end delimiter must not be blank".to_string(),
            ));
        }
        if tokens.start == tokens.end {
            return Err(ConfigError::Validation(format!(
                "Token start and end delimiters must differ (both '{}')",
                tokens.start
            )));
        }
        if !tokens.escape_char().is_some_and(|c| !c.is_whitespace()) {
            return Err(ConfigError::Validation(format!(
                "Token escape must be exactly one non-blank character, got '{}'",
                tokens.escape
            )));
        }
        if tokens.start == tokens.escape || tokens.end == tokens.escape {
            return Err(ConfigError::Validation(format!(
                "Token delimiters must differ from the escape character '{}'",
                tokens.escape
            )));
        }
        if !(MIN_TAB_SIZE..=MAX_TAB_SIZE).contains(&self.indent.tab_size) {
            return Err(ConfigError::Validation(format!(
                "Tab size {} is out of range [{}, {}]",
                self.indent.tab_size, MIN_TAB_SIZE, MAX_TAB_SIZE
            )));
        }
        Ok(())
    }
}

/// Loads, saves and checks an [`AppConfig`]
pub trait ConfigStore {
    /// Load configuration
    fn load_config(&self) -> Result<AppConfig>;
    /// Save configuration
    fn save_config(&self, config: &AppConfig) -> Result<()>;
    /// Validate configuration
    fn validate_config(&self, config: &AppConfig) -> Result<()> {
        config.validate()
    }
}
