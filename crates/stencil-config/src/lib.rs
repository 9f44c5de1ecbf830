//! Stencil configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `STENCIL_*` environment variables.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::{ConfigManager, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use types::{AppConfig, ConfigStore, IndentSettings, TemplateSettings, TokenSettings};
