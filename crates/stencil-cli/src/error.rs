// CLI error types

use std::path::PathBuf;

use stencil_config::ConfigError;
use stencil_generation::TemplateError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Invalid token file {path}: {source}")]
    TokenFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Generation error: {0}")]
    Generation(String),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'stencil --help' for usage information.",
                    message
                )
            }
            CliError::Io(e) => {
                format!("File operation failed: {}", e)
            }
            CliError::Config(e) => {
                format!(
                    "{}\n\nCheck stencil.toml and STENCIL_* environment variables.",
                    e
                )
            }
            CliError::Template(e) => {
                format!("Template error: {}", e)
            }
            CliError::TokenFile { path, source } => {
                format!(
                    "Cannot read token values from {}: {}\n\nToken files hold a JSON object of string or null values.",
                    path.display(),
                    source
                )
            }
            CliError::Generation(msg) => {
                format!("Generation failed: {}\n\nRun with --verbose for diagnostics.", msg)
            }
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
