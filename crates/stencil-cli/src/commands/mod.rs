// Command handlers for the stencil CLI

pub mod generate;
pub mod inspect;

pub use generate::GenerateCommand;
pub use inspect::InspectCommand;

use std::path::{Path, PathBuf};

use stencil_config::AppConfig;
use stencil_generation::{templates::DEFAULT_TOKEN_ESCAPE, EngineSettings, TemplateEngine};

use crate::error::{CliError, CliResult};

/// Trait for command handlers
pub trait Command {
    /// Execute the command
    fn execute(&self) -> CliResult<()>;
}

/// Engine settings taken from the configuration
pub fn engine_settings(config: &AppConfig) -> EngineSettings {
    EngineSettings {
        token_start: config.tokens.start.clone(),
        token_end: config.tokens.end.clone(),
        token_escape: config.tokens.escape_char().unwrap_or(DEFAULT_TOKEN_ESCAPE),
        tab_size: config.indent.tab_size,
    }
}

/// A configured engine with the default collaborators
pub fn configured_engine(config: &AppConfig) -> TemplateEngine {
    let mut engine = TemplateEngine::new();
    engine.configure(&engine_settings(config));
    engine
}

/// The template given on the command line, else the configured one
pub fn resolve_template(template: Option<&Path>, config: &AppConfig) -> CliResult<PathBuf> {
    template
        .map(Path::to_path_buf)
        .or_else(|| config.template.path.clone())
        .ok_or_else(|| CliError::InvalidArgument {
            message: "no template given and no [template] path configured".to_string(),
        })
}
