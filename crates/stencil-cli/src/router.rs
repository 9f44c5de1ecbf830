// Command routing and dispatch

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stencil_config::{AppConfig, ConfigManager};
use tracing::debug;

use crate::{
    commands::*,
    error::{CliError, CliResult},
};

/// Stencil - segment template processor
#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(bin_name = "stencil")]
#[command(about = "Generate indented text from segment templates")]
#[command(
    long_about = "Stencil generates text from line-oriented templates.\n\nA template is split into named segments by '### Name' headers. Every text line starts with an indent directive, and <#=name#> placeholders are replaced by token values.\n\nExamples:\n  stencil generate class.stpl -s ClassStart -s ClassEnd --set className=Person\n  stencil inspect class.stpl"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (default: ./stencil.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate text from template segments
    #[command(about = "Generate text from one or more segments of a template")]
    Generate {
        /// Template file (default: [template] path from the configuration)
        #[arg(value_name = "TEMPLATE")]
        template: Option<PathBuf>,

        /// Segment to generate; repeat to generate several in order
        #[arg(short, long = "segment", value_name = "SEGMENT", required = true)]
        segments: Vec<String>,

        /// Token value; later values win over earlier ones and the token file
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_token_pair)]
        values: Vec<(String, String)>,

        /// JSON object of token values
        #[arg(short, long = "tokens", value_name = "FILE")]
        tokens_file: Option<PathBuf>,

        /// Output file (default: [template] output from the configuration, else stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Describe a template
    #[command(about = "List the segments, header options and tokens of a template")]
    Inspect {
        /// Template file (default: [template] path from the configuration)
        #[arg(value_name = "TEMPLATE")]
        template: Option<PathBuf>,
    },
}

/// Parse a `NAME=VALUE` argument; the value may be empty
pub fn parse_token_pair(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", arg)),
    }
}

/// Command router
pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments and route to appropriate handler
    pub fn route() -> CliResult<()> {
        let cli = Cli::parse();

        crate::logging::init_logging(cli.verbose, cli.quiet);

        Self::execute(&cli)
    }

    /// Execute a command
    pub fn execute(cli: &Cli) -> CliResult<()> {
        let config = Self::load_config(cli)?;

        match &cli.command {
            Commands::Generate {
                template,
                segments,
                values,
                tokens_file,
                output,
            } => {
                let cmd = GenerateCommand::new(template.clone(), segments.clone(), config)
                    .with_values(values.clone())
                    .with_tokens_file(tokens_file.clone())
                    .with_output(output.clone());
                cmd.execute()
            }
            Commands::Inspect { template } => {
                let cmd = InspectCommand::new(template.clone(), config);
                cmd.execute()
            }
        }
    }

    /// Load the configuration named by `--config`, else `./stencil.toml`
    pub fn load_config(cli: &Cli) -> CliResult<AppConfig> {
        let manager = match &cli.config {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::InvalidArgument {
                        message: format!("configuration file {} does not exist", path.display()),
                    });
                }
                ConfigManager::with_path(path)
            }
            None => ConfigManager::new(),
        };

        debug!(path = %manager.config_path().display(), "Using configuration");
        Ok(manager.load()?)
    }
}
