// Generate text from template segments

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use stencil_config::AppConfig;
use stencil_generation::TokenValues;

use super::{configured_engine, resolve_template, Command};
use crate::error::{CliError, CliResult};

/// Generate text from template segments
pub struct GenerateCommand {
    pub template: Option<PathBuf>,
    pub segments: Vec<String>,
    pub values: Vec<(String, String)>,
    pub tokens_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub config: AppConfig,
}

impl GenerateCommand {
    pub fn new(template: Option<PathBuf>, segments: Vec<String>, config: AppConfig) -> Self {
        Self {
            template,
            segments,
            values: Vec::new(),
            tokens_file: None,
            output: None,
            config,
        }
    }

    /// Token values given as `NAME=VALUE` pairs
    pub fn with_values(mut self, values: Vec<(String, String)>) -> Self {
        self.values = values;
        self
    }

    /// JSON file holding token values
    pub fn with_tokens_file(mut self, tokens_file: Option<PathBuf>) -> Self {
        self.tokens_file = tokens_file;
        self
    }

    /// Output file; stdout when neither this nor the configured output is set
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    /// Token values from the token file, overlaid with the `NAME=VALUE` pairs.
    ///
    /// `None` when neither source was given.
    pub fn token_values(&self) -> CliResult<Option<TokenValues>> {
        if self.tokens_file.is_none() && self.values.is_empty() {
            return Ok(None);
        }

        let mut values = match &self.tokens_file {
            Some(path) => read_token_file(path)?,
            None => TokenValues::new(),
        };
        for (name, value) in &self.values {
            values.insert(name.clone(), Some(value.clone()));
        }
        Ok(Some(values))
    }

    /// Generate every segment in order and emit the text to the output file or `out`
    pub fn run(&self, out: &mut dyn Write) -> CliResult<()> {
        if self.segments.is_empty() {
            return Err(CliError::InvalidArgument {
                message: "at least one segment is required".to_string(),
            });
        }

        let template = resolve_template(self.template.as_deref(), &self.config)?;
        let values = self.token_values()?;

        let mut engine = configured_engine(&self.config);
        engine.load_template_from(&template)?;

        for (index, segment) in self.segments.iter().enumerate() {
            let segment_values = if index == 0 { values.as_ref() } else { None };
            if !engine.generate_segment(segment, segment_values) {
                return Err(CliError::Generation(format!(
                    "segment '{}' could not be generated from {}",
                    segment,
                    template.display()
                )));
            }
        }

        let output = self
            .output
            .clone()
            .or_else(|| self.config.template.output.clone());
        match output {
            Some(path) => engine.write_generated_text_to_file(&path, true)?,
            None => {
                for line in engine.generated_text() {
                    writeln!(out, "{}", line)?;
                }
            }
        }
        Ok(())
    }
}

impl Command for GenerateCommand {
    fn execute(&self) -> CliResult<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.run(&mut lock)
    }
}

/// Read a JSON object of string or null values
fn read_token_file(path: &Path) -> CliResult<TokenValues> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| CliError::TokenFile {
        path: path.to_path_buf(),
        source,
    })
}
