//! Error types for template loading and output

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a template or writing generated text.
///
/// Malformed template content is never an error: it is reported through the
/// [`Logger`](crate::diagnostics::Logger) and replaced by a fallback value.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Reading or writing a file failed
    #[error("IO error on {path}: {source}")]
    Io {
        /// File that could not be accessed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// `load_template` was called without a configured template path
    #[error("No template path configured")]
    NoTemplatePath,
}

impl TemplateError {
    /// Wrap an IO error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TemplateError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
