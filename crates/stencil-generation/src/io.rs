//! Reading template files and writing generated text

use std::{fs, path::Path};

use tracing::debug;

use crate::error::{Result, TemplateError};

/// Reads a template as a list of lines
pub trait TextReader {
    /// Read all lines of the file at `path`, without line terminators
    fn read_lines(&self, path: &Path) -> Result<Vec<String>>;
}

/// Writes generated text
pub trait TextWriter {
    /// Write `lines` to `path`, replacing any existing file
    fn write_lines(&self, path: &Path, lines: &[String]) -> Result<()>;
}

/// Reads templates from the file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTextReader;

impl TextReader for FileTextReader {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        let content = fs::read_to_string(path).map_err(|e| TemplateError::io(path, e))?;
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        debug!(path = %path.display(), lines = lines.len(), "Read template file");
        Ok(lines)
    }
}

/// Writes generated text to the file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTextWriter;

impl TextWriter for FileTextWriter {
    fn write_lines(&self, path: &Path, lines: &[String]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| TemplateError::io(parent, e))?;
            }
        }

        let mut content = String::new();
        for line in lines {
            content.push_str(line);
            content.push('\n');
        }

        fs::write(path, content).map_err(|e| TemplateError::io(path, e))?;
        debug!(path = %path.display(), lines = lines.len(), "Wrote generated text");
        Ok(())
    }
}
