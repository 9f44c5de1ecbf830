//! Template engine: loading, segment generation and output
//!
//! The engine owns one load-then-generate session. It keeps the tables built by
//! the [`TemplateLoader`], the indent and token state, the [`Locater`] used for
//! diagnostics and the buffer of generated lines.

use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use tracing::{debug, info};

use crate::{
    diagnostics::{Logger, TracingLogger},
    error::{Result, TemplateError},
    io::{FileTextReader, FileTextWriter, TextReader, TextWriter},
    models::{ControlItem, SegmentTables, TextItem, TokenValues, DEFAULT_TAB_SIZE},
    naming::{DefaultNameGenerator, IdentifierValidator, NameValidator, SequentialNameGenerator},
    templates::{
        tokens::{DEFAULT_TOKEN_END, DEFAULT_TOKEN_ESCAPE, DEFAULT_TOKEN_START},
        IndentProcessor, Locater, TemplateLoader, TokenProcessor,
    },
};

/// Everything the engine depends on
pub struct Collaborators {
    /// Diagnostic sink
    pub logger: Rc<dyn Logger>,
    /// Identifier check for segment, option and token names
    pub validator: Rc<dyn NameValidator>,
    /// Source of default segment names
    pub names: Rc<dyn DefaultNameGenerator>,
    /// Template file reader
    pub reader: Box<dyn TextReader>,
    /// Output file writer
    pub writer: Box<dyn TextWriter>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            logger: Rc::new(TracingLogger),
            validator: Rc::new(IdentifierValidator),
            names: Rc::new(SequentialNameGenerator::new()),
            reader: Box::new(FileTextReader),
            writer: Box::new(FileTextWriter),
        }
    }
}

impl Collaborators {
    /// Replace the diagnostic sink
    pub fn with_logger(mut self, logger: Rc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Replace the template reader
    pub fn with_reader(mut self, reader: Box<dyn TextReader>) -> Self {
        self.reader = reader;
        self
    }

    /// Replace the output writer
    pub fn with_writer(mut self, writer: Box<dyn TextWriter>) -> Self {
        self.writer = writer;
        self
    }
}

/// Token delimiters and tab size applied by [`TemplateEngine::configure`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Token start delimiter
    pub token_start: String,
    /// Token end delimiter
    pub token_end: String,
    /// Token escape character
    pub token_escape: char,
    /// Tab size used whenever the indent state is reset
    pub tab_size: i32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            token_start: DEFAULT_TOKEN_START.to_string(),
            token_end: DEFAULT_TOKEN_END.to_string(),
            token_escape: DEFAULT_TOKEN_ESCAPE,
            tab_size: DEFAULT_TAB_SIZE,
        }
    }
}

/// Loads segment templates and generates text from them
pub struct TemplateEngine {
    logger: Rc<dyn Logger>,
    reader: Box<dyn TextReader>,
    writer: Box<dyn TextWriter>,
    loader: TemplateLoader,
    indent: IndentProcessor,
    tokens: TokenProcessor,
    locater: Locater,
    tables: SegmentTables,
    loaded: bool,
    generated: Vec<String>,
    template_path: Option<PathBuf>,
    tab_size: i32,
}

impl TemplateEngine {
    /// Create an engine with the default collaborators
    pub fn new() -> Self {
        Self::with_collaborators(Collaborators::default())
    }

    /// Create an engine with the given collaborators
    pub fn with_collaborators(collaborators: Collaborators) -> Self {
        let Collaborators {
            logger,
            validator,
            names,
            reader,
            writer,
        } = collaborators;

        Self {
            loader: TemplateLoader::new(logger.clone(), validator.clone(), names),
            indent: IndentProcessor::new(logger.clone()),
            tokens: TokenProcessor::new(logger.clone(), validator),
            logger,
            reader,
            writer,
            locater: Locater::new(),
            tables: SegmentTables::default(),
            loaded: false,
            generated: Vec::new(),
            template_path: None,
            tab_size: DEFAULT_TAB_SIZE,
        }
    }

    /// Set the template used by [`load_template`](Self::load_template)
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    /// Apply delimiters and tab size.
    ///
    /// Invalid values are logged and the previous setting is kept.
    pub fn configure(&mut self, settings: &EngineSettings) {
        self.tokens.set_token_delimiters(
            &settings.token_start,
            &settings.token_end,
            settings.token_escape,
        );
        self.indent.set_tab_size(settings.tab_size, &self.locater);
        self.tab_size = self.indent.tab_size();
    }

    /// Replace the token delimiters; see [`TokenProcessor::set_token_delimiters`]
    pub fn set_token_delimiters(&mut self, start: &str, end: &str, escape: char) -> bool {
        self.tokens.set_token_delimiters(start, end, escape)
    }

    /// Load the configured template file
    pub fn load_template(&mut self) -> Result<()> {
        let path = self
            .template_path
            .clone()
            .ok_or(TemplateError::NoTemplatePath)?;
        self.load_template_from(path)
    }

    /// Load a template file
    pub fn load_template_from(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let lines = self.reader.read_lines(path).map_err(|e| {
            self.logger.error(
                &self.locater,
                &format!("Cannot read template {}: {}", path.display(), e),
            );
            e
        })?;

        self.load_template_lines(&lines);
        info!(
            path = %path.display(),
            segments = self.tables.segments.len(),
            "Template loaded"
        );
        Ok(())
    }

    /// Load a template held in memory
    pub fn load_template_str(&mut self, template: &str) {
        let lines: Vec<&str> = template.lines().collect();
        self.load_template_lines(&lines);
    }

    /// Load template lines, replacing any earlier template
    pub fn load_template_lines<S: AsRef<str>>(&mut self, lines: &[S]) {
        self.tokens.clear();
        self.tables = self
            .loader
            .load(lines, &mut self.locater, &self.indent, &mut self.tokens);
        self.loaded = true;

        debug!(
            lines = lines.len(),
            segments = self.tables.segments.len(),
            tokens = self.tokens.tokens().len(),
            "Template tables built"
        );
    }

    /// Generate a segment into the output buffer.
    ///
    /// Returns `false`, after logging why, when nothing could be generated.
    pub fn generate_segment(&mut self, name: &str, token_values: Option<&TokenValues>) -> bool {
        if !self.loaded {
            self.logger.error(
                &self.locater,
                &format!("Template not loaded; cannot generate segment '{}'", name),
            );
            return false;
        }
        if name.trim().is_empty() {
            self.logger.error(&self.locater, "Segment name is blank");
            return false;
        }
        let Some(control) = self.tables.controls.get(name).cloned() else {
            self.logger.error(
                &self.locater,
                &format!("Segment '{}' not found", name),
            );
            return false;
        };
        let items: Vec<TextItem> = match self.tables.segments.get(name) {
            Some(items) if !items.is_empty() => items.to_vec(),
            _ => {
                self.logger.error(
                    &self.locater,
                    &format!("Segment '{}' has no text lines", name),
                );
                return false;
            }
        };

        self.locater.set_segment(name);
        self.locater.set_line_number(0);

        if let Some(values) = token_values {
            self.tokens.load_token_values(Some(values), &self.locater);
        }

        if control.has_pad_segment() {
            self.indent.save_current_indent_location(&self.locater);
            self.generate_segment(&control.pad_segment, None);
            self.indent.restore_current_indent_location(&mut self.locater);
        }

        if control.tab_size > 0 {
            self.indent.set_tab_size(control.tab_size, &self.locater);
        }

        let mut first_time = control.is_first_time;
        for item in &items {
            self.locater.next_line();

            let indent = if first_time {
                first_time = false;
                self.update_control(name, ControlItem::with_first_time_false);
                self.indent
                    .get_first_time_indent(control.first_time_indent, item, &self.locater)
            } else {
                self.indent.get_indent(item, &self.locater)
            };

            let text = self.tokens.replace_tokens(&item.text, &self.locater);
            self.generated.push(format!("{}{}", " ".repeat(indent), text));
        }

        debug!(segment = name, lines = items.len(), "Segment generated");
        true
    }

    fn update_control(&mut self, name: &str, update: impl FnOnce(ControlItem) -> ControlItem) {
        if let Some(control) = self.tables.controls.get_mut(name) {
            *control = update(std::mem::take(control));
        }
    }

    /// Make the next generation of `name` count as its first one again
    pub fn reset_segment(&mut self, name: &str) -> bool {
        if !self.tables.controls.contains_key(name) {
            self.logger.warning(
                &self.locater,
                &format!("Segment '{}' not found; nothing to reset", name),
            );
            return false;
        }
        self.update_control(name, ControlItem::with_first_time_reset);
        true
    }

    /// [`reset_segment`](Self::reset_segment) for every segment
    pub fn reset_all_segments(&mut self) {
        for control in self.tables.controls.values_mut() {
            *control = std::mem::take(control).with_first_time_reset();
        }
    }

    /// Clear the output buffer and start again at column 0
    pub fn reset_generated_text(&mut self) {
        self.generated.clear();
        self.reset_indent();
    }

    /// Drop the template, tokens and output
    pub fn reset_all(&mut self) {
        self.tables.clear();
        self.tokens.clear();
        self.generated.clear();
        self.locater.reset();
        self.reset_indent();
        self.loaded = false;
    }

    fn reset_indent(&mut self) {
        self.indent.reset();
        if self.tab_size != DEFAULT_TAB_SIZE {
            self.indent.set_tab_size(self.tab_size, &self.locater);
        }
    }

    /// Write the output buffer to `path`, optionally clearing it afterwards
    pub fn write_generated_text_to_file(
        &mut self,
        path: impl AsRef<Path>,
        reset_after: bool,
    ) -> Result<()> {
        let path = path.as_ref();
        if self.generated.is_empty() {
            self.logger.warning(
                &self.locater,
                &format!("No generated text to write to {}", path.display()),
            );
        }

        self.writer
            .write_lines(path, &self.generated)
            .map_err(|e| {
                self.logger.error(
                    &self.locater,
                    &format!("Cannot write generated text to {}: {}", path.display(), e),
                );
                e
            })?;
        info!(path = %path.display(), lines = self.generated.len(), "Generated text written");

        if reset_after {
            self.reset_generated_text();
        }
        Ok(())
    }

    /// Whether a template is loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Segment names in template order
    pub fn segment_names(&self) -> &[String] {
        self.tables.segments.names()
    }

    /// Text lines of a segment
    pub fn segment(&self, name: &str) -> Option<&[TextItem]> {
        self.tables.segments.get(name)
    }

    /// Options of a segment
    pub fn control_item(&self, name: &str) -> Option<&ControlItem> {
        self.tables.controls.get(name)
    }

    /// Both tables of the loaded template
    pub fn tables(&self) -> &SegmentTables {
        &self.tables
    }

    /// Token names found in the template, sorted
    pub fn token_names(&self) -> Vec<String> {
        self.tokens.token_names()
    }

    /// Current value of a token
    pub fn token_value(&self, name: &str) -> Option<&str> {
        self.tokens.token_value(name)
    }

    /// Lines generated so far
    pub fn generated_text(&self) -> &[String] {
        &self.generated
    }

    /// Current diagnostic position
    pub fn locater(&self) -> &Locater {
        &self.locater
    }

    /// Indent state
    pub fn indent(&self) -> &IndentProcessor {
        &self.indent
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
