#![warn(missing_docs)]

//! Segment template processing for stencil
//!
//! A template is a line-oriented file made of named segments. Each text line
//! carries an indent directive and may contain `<#=token#>` placeholders.
//! Generating a segment computes the indentation of every line and substitutes
//! the token values.
//!
//! Malformed template content never fails a load or a generation: every
//! problem is reported through a [`Logger`] and replaced by a safe fallback.
//!
//! ```
//! use stencil_generation::{token_values, TemplateEngine};
//!
//! let mut engine = TemplateEngine::new();
//! engine.load_template_str("### Greeting\n@+1 Hello <#=name#>\n");
//! engine.generate_segment("Greeting", Some(&token_values([("name", "world")])));
//! assert_eq!(engine.generated_text(), &["    Hello world"]);
//! ```

pub mod diagnostics;
pub mod error;
pub mod io;
pub mod models;
pub mod naming;
pub mod templates;

// Re-export public API
pub use diagnostics::{Diagnostic, Logger, MemoryLogger, MessageKind, TracingLogger};
pub use error::{Result, TemplateError};
pub use io::{FileTextReader, FileTextWriter, TextReader, TextWriter};
pub use models::{
    token_values, ControlItem, ControlTable, SegmentTable, SegmentTables, TextItem, TokenTable,
    TokenValues, DEFAULT_TAB_SIZE,
};
pub use naming::{DefaultNameGenerator, IdentifierValidator, NameValidator, SequentialNameGenerator};
pub use templates::{
    Collaborators, EngineSettings, IndentProcessor, LineKind, Locater, SegmentHeader,
    SegmentHeaderParser, TemplateEngine, TemplateLoader, TextLineParser, TokenProcessor,
};
