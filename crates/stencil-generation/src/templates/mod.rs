//! Segment template engine
//!
//! Provides line decoding, segment header parsing, template loading, the indent
//! state machine, token substitution and segment generation.

pub mod engine;
pub mod header_parser;
pub mod indent;
pub mod line_parser;
pub mod loader;
pub mod locater;
pub mod tokens;

// Re-export public API
pub use engine::{Collaborators, EngineSettings, TemplateEngine};
pub use header_parser::{SegmentHeader, SegmentHeaderParser};
pub use indent::{IndentProcessor, IndentSnapshot};
pub use line_parser::{LineKind, TextLineParser};
pub use loader::TemplateLoader;
pub use locater::Locater;
pub use tokens::{TokenProcessor, DEFAULT_TOKEN_END, DEFAULT_TOKEN_ESCAPE, DEFAULT_TOKEN_START};
