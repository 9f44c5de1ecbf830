//! Identifier validation and default segment names

use std::{cell::Cell, sync::OnceLock};

use regex::Regex;

/// Prefix of generated segment names
pub const DEFAULT_SEGMENT_PREFIX: &str = "DefaultSegment";

/// Checks segment, option and token names
pub trait NameValidator {
    /// Whether `name` is an acceptable identifier
    fn is_valid(&self, name: &str) -> bool;
}

/// Accepts a letter followed by letters, digits or underscores
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierValidator;

impl IdentifierValidator {
    fn pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("identifier pattern is valid")
        })
    }
}

impl NameValidator for IdentifierValidator {
    fn is_valid(&self, name: &str) -> bool {
        Self::pattern().is_match(name)
    }
}

/// Supplies names for segments whose header gives none (or an unusable one)
pub trait DefaultNameGenerator {
    /// Next unused default name
    fn next_name(&self) -> String;
}

/// Produces `DefaultSegment1`, `DefaultSegment2`, ...
#[derive(Debug, Default)]
pub struct SequentialNameGenerator {
    counter: Cell<usize>,
}

impl SequentialNameGenerator {
    /// Create a generator starting at 1
    pub fn new() -> Self {
        Self::default()
    }
}

impl DefaultNameGenerator for SequentialNameGenerator {
    fn next_name(&self) -> String {
        let next = self.counter.get() + 1;
        self.counter.set(next);
        format!("{}{}", DEFAULT_SEGMENT_PREFIX, next)
    }
}
