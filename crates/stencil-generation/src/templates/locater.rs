//! Template position cursor used to attribute diagnostics

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current (segment, line) position while loading or generating.
///
/// During loading `line_number` is the 1-based line of the template file;
/// during generation it is the 1-based line within the segment being generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locater {
    segment: String,
    line_number: usize,
}

impl Locater {
    /// Create a cursor with no segment at line 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cursor at a given position
    pub fn at(segment: impl Into<String>, line_number: usize) -> Self {
        Self {
            segment: segment.into(),
            line_number,
        }
    }

    /// Name of the current segment; empty before the first header
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Current line number
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Move to another segment
    pub fn set_segment(&mut self, segment: impl Into<String>) {
        self.segment = segment.into();
    }

    /// Move to another line
    pub fn set_line_number(&mut self, line_number: usize) {
        self.line_number = line_number;
    }

    /// Advance to the next line and return it
    pub fn next_line(&mut self) -> usize {
        self.line_number += 1;
        self.line_number
    }

    /// Whether a segment is open
    pub fn has_segment(&self) -> bool {
        !self.segment.is_empty()
    }

    /// Return to the initial position
    pub fn reset(&mut self) {
        self.segment.clear();
        self.line_number = 0;
    }
}

impl fmt::Display for Locater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segment.is_empty() {
            write!(f, "line {}", self.line_number)
        } else {
            write!(f, "segment '{}', line {}", self.segment, self.line_number)
        }
    }
}
