//! Core data models for segment templates

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Lowest indent magnitude a text line or FTI option can carry
pub const MIN_INDENT: i32 = -9;
/// Highest indent magnitude a text line or FTI option can carry
pub const MAX_INDENT: i32 = 9;
/// Smallest accepted tab size
pub const MIN_TAB_SIZE: i32 = 1;
/// Largest accepted tab size
pub const MAX_TAB_SIZE: i32 = 9;
/// Tab size used after construction and after a reset
pub const DEFAULT_TAB_SIZE: i32 = 4;

/// One decoded template text line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    /// Indent magnitude in tab stops, always within [-9, 9]
    pub indent: i32,
    /// Whether `indent` is added to the current indent
    pub is_relative: bool,
    /// Whether the computed indent applies to this line only
    pub is_one_time: bool,
    /// Line body after the prefix
    pub text: String,
}

impl TextItem {
    /// Create a new text item
    pub fn new(indent: i32, is_relative: bool, is_one_time: bool, text: impl Into<String>) -> Self {
        Self {
            indent,
            is_relative,
            is_one_time,
            text: text.into(),
        }
    }
}

/// Per-segment generation options taken from the segment header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlItem {
    /// Indent offset (in tab stops) applied to the first line of the first generation
    pub first_time_indent: i32,
    /// Tab size override; 0 keeps the current tab size
    pub tab_size: i32,
    /// Segment generated ahead of this one; empty for none
    pub pad_segment: String,
    /// Whether the next generation is the first one
    pub is_first_time: bool,
}

impl Default for ControlItem {
    fn default() -> Self {
        Self {
            first_time_indent: 0,
            tab_size: 0,
            pad_segment: String::new(),
            is_first_time: true,
        }
    }
}

impl ControlItem {
    /// Set the first-time indent offset
    pub fn with_first_time_indent(mut self, first_time_indent: i32) -> Self {
        self.first_time_indent = first_time_indent;
        self
    }

    /// Set the tab size override
    pub fn with_tab_size(mut self, tab_size: i32) -> Self {
        self.tab_size = tab_size;
        self
    }

    /// Set the pad segment name
    pub fn with_pad_segment(mut self, pad_segment: impl Into<String>) -> Self {
        self.pad_segment = pad_segment.into();
        self
    }

    /// Drop the pad segment reference
    pub fn without_pad_segment(mut self) -> Self {
        self.pad_segment.clear();
        self
    }

    /// Mark the first generation as done
    pub fn with_first_time_false(mut self) -> Self {
        self.is_first_time = false;
        self
    }

    /// Make the next generation count as the first one again
    pub fn with_first_time_reset(mut self) -> Self {
        self.is_first_time = true;
        self
    }

    /// Whether a pad segment is set
    pub fn has_pad_segment(&self) -> bool {
        !self.pad_segment.is_empty()
    }
}

/// Segment name to its ordered text lines.
///
/// Segment names are kept in the order they were first seen so listings follow
/// the template file.
#[derive(Debug, Clone, Default)]
pub struct SegmentTable {
    segments: HashMap<String, Vec<TextItem>>,
    order: Vec<String>,
}

impl SegmentTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text item to a segment, creating the segment when needed
    pub fn push(&mut self, segment: &str, item: TextItem) {
        match self.segments.get_mut(segment) {
            Some(items) => items.push(item),
            None => {
                self.order.push(segment.to_string());
                self.segments.insert(segment.to_string(), vec![item]);
            }
        }
    }

    /// Text items of a segment
    pub fn get(&self, segment: &str) -> Option<&[TextItem]> {
        self.segments.get(segment).map(Vec::as_slice)
    }

    /// Remove a segment
    pub fn remove(&mut self, segment: &str) -> Option<Vec<TextItem>> {
        self.order.retain(|name| name != segment);
        self.segments.remove(segment)
    }

    /// Segment names in template order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Remove every segment
    pub fn clear(&mut self) {
        self.segments.clear();
        self.order.clear();
    }
}

/// Segment name to its control item
pub type ControlTable = HashMap<String, ControlItem>;

/// Token name to substitution value; an empty value means declared but unset
pub type TokenTable = HashMap<String, String>;

/// Token values handed to a generation call; `None` stands for a missing value
pub type TokenValues = HashMap<String, Option<String>>;

/// Build [`TokenValues`] from name/value pairs
pub fn token_values<I, K, V>(pairs: I) -> TokenValues
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), Some(value.into())))
        .collect()
}

/// The tables produced by one template load
#[derive(Debug, Clone, Default)]
pub struct SegmentTables {
    /// Text lines per segment
    pub segments: SegmentTable,
    /// Options per segment
    pub controls: ControlTable,
}

impl SegmentTables {
    /// Whether both tables hold the same segment names
    pub fn keys_match(&self) -> bool {
        self.segments.len() == self.controls.len()
            && self
                .segments
                .names()
                .iter()
                .all(|name| self.controls.contains_key(name))
    }

    /// Remove every segment from both tables
    pub fn clear(&mut self) {
        self.segments.clear();
        self.controls.clear();
    }
}
