//! Segment header decoding
//!
//! A header names a segment and may carry options:
//!
//! ```text
//! ### Name FTI=1, TAB=2 PAD=Prologue
//! ```
//!
//! Option names are case-insensitive. Items are separated by blanks or commas.

use std::{collections::HashSet, rc::Rc};

use crate::{
    diagnostics::Logger,
    models::ControlItem,
    naming::{DefaultNameGenerator, NameValidator},
    templates::{IndentProcessor, Locater},
};

/// Minimum length of a header that carries a name
const NAMED_HEADER_LEN: usize = 5;
/// Character index where the segment name starts
const NAME_COLUMN: usize = 4;

/// Header options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum HeaderOption {
    /// `FTI`: first-time indent offset
    FirstTimeIndent,
    /// `TAB`: tab size
    TabSize,
    /// `PAD`: pad segment
    PadSegment,
}

impl HeaderOption {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "FTI" => Some(HeaderOption::FirstTimeIndent),
            "TAB" => Some(HeaderOption::TabSize),
            "PAD" => Some(HeaderOption::PadSegment),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            HeaderOption::FirstTimeIndent => "FTI",
            HeaderOption::TabSize => "TAB",
            HeaderOption::PadSegment => "PAD",
        }
    }
}

/// A decoded segment header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Resolved segment name
    pub name: String,
    /// Options from the header
    pub control: ControlItem,
}

/// Decodes `###` lines into a segment name and its control item
pub struct SegmentHeaderParser {
    logger: Rc<dyn Logger>,
    validator: Rc<dyn NameValidator>,
    names: Rc<dyn DefaultNameGenerator>,
}

impl SegmentHeaderParser {
    /// Create a parser
    pub fn new(
        logger: Rc<dyn Logger>,
        validator: Rc<dyn NameValidator>,
        names: Rc<dyn DefaultNameGenerator>,
    ) -> Self {
        Self {
            logger,
            validator,
            names,
        }
    }

    /// Decode a header line.
    ///
    /// Range checks for option values go through `indent`. A missing or invalid
    /// name is replaced by a default name; pad segment existence is not checked
    /// here.
    pub fn parse(&self, line: &str, locater: &Locater, indent: &IndentProcessor) -> SegmentHeader {
        let chars: Vec<char> = line.chars().collect();

        if chars.len() < NAMED_HEADER_LEN {
            let name = self.names.next_name();
            self.logger.error(
                locater,
                &format!("Segment header has no name; using '{}'", name),
            );
            return SegmentHeader {
                name,
                control: ControlItem::default(),
            };
        }

        if chars[NAME_COLUMN].is_whitespace() {
            let name = self.names.next_name();
            self.logger.error(
                locater,
                &format!(
                    "Segment name must start in column {}; using '{}'",
                    NAME_COLUMN + 1,
                    name
                ),
            );
            return SegmentHeader {
                name,
                control: ControlItem::default(),
            };
        }

        let mut items = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|item| !item.is_empty())
            .skip(1);

        let candidate = items.next().unwrap_or_default();
        let name = if self.validator.is_valid(candidate) {
            candidate.to_string()
        } else {
            let name = self.names.next_name();
            self.logger.error(
                locater,
                &format!("Invalid segment name '{}'; using '{}'", candidate, name),
            );
            name
        };

        let control = self.parse_options(items, locater, indent);
        SegmentHeader { name, control }
    }

    fn parse_options<'a>(
        &self,
        items: impl Iterator<Item = &'a str>,
        locater: &Locater,
        indent: &IndentProcessor,
    ) -> ControlItem {
        let mut control = ControlItem::default();
        let mut seen = HashSet::new();

        for item in items {
            let Some(equals) = item.find('=') else {
                self.logger.error(
                    locater,
                    &format!("Malformed option '{}'; expected NAME=VALUE", item),
                );
                continue;
            };
            if equals == 0 {
                self.logger
                    .error(locater, &format!("Option '{}' is missing a name", item));
                continue;
            }

            let (name, value) = (&item[..equals], &item[equals + 1..]);
            let Some(option) = HeaderOption::from_name(name) else {
                self.logger
                    .error(locater, &format!("Unknown option '{}'", name));
                continue;
            };
            if value.is_empty() {
                self.logger.error(
                    locater,
                    &format!("Option '{}' is missing a value", option.name()),
                );
                continue;
            }
            if !seen.insert(option) {
                self.logger.warning(
                    locater,
                    &format!("Duplicate option '{}' ignored", option.name()),
                );
                continue;
            }

            control = match option {
                HeaderOption::FirstTimeIndent => match indent.is_valid_indent_value(value, locater) {
                    Some(offset) => {
                        if offset == 0 {
                            self.logger
                                .info(locater, "First time indent of 0 has no effect");
                        }
                        control.with_first_time_indent(offset)
                    }
                    None => control,
                },
                HeaderOption::TabSize => match indent.is_valid_tab_size_value(value, locater) {
                    Some(tab_size) => control.with_tab_size(tab_size),
                    None => control,
                },
                HeaderOption::PadSegment => {
                    if self.validator.is_valid(value) {
                        control.with_pad_segment(value)
                    } else {
                        self.logger.error(
                            locater,
                            &format!("Invalid pad segment name '{}'", value),
                        );
                        control
                    }
                }
            };
        }

        control
    }
}
