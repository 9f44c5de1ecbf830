//! Template line classification and text line decoding
//!
//! Every template line starts with a 3 character control code, optionally
//! followed by a blank and the line body from column 5:
//!
//! | code  | meaning                                   |
//! |-------|-------------------------------------------|
//! | `///` | comment                                   |
//! | `###` | segment header                            |
//! | `   ` | text, indent unchanged                    |
//! | `@=d` | text, absolute indent `d`                 |
//! | `@+d` | text, relative indent `+d`                |
//! | `@-d` | text, relative indent `-d`                |
//! | `O=d` | text, one-time absolute indent `d`        |
//! | `O+d` | text, one-time relative indent `+d`       |
//! | `O-d` | text, one-time relative indent `-d`       |

use std::rc::Rc;

use crate::{
    diagnostics::Logger,
    models::TextItem,
    templates::{Locater, TokenProcessor},
};

/// Number of characters in a control code
pub const PREFIX_LEN: usize = 3;
/// Character index where the line body starts
pub const BODY_START: usize = 4;

const COMMENT_PREFIX: &str = "///";
const HEADER_PREFIX: &str = "###";
const UNCHANGED_PREFIX: &str = "   ";

/// The shape of a template line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `///` comment line
    Comment,
    /// `###` segment header
    Header,
    /// Indented text line
    Text,
}

/// Classifies and decodes single template lines
pub struct TextLineParser {
    logger: Rc<dyn Logger>,
}

impl TextLineParser {
    /// Create a parser
    pub fn new(logger: Rc<dyn Logger>) -> Self {
        Self { logger }
    }

    /// Classify `line`, logging why it is rejected when its prefix is invalid
    pub fn classify(&self, line: &str, locater: &Locater) -> Option<LineKind> {
        let mut chars = line.chars();
        let prefix: String = chars.by_ref().take(PREFIX_LEN).collect();

        if prefix.chars().count() < PREFIX_LEN {
            self.logger.error(
                locater,
                &format!("Line is shorter than {} characters", PREFIX_LEN),
            );
            return None;
        }

        if let Some(fourth) = chars.next() {
            if !fourth.is_whitespace() {
                self.logger.error(
                    locater,
                    &format!("Character 4 must be blank, found '{}'", fourth),
                );
                return None;
            }
        }

        let kind = match prefix.as_str() {
            COMMENT_PREFIX => Some(LineKind::Comment),
            HEADER_PREFIX => Some(LineKind::Header),
            UNCHANGED_PREFIX => Some(LineKind::Text),
            _ if is_indent_code(&prefix) => Some(LineKind::Text),
            _ => None,
        };

        if kind.is_none() {
            self.logger
                .error(locater, &format!("Invalid control code '{}'", prefix));
        }
        kind
    }

    /// Whether `line` starts with a valid control code
    pub fn is_valid_prefix(&self, line: &str, locater: &Locater) -> bool {
        self.classify(line, locater).is_some()
    }

    /// Decode a text line that already passed [`classify`](Self::classify).
    ///
    /// The body is handed to the token extractor, which may escape malformed
    /// tokens in it.
    pub fn parse_text_line(
        &self,
        line: &str,
        locater: &Locater,
        tokens: &mut TokenProcessor,
    ) -> TextItem {
        let code: Vec<char> = line.chars().take(PREFIX_LEN).collect();
        let (indent, is_relative, is_one_time) = decode_indent(&code);

        let mut text: String = line.chars().skip(BODY_START).collect();
        tokens.extract_tokens(&mut text, locater);

        TextItem {
            indent,
            is_relative,
            is_one_time,
            text,
        }
    }
}

fn is_indent_code(prefix: &str) -> bool {
    let code: Vec<char> = prefix.chars().collect();
    matches!(code.as_slice(), ['@' | 'O', '=' | '+' | '-', digit] if digit.is_ascii_digit())
}

/// Returns (signed magnitude, relative, one-time) for a control code
fn decode_indent(code: &[char]) -> (i32, bool, bool) {
    match code {
        [' ', ' ', ' '] => (0, true, false),
        [mode, sign, digit] => {
            let magnitude = digit.to_digit(10).unwrap_or(0) as i32;
            let indent = if *sign == '-' { -magnitude } else { magnitude };
            (indent, *sign != '=', *mode == 'O')
        }
        _ => (0, true, false),
    }
}
