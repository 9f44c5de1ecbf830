//! Token extraction and substitution
//!
//! A token is a name wrapped in a start and end delimiter, `<#=name#>` by
//! default. A start delimiter directly preceded by the escape character is
//! literal text. Malformed tokens are neutralised by inserting the escape
//! character in front of them, so they survive generation as plain text.

use std::rc::Rc;

use crate::{
    diagnostics::{Logger, MessageKind},
    models::{TokenTable, TokenValues},
    naming::NameValidator,
    templates::Locater,
};

/// Default token start delimiter
pub const DEFAULT_TOKEN_START: &str = "<#=";
/// Default token end delimiter
pub const DEFAULT_TOKEN_END: &str = "#>";
/// Default escape character
pub const DEFAULT_TOKEN_ESCAPE: char = '\\';

/// A well-formed token found by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
struct TokenMatch {
    /// Byte offset of the start delimiter
    start: usize,
    /// Byte offset just past the end delimiter
    end: usize,
    /// Trimmed token name
    name: String,
}

/// Extracts token names while loading and substitutes values while generating
pub struct TokenProcessor {
    logger: Rc<dyn Logger>,
    validator: Rc<dyn NameValidator>,
    start: String,
    end: String,
    escape: char,
    tokens: TokenTable,
}

impl TokenProcessor {
    /// Create a processor with the default delimiters
    pub fn new(logger: Rc<dyn Logger>, validator: Rc<dyn NameValidator>) -> Self {
        Self {
            logger,
            validator,
            start: DEFAULT_TOKEN_START.to_string(),
            end: DEFAULT_TOKEN_END.to_string(),
            escape: DEFAULT_TOKEN_ESCAPE,
            tokens: TokenTable::new(),
        }
    }

    /// Current start delimiter
    pub fn start_delimiter(&self) -> &str {
        &self.start
    }

    /// Current end delimiter
    pub fn end_delimiter(&self) -> &str {
        &self.end
    }

    /// Current escape character
    pub fn escape_char(&self) -> char {
        self.escape
    }

    /// Replace the delimiters.
    ///
    /// Start and end must be non-blank and start, end and the escape character
    /// must all differ. Every failing condition is logged; on failure the
    /// previous delimiters stay in effect.
    pub fn set_token_delimiters(&mut self, start: &str, end: &str, escape: char) -> bool {
        let escape_text = escape.to_string();
        let mut valid = true;

        if start.trim().is_empty() {
            self.reject("Token start delimiter is blank");
            valid = false;
        }
        if end.trim().is_empty() {
            self.reject("Token end delimiter is blank");
            valid = false;
        }
        if escape.is_whitespace() {
            self.reject("Token escape character is blank");
            valid = false;
        }
        if start == end {
            self.reject(&format!(
                "Token start and end delimiters are both '{}'",
                start
            ));
            valid = false;
        }
        if start == escape_text {
            self.reject(&format!(
                "Token start delimiter '{}' equals the escape character",
                start
            ));
            valid = false;
        }
        if end == escape_text {
            self.reject(&format!(
                "Token end delimiter '{}' equals the escape character",
                end
            ));
            valid = false;
        }

        if valid {
            self.start = start.to_string();
            self.end = end.to_string();
            self.escape = escape;
        }
        valid
    }

    fn reject(&self, message: &str) {
        self.logger.log(
            MessageKind::Error,
            None,
            &format!("{}; keeping previous delimiters", message),
        );
    }

    /// Register every well-formed token of `text` with an empty value.
    ///
    /// Malformed tokens are escaped in place; well-formed token text is left
    /// untouched. A name that is already registered keeps its value.
    pub fn extract_tokens(&mut self, text: &mut String, locater: &Locater) {
        let mut cursor = 0;
        while let Some(token) = self.next_token(text, cursor, locater) {
            cursor = token.end;
            self.tokens.entry(token.name).or_default();
        }
    }

    /// Substitute token values into `text`.
    ///
    /// Tokens whose name is not registered are left as they are. Escapes in
    /// front of start delimiters are removed afterwards, so escaped tokens come
    /// out as literal token syntax.
    pub fn replace_tokens(&self, text: &str, locater: &Locater) -> String {
        let mut result = text.to_string();
        let mut cursor = 0;

        while let Some(token) = self.next_token(&mut result, cursor, locater) {
            match self.tokens.get(&token.name) {
                Some(value) => {
                    if value.is_empty() {
                        self.logger.warning(
                            locater,
                            &format!("Token '{}' value is empty", token.name),
                        );
                    }
                    result.replace_range(token.start..token.end, value);
                    cursor = token.start + value.len();
                }
                None => {
                    self.logger.error(
                        locater,
                        &format!("Token name '{}' not found", token.name),
                    );
                    cursor = token.end;
                }
            }
        }

        let escaped_start = format!("{}{}", self.escape, self.start);
        result.replace(&escaped_start, &self.start)
    }

    /// Store values for registered tokens
    pub fn load_token_values(&mut self, values: Option<&TokenValues>, locater: &Locater) {
        let Some(values) = values else {
            self.logger.warning(locater, "Token values are missing");
            return;
        };
        if values.is_empty() {
            self.logger.warning(locater, "Token values are empty");
            return;
        }

        let mut names: Vec<&String> = values.keys().collect();
        names.sort();

        for name in names {
            if !self.validator.is_valid(name) {
                self.logger
                    .error(locater, &format!("Invalid token name '{}'", name));
                continue;
            }
            let Some(slot) = self.tokens.get_mut(name.as_str()) else {
                self.logger
                    .warning(locater, &format!("Unknown token name '{}'", name));
                continue;
            };
            match values.get(name).and_then(Option::as_deref) {
                None => {
                    self.logger.warning(
                        locater,
                        &format!("Token '{}' value is missing; using empty value", name),
                    );
                    slot.clear();
                }
                Some("") => {
                    self.logger
                        .info(locater, &format!("Token '{}' value is empty", name));
                    slot.clear();
                }
                Some(value) => *slot = value.to_string(),
            }
        }
    }

    /// Registered token names, sorted
    pub fn token_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tokens.keys().cloned().collect();
        names.sort();
        names
    }

    /// Value of a registered token
    pub fn token_value(&self, name: &str) -> Option<&str> {
        self.tokens.get(name).map(String::as_str)
    }

    /// The token table
    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    /// Forget every registered token
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Find the next well-formed token at or after `cursor`, escaping any
    /// malformed token met on the way.
    fn next_token(&self, text: &mut String, mut cursor: usize, locater: &Locater) -> Option<TokenMatch> {
        loop {
            let start = self.find_start(text, cursor)?;
            let name_start = start + self.start.len();

            let Some(offset) = text[name_start..].find(&self.end) else {
                self.logger.error(
                    locater,
                    &format!("Token is missing end delimiter '{}'", self.end),
                );
                cursor = self.escape_at(text, start);
                continue;
            };

            let name_end = name_start + offset;
            let name = text[name_start..name_end].trim();
            if name.is_empty() {
                self.logger.error(locater, "Token is missing token name");
                cursor = self.escape_at(text, start);
                continue;
            }
            if !self.validator.is_valid(name) {
                let message = format!("Invalid token name '{}'", name);
                self.logger.error(locater, &message);
                cursor = self.escape_at(text, start);
                continue;
            }

            return Some(TokenMatch {
                start,
                end: name_end + self.end.len(),
                name: name.to_string(),
            });
        }
    }

    /// Offset of the next start delimiter not preceded by the escape character.
    ///
    /// Only an escape at or after `cursor` counts; anything before it belongs to
    /// text that was already scanned or substituted.
    fn find_start(&self, text: &str, cursor: usize) -> Option<usize> {
        let mut from = cursor;
        loop {
            let position = from + text.get(from..)?.find(&self.start)?;
            if position > cursor && text[..position].ends_with(self.escape) {
                from = position + self.start.len();
                continue;
            }
            return Some(position);
        }
    }

    /// Escape the start delimiter at `position`, returning the offset to resume at
    fn escape_at(&self, text: &mut String, position: usize) -> usize {
        text.insert(position, self.escape);
        position + self.escape.len_utf8() + self.start.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diagnostics::MemoryLogger, models::token_values, naming::IdentifierValidator};

    fn processor() -> (TokenProcessor, MemoryLogger) {
        let logger = MemoryLogger::new();
        let processor = TokenProcessor::new(Rc::new(logger.clone()), Rc::new(IdentifierValidator));
        (processor, logger)
    }

    fn here() -> Locater {
        Locater::at("Body", 1)
    }

    #[test]
    fn test_extract_registers_names_once() {
        let (mut processor, logger) = processor();
        let mut text = "<#=name#> and <#= name #> and <#=other#>".to_string();

        processor.extract_tokens(&mut text, &here());

        assert_eq!(processor.token_names(), vec!["name", "other"]);
        assert_eq!(processor.token_value("name"), Some(""));
        assert_eq!(text, "<#=name#> and <#= name #> and <#=other#>");
        assert!(logger.is_empty());
    }

    #[test]
    fn test_extract_keeps_existing_value() {
        let (mut processor, _) = processor();
        let mut text = "<#=name#>".to_string();
        processor.extract_tokens(&mut text, &here());
        processor.load_token_values(Some(&token_values([("name", "kept")])), &here());

        processor.extract_tokens(&mut text, &here());
        assert_eq!(processor.token_value("name"), Some("kept"));
    }

    #[test]
    fn test_missing_end_delimiter_is_escaped() {
        let (mut processor, logger) = processor();
        let mut text = "value <#=name".to_string();

        processor.extract_tokens(&mut text, &here());

        assert_eq!(text, "value \\<#=name");
        assert!(logger.contains("missing end delimiter"));
        assert!(processor.token_names().is_empty());
    }

    #[test]
    fn test_missing_token_name_is_escaped() {
        let (mut processor, logger) = processor();
        let mut text = "a <#=  #> b".to_string();

        processor.extract_tokens(&mut text, &here());

        assert_eq!(text, "a \\<#=  #> b");
        assert!(logger.contains("missing token name"));
    }

    #[test]
    fn test_invalid_token_name_is_escaped() {
        let (mut processor, logger) = processor();
        let mut text = "<#=9lives#> <#=ok#>".to_string();

        processor.extract_tokens(&mut text, &here());

        assert_eq!(text, "\\<#=9lives#> <#=ok#>");
        assert!(logger.contains("Invalid token name '9lives'"));
        assert_eq!(processor.token_names(), vec!["ok"]);
    }

    #[test]
    fn test_escaped_token_is_not_extracted() {
        let (mut processor, logger) = processor();
        let mut text = "\\<#=name#>".to_string();

        processor.extract_tokens(&mut text, &here());

        assert!(processor.token_names().is_empty());
        assert_eq!(text, "\\<#=name#>");
        assert!(logger.is_empty());
    }

    #[test]
    fn test_replace_substitutes_values() {
        let (mut processor, _) = processor();
        let original = "let <#=name#> = <#= value #>; // <#=name#>";
        let mut text = original.to_string();
        processor.extract_tokens(&mut text, &here());
        processor.load_token_values(
            Some(&token_values([("name", "count"), ("value", "42")])),
            &here(),
        );

        let result = processor.replace_tokens(original, &here());
        assert_eq!(result, "let count = 42; // count");
    }

    #[test]
    fn test_replace_empty_value_logs_and_removes() {
        let (mut processor, logger) = processor();
        let mut text = "[<#=name#>]".to_string();
        processor.extract_tokens(&mut text, &here());

        let result = processor.replace_tokens(&text, &here());

        assert_eq!(result, "[]");
        assert!(logger.contains("value is empty"));
    }

    #[test]
    fn test_replace_unknown_name_is_left_in_place() {
        let (processor, logger) = processor();

        let result = processor.replace_tokens("x <#=ghost#> y", &here());

        assert_eq!(result, "x <#=ghost#> y");
        assert!(logger.contains("Token name 'ghost' not found"));
    }

    #[test]
    fn test_replace_strips_escapes() {
        let (processor, _) = processor();

        let once = processor.replace_tokens("a \\<#=x#> b", &here());
        assert_eq!(once, "a <#=x#> b");

        let twice = processor.replace_tokens(&once, &here());
        assert_eq!(twice, once);
    }

    #[test]
    fn test_value_containing_start_delimiter_is_not_rescanned() {
        let (mut processor, _) = processor();
        let mut text = "<#=a#><#=b#>".to_string();
        processor.extract_tokens(&mut text, &here());
        processor.load_token_values(
            Some(&token_values([("a", "<#=b#>"), ("b", "B")])),
            &here(),
        );

        let result = processor.replace_tokens(&text, &here());
        assert_eq!(result, "<#=b#>B");
    }

    #[test]
    fn test_load_token_values_fallbacks() {
        let (mut processor, logger) = processor();
        let mut text = "<#=a#> <#=b#> <#=c#>".to_string();
        processor.extract_tokens(&mut text, &here());

        let mut values = TokenValues::new();
        values.insert("a".to_string(), None);
        values.insert("b".to_string(), Some(String::new()));
        values.insert("c".to_string(), Some("C".to_string()));
        values.insert("d".to_string(), Some("D".to_string()));
        values.insert("1bad".to_string(), Some("X".to_string()));
        processor.load_token_values(Some(&values), &here());

        assert_eq!(processor.token_value("a"), Some(""));
        assert_eq!(processor.token_value("b"), Some(""));
        assert_eq!(processor.token_value("c"), Some("C"));
        assert_eq!(processor.token_value("d"), None);
        assert!(logger.contains("Token 'a' value is missing"));
        assert!(logger.contains("Token 'b' value is empty"));
        assert!(logger.contains("Unknown token name 'd'"));
        assert!(logger.contains("Invalid token name '1bad'"));
    }

    #[test]
    fn test_load_token_values_missing_or_empty_map() {
        let (mut processor, logger) = processor();

        processor.load_token_values(None, &here());
        processor.load_token_values(Some(&TokenValues::new()), &here());

        assert!(logger.contains("Token values are missing"));
        assert!(logger.contains("Token values are empty"));
    }

    #[test]
    fn test_set_token_delimiters() {
        let (mut processor, _) = processor();
        assert!(processor.set_token_delimiters("${", "}", '^'));

        let mut text = "${name} ^${skip}".to_string();
        processor.extract_tokens(&mut text, &here());
        processor.load_token_values(Some(&token_values([("name", "v")])), &here());

        assert_eq!(processor.replace_tokens(&text, &here()), "v ${skip}");
    }

    #[test]
    fn test_set_token_delimiters_rejects_conflicts() {
        let (mut processor, logger) = processor();

        assert!(!processor.set_token_delimiters("", "#>", '\\'));
        assert!(!processor.set_token_delimiters("  ", "#>", '\\'));
        assert!(!processor.set_token_delimiters("##", "##", '\\'));
        assert!(!processor.set_token_delimiters("%", "#>", '%'));
        assert!(!processor.set_token_delimiters("<#=", "%", '%'));

        assert_eq!(processor.start_delimiter(), DEFAULT_TOKEN_START);
        assert_eq!(processor.end_delimiter(), DEFAULT_TOKEN_END);
        assert_eq!(processor.escape_char(), DEFAULT_TOKEN_ESCAPE);
        assert!(logger.contains("start delimiter is blank"));
        assert!(logger.contains("both '##'"));
        assert!(logger.contains("start delimiter '%' equals the escape character"));
        assert!(logger.contains("end delimiter '%' equals the escape character"));
    }
}
