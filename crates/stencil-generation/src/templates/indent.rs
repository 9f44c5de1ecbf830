//! Indent state machine used during generation

use std::rc::Rc;

use crate::{
    diagnostics::Logger,
    models::{TextItem, DEFAULT_TAB_SIZE, MAX_INDENT, MAX_TAB_SIZE, MIN_INDENT, MIN_TAB_SIZE},
    templates::Locater,
};

/// Saved indent state together with the template position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentSnapshot {
    /// Current indent in columns
    pub indent: i32,
    /// Tab size in columns
    pub tab_size: i32,
    /// Segment being generated
    pub segment: String,
    /// Line within that segment
    pub line_number: usize,
}

/// Computes the column of each generated line.
///
/// Holds a single save slot: saving twice before a restore overwrites the
/// first snapshot.
pub struct IndentProcessor {
    logger: Rc<dyn Logger>,
    current_indent: i32,
    tab_size: i32,
    saved: Option<IndentSnapshot>,
}

impl IndentProcessor {
    /// Create a processor at column 0 with the default tab size
    pub fn new(logger: Rc<dyn Logger>) -> Self {
        Self {
            logger,
            current_indent: 0,
            tab_size: DEFAULT_TAB_SIZE,
            saved: None,
        }
    }

    /// Current indent in columns
    pub fn current_indent(&self) -> i32 {
        self.current_indent
    }

    /// Current tab size in columns
    pub fn tab_size(&self) -> i32 {
        self.tab_size
    }

    /// The saved snapshot, if any
    pub fn saved(&self) -> Option<&IndentSnapshot> {
        self.saved.as_ref()
    }

    /// Indent for `item`; persistent items also move the current indent
    pub fn get_indent(&mut self, item: &TextItem, locater: &Locater) -> usize {
        let step = item.indent * self.tab_size;
        let next = if item.is_relative {
            self.current_indent + step
        } else {
            step
        };
        let next = self.truncate(next, locater);

        if !item.is_one_time {
            self.current_indent = next;
        }
        next as usize
    }

    /// Indent for the first line of a segment's first generation.
    ///
    /// A zero `offset` behaves like [`get_indent`](Self::get_indent). Any other
    /// offset ignores the item's own indent fields and always becomes the new
    /// current indent, even for a one-time item.
    pub fn get_first_time_indent(&mut self, offset: i32, item: &TextItem, locater: &Locater) -> usize {
        if offset == 0 {
            return self.get_indent(item, locater);
        }

        let next = self.truncate(self.current_indent + offset * self.tab_size, locater);
        self.current_indent = next;
        next as usize
    }

    fn truncate(&self, indent: i32, locater: &Locater) -> i32 {
        if indent < 0 {
            self.logger.warning(
                locater,
                &format!("Indent {} is negative; truncated to 0", indent),
            );
            0
        } else {
            indent
        }
    }

    /// Set the tab size, clamping it to [1, 9]
    pub fn set_tab_size(&mut self, tab_size: i32, locater: &Locater) {
        self.tab_size = if tab_size < MIN_TAB_SIZE {
            self.logger.warning(
                locater,
                &format!(
                    "Tab size {} is too small; using {}",
                    tab_size, MIN_TAB_SIZE
                ),
            );
            MIN_TAB_SIZE
        } else if tab_size > MAX_TAB_SIZE {
            self.logger.warning(
                locater,
                &format!(
                    "Tab size {} is too large; using {}",
                    tab_size, MAX_TAB_SIZE
                ),
            );
            MAX_TAB_SIZE
        } else {
            tab_size
        };
    }

    /// Parse an indent value in [-9, 9]
    pub fn is_valid_indent_value(&self, value: &str, locater: &Locater) -> Option<i32> {
        self.parse_in_range(value, MIN_INDENT, MAX_INDENT, "Indent", locater)
    }

    /// Parse a tab size value in [1, 9]
    pub fn is_valid_tab_size_value(&self, value: &str, locater: &Locater) -> Option<i32> {
        self.parse_in_range(value, MIN_TAB_SIZE, MAX_TAB_SIZE, "Tab size", locater)
    }

    fn parse_in_range(
        &self,
        value: &str,
        min: i32,
        max: i32,
        what: &str,
        locater: &Locater,
    ) -> Option<i32> {
        let Ok(parsed) = value.trim().parse::<i32>() else {
            self.logger.error(
                locater,
                &format!("{} value '{}' is not a number", what, value),
            );
            return None;
        };

        if !(min..=max).contains(&parsed) {
            self.logger.error(
                locater,
                &format!(
                    "{} value {} is out of range [{}, {}]",
                    what, parsed, min, max
                ),
            );
            return None;
        }
        Some(parsed)
    }

    /// Remember the indent state and position, replacing any earlier snapshot
    pub fn save_current_indent_location(&mut self, locater: &Locater) {
        self.saved = Some(IndentSnapshot {
            indent: self.current_indent,
            tab_size: self.tab_size,
            segment: locater.segment().to_string(),
            line_number: locater.line_number(),
        });
    }

    /// Return to the saved state; does nothing when no snapshot is held
    pub fn restore_current_indent_location(&mut self, locater: &mut Locater) -> bool {
        let Some(snapshot) = self.saved.take() else {
            return false;
        };
        self.current_indent = snapshot.indent;
        self.tab_size = snapshot.tab_size;
        locater.set_segment(snapshot.segment);
        locater.set_line_number(snapshot.line_number);
        true
    }

    /// Back to column 0 with the default tab size
    pub fn reset(&mut self) {
        self.current_indent = 0;
        self.tab_size = DEFAULT_TAB_SIZE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemoryLogger;

    fn processor() -> (IndentProcessor, MemoryLogger) {
        let logger = MemoryLogger::new();
        (IndentProcessor::new(Rc::new(logger.clone())), logger)
    }

    fn here() -> Locater {
        Locater::at("Body", 1)
    }

    #[test]
    fn test_relative_persistent_indent() {
        let (mut indent, _) = processor();
        let item = TextItem::new(1, true, false, "x");

        assert_eq!(indent.get_indent(&item, &here()), 4);
        assert_eq!(indent.get_indent(&item, &here()), 8);
        assert_eq!(indent.current_indent(), 8);
    }

    #[test]
    fn test_absolute_indent() {
        let (mut indent, _) = processor();
        indent.current_indent = 12;

        let item = TextItem::new(2, false, false, "x");
        assert_eq!(indent.get_indent(&item, &here()), 8);
        assert_eq!(indent.current_indent(), 8);
    }

    #[test]
    fn test_one_time_indent_does_not_persist() {
        let (mut indent, _) = processor();
        indent.current_indent = 4;

        let item = TextItem::new(2, true, true, "x");
        assert_eq!(indent.get_indent(&item, &here()), 12);
        assert_eq!(indent.current_indent(), 4);

        let item = TextItem::new(0, false, true, "x");
        assert_eq!(indent.get_indent(&item, &here()), 0);
        assert_eq!(indent.current_indent(), 4);
    }

    #[test]
    fn test_negative_indent_is_truncated() {
        let (mut indent, logger) = processor();
        indent.current_indent = 4;

        let item = TextItem::new(-2, true, false, "x");
        assert_eq!(indent.get_indent(&item, &here()), 0);
        assert_eq!(indent.current_indent(), 0);
        assert!(logger.contains("truncated"));
    }

    #[test]
    fn test_first_time_indent_overrides_one_time_item() {
        let (mut indent, _) = processor();
        indent.current_indent = 8;

        let item = TextItem::new(-3, false, true, "x");
        assert_eq!(indent.get_first_time_indent(1, &item, &here()), 12);
        assert_eq!(indent.current_indent(), 12);
    }

    #[test]
    fn test_first_time_indent_zero_delegates() {
        let (mut indent, _) = processor();
        indent.current_indent = 8;

        let item = TextItem::new(1, true, true, "x");
        assert_eq!(indent.get_first_time_indent(0, &item, &here()), 12);
        assert_eq!(indent.current_indent(), 8);
    }

    #[test]
    fn test_first_time_indent_truncates() {
        let (mut indent, logger) = processor();
        indent.current_indent = 4;

        let item = TextItem::new(0, true, false, "x");
        assert_eq!(indent.get_first_time_indent(-3, &item, &here()), 0);
        assert_eq!(indent.current_indent(), 0);
        assert!(logger.contains("truncated"));
    }

    #[test]
    fn test_set_tab_size_clamps() {
        let (mut indent, logger) = processor();

        indent.set_tab_size(0, &here());
        assert_eq!(indent.tab_size(), 1);
        assert!(logger.contains("too small"));

        indent.set_tab_size(15, &here());
        assert_eq!(indent.tab_size(), 9);
        assert!(logger.contains("too large"));

        logger.clear();
        indent.set_tab_size(2, &here());
        assert_eq!(indent.tab_size(), 2);
        assert!(logger.is_empty());
    }

    #[test]
    fn test_value_range_checks() {
        let (indent, logger) = processor();

        assert_eq!(indent.is_valid_indent_value("-9", &here()), Some(-9));
        assert_eq!(indent.is_valid_indent_value("9", &here()), Some(9));
        assert_eq!(indent.is_valid_indent_value("10", &here()), None);
        assert_eq!(indent.is_valid_indent_value("abc", &here()), None);
        assert_eq!(indent.is_valid_tab_size_value("1", &here()), Some(1));
        assert_eq!(indent.is_valid_tab_size_value("0", &here()), None);

        assert!(logger.contains("out of range [-9, 9]"));
        assert!(logger.contains("'abc' is not a number"));
        assert!(logger.contains("out of range [1, 9]"));
    }

    #[test]
    fn test_save_and_restore() {
        let (mut indent, _) = processor();
        let mut locater = Locater::at("Host", 3);
        indent.current_indent = 8;
        assert!(indent.saved().is_none());
        indent.save_current_indent_location(&locater);
        assert_eq!(
            indent.saved(),
            Some(&IndentSnapshot {
                indent: 8,
                tab_size: 4,
                segment: "Host".to_string(),
                line_number: 3,
            })
        );

        indent.current_indent = 20;
        indent.set_tab_size(2, &locater);
        locater.set_segment("Pad");
        locater.set_line_number(7);

        assert!(indent.restore_current_indent_location(&mut locater));
        assert_eq!(indent.current_indent(), 8);
        assert_eq!(indent.tab_size(), 4);
        assert_eq!(locater, Locater::at("Host", 3));
        assert!(indent.saved().is_none());

        assert!(!indent.restore_current_indent_location(&mut locater));
    }

    #[test]
    fn test_second_save_overwrites_first() {
        let (mut indent, _) = processor();
        let mut locater = Locater::at("A", 1);
        indent.current_indent = 4;
        indent.save_current_indent_location(&locater);

        indent.current_indent = 16;
        indent.save_current_indent_location(&Locater::at("B", 2));
        assert_eq!(indent.saved().map(|snapshot| snapshot.indent), Some(16));

        indent.current_indent = 0;
        indent.restore_current_indent_location(&mut locater);
        assert_eq!(indent.current_indent(), 16);
        assert_eq!(locater, Locater::at("B", 2));
    }

    #[test]
    fn test_reset() {
        let (mut indent, _) = processor();
        indent.current_indent = 12;
        indent.set_tab_size(2, &here());

        indent.reset();
        assert_eq!(indent.current_indent(), 0);
        assert_eq!(indent.tab_size(), DEFAULT_TAB_SIZE);
    }
}
