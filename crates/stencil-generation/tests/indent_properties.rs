//! Property-based tests for the indent state machine
//! **Property: computed indents are never negative**
//! **Property: one-time items never move the current indent**

use proptest::prelude::*;
use std::rc::Rc;
use stencil_generation::{IndentProcessor, Locater, MemoryLogger, TextItem};

/// Strategy for decoded text items
fn item_strategy() -> impl Strategy<Value = TextItem> {
    (-9i32..=9, any::<bool>(), any::<bool>())
        .prop_map(|(indent, relative, one_time)| TextItem::new(indent, relative, one_time, ""))
}

proptest! {
    /// Property: any sequence of items yields non-negative indents and state
    #[test]
    fn prop_indent_never_negative(
        tab_size in -3i32..15,
        items in prop::collection::vec(item_strategy(), 1..20),
    ) {
        let mut indent = IndentProcessor::new(Rc::new(MemoryLogger::new()));
        let locater = Locater::new();
        indent.set_tab_size(tab_size, &locater);
        prop_assert!((1..=9).contains(&indent.tab_size()));

        for item in &items {
            let before = indent.current_indent();
            let next = indent.get_indent(item, &locater);
            prop_assert!(indent.current_indent() >= 0);
            if item.is_one_time {
                prop_assert_eq!(indent.current_indent(), before);
            } else {
                prop_assert_eq!(indent.current_indent() as usize, next);
            }
        }
    }

    /// Property: a non-zero first-time offset always persists
    #[test]
    fn prop_first_time_offset_persists(
        offset in prop::sample::select(vec![-9, -5, -1, 1, 2, 9]),
        item in item_strategy(),
    ) {
        let mut indent = IndentProcessor::new(Rc::new(MemoryLogger::new()));
        let locater = Locater::new();
        indent.get_indent(&TextItem::new(2, false, false, ""), &locater);

        let next = indent.get_first_time_indent(offset, &item, &locater);

        prop_assert_eq!(next as i32, (8 + offset * 4).max(0));
        prop_assert_eq!(indent.current_indent() as usize, next);
    }
}
