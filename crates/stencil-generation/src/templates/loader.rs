//! Template loading
//!
//! Builds the segment and control tables in a single pass over the template
//! lines. Problems are logged and repaired locally so a load always finishes.

use std::{collections::HashSet, rc::Rc};

use crate::{
    diagnostics::Logger,
    models::{ControlItem, ControlTable, SegmentTables},
    naming::{DefaultNameGenerator, NameValidator},
    templates::{
        header_parser::{SegmentHeader, SegmentHeaderParser},
        line_parser::{LineKind, TextLineParser},
        IndentProcessor, Locater, TokenProcessor,
    },
};

/// Per-load bookkeeping
#[derive(Default)]
struct LoadState {
    tables: SegmentTables,
    /// Text lines seen for the open segment
    line_count: usize,
    /// Segments whose pad reference was accepted
    pad_hosts: HashSet<String>,
}

/// Builds [`SegmentTables`] from template lines
pub struct TemplateLoader {
    logger: Rc<dyn Logger>,
    names: Rc<dyn DefaultNameGenerator>,
    line_parser: TextLineParser,
    header_parser: SegmentHeaderParser,
}

impl TemplateLoader {
    /// Create a loader
    pub fn new(
        logger: Rc<dyn Logger>,
        validator: Rc<dyn NameValidator>,
        names: Rc<dyn DefaultNameGenerator>,
    ) -> Self {
        Self {
            line_parser: TextLineParser::new(logger.clone()),
            header_parser: SegmentHeaderParser::new(logger.clone(), validator, names.clone()),
            logger,
            names,
        }
    }

    /// Load `lines` into fresh tables.
    ///
    /// `locater` follows the file position; tokens found in text lines are
    /// registered in `tokens`.
    pub fn load<S: AsRef<str>>(
        &self,
        lines: &[S],
        locater: &mut Locater,
        indent: &IndentProcessor,
        tokens: &mut TokenProcessor,
    ) -> SegmentTables {
        let mut state = LoadState::default();
        locater.reset();

        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            locater.set_line_number(index + 1);

            match self.line_parser.classify(line, locater) {
                None => {
                    if !locater.has_segment() {
                        self.open_default_segment(&mut state, locater);
                    }
                }
                Some(LineKind::Comment) => {}
                Some(LineKind::Header) => {
                    self.close_segment(&mut state, locater);
                    let header = self.header_parser.parse(line, locater, indent);
                    self.open_segment(&mut state, header, locater);
                }
                Some(LineKind::Text) => {
                    if !locater.has_segment() {
                        self.open_default_segment(&mut state, locater);
                    }
                    let item = self.line_parser.parse_text_line(line, locater, tokens);
                    state.tables.segments.push(locater.segment(), item);
                    state.line_count += 1;
                }
            }
        }

        self.close_segment(&mut state, locater);
        state.tables
    }

    fn open_segment(&self, state: &mut LoadState, header: SegmentHeader, locater: &mut Locater) {
        let SegmentHeader { mut name, control } = header;

        if state.tables.controls.contains_key(&name) {
            let replacement = self.unique_default_name(&state.tables.controls);
            self.logger.error(
                locater,
                &format!("Duplicate segment name '{}'; using '{}'", name, replacement),
            );
            name = replacement;
        }

        locater.set_segment(name.as_str());
        let control = self.resolve_pad_segment(state, &name, control, locater);
        if control.has_pad_segment() {
            state.pad_hosts.insert(name.clone());
        }

        state.tables.controls.insert(name.clone(), control);
        state.line_count = 0;
        self.logger
            .info(locater, &format!("Segment '{}' added", name));
    }

    fn open_default_segment(&self, state: &mut LoadState, locater: &mut Locater) {
        let name = self.unique_default_name(&state.tables.controls);
        self.logger.warning(
            locater,
            &format!("Missing initial segment header; using '{}'", name),
        );
        state
            .tables
            .controls
            .insert(name.clone(), ControlItem::default());
        state.line_count = 0;
        locater.set_segment(name);
    }

    /// Discard the open segment when no text line followed its header
    fn close_segment(&self, state: &mut LoadState, locater: &Locater) {
        if !locater.has_segment() || state.line_count > 0 {
            return;
        }

        let name = locater.segment();
        self.logger.warning(
            locater,
            &format!("No text lines following header of segment '{}'; segment discarded", name),
        );
        state.tables.controls.remove(name);
        state.tables.segments.remove(name);
        state.pad_hosts.remove(name);
    }

    fn resolve_pad_segment(
        &self,
        state: &LoadState,
        name: &str,
        control: ControlItem,
        locater: &Locater,
    ) -> ControlItem {
        if !control.has_pad_segment() {
            return control;
        }

        let pad = control.pad_segment.as_str();
        let problem = if pad == name {
            Some(format!("Segment '{}' cannot use itself as pad segment", name))
        } else {
            match state.tables.controls.get(pad) {
                None => Some(format!(
                    "Pad segment '{}' must be defined earlier in the template",
                    pad
                )),
                Some(target) if target.has_pad_segment() && state.pad_hosts.contains(pad) => {
                    Some(format!(
                        "Pad segment '{}' has its own pad segment '{}'; multiple levels of pad segments are not supported",
                        pad, target.pad_segment
                    ))
                }
                Some(_) => None,
            }
        };

        match problem {
            Some(message) => {
                self.logger.error(locater, &message);
                control.without_pad_segment()
            }
            None => control,
        }
    }

    fn unique_default_name(&self, controls: &ControlTable) -> String {
        loop {
            let name = self.names.next_name();
            if !controls.contains_key(&name) {
                return name;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::MemoryLogger,
        models::TextItem,
        naming::{IdentifierValidator, SequentialNameGenerator},
    };

    struct Fixture {
        loader: TemplateLoader,
        indent: IndentProcessor,
        tokens: TokenProcessor,
        locater: Locater,
        logger: MemoryLogger,
    }

    impl Fixture {
        fn new() -> Self {
            let logger = MemoryLogger::new();
            let shared: Rc<dyn Logger> = Rc::new(logger.clone());
            let validator: Rc<dyn NameValidator> = Rc::new(IdentifierValidator);
            Self {
                loader: TemplateLoader::new(
                    shared.clone(),
                    validator.clone(),
                    Rc::new(SequentialNameGenerator::new()),
                ),
                indent: IndentProcessor::new(shared.clone()),
                tokens: TokenProcessor::new(shared, validator),
                locater: Locater::new(),
                logger,
            }
        }

        fn load(&mut self, template: &str) -> SegmentTables {
            let lines: Vec<&str> = template.lines().collect();
            self.loader
                .load(&lines, &mut self.locater, &self.indent, &mut self.tokens)
        }
    }

    #[test]
    fn test_load_segments() {
        let mut fixture = Fixture::new();
        let tables = fixture.load(
            "/// sample\n### First TAB=2\n@+1 one\n    two\n### Second\nO=0 three\n",
        );

        assert_eq!(tables.segments.names(), &["First".to_string(), "Second".to_string()]);
        assert_eq!(
            tables.segments.get("First").unwrap(),
            &[
                TextItem::new(1, true, false, "one"),
                TextItem::new(0, true, false, "two"),
            ]
        );
        assert_eq!(tables.controls["First"].tab_size, 2);
        assert!(tables.keys_match());
        assert!(fixture.logger.contains("Segment 'First' added"));
    }

    #[test]
    fn test_missing_initial_header() {
        let mut fixture = Fixture::new();
        let tables = fixture.load("    orphan\n### Named\n    text\n");

        assert_eq!(
            tables.segments.names(),
            &["DefaultSegment1".to_string(), "Named".to_string()]
        );
        assert_eq!(tables.controls["DefaultSegment1"], ControlItem::default());
        assert!(fixture.logger.contains("Missing initial segment header"));
    }

    #[test]
    fn test_empty_segment_is_discarded() {
        let mut fixture = Fixture::new();
        let tables = fixture.load("### Empty\n/// only a comment\n### Full\n    x\n### Trailing\n");

        assert_eq!(tables.segments.names(), &["Full".to_string()]);
        assert!(!tables.controls.contains_key("Empty"));
        assert!(!tables.controls.contains_key("Trailing"));
        assert!(tables.keys_match());
        assert!(fixture.logger.contains("segment 'Empty'; segment discarded"));
        assert!(fixture.logger.contains("segment 'Trailing'; segment discarded"));
    }

    #[test]
    fn test_duplicate_segment_name() {
        let mut fixture = Fixture::new();
        let tables = fixture.load("### Seg\n    a\n### Seg\n    b\n");

        assert_eq!(
            tables.segments.names(),
            &["Seg".to_string(), "DefaultSegment1".to_string()]
        );
        assert_eq!(tables.segments.get("DefaultSegment1").unwrap()[0].text, "b");
        assert!(fixture.logger.contains("Duplicate segment name 'Seg'"));
    }

    #[test]
    fn test_default_name_skips_taken_names() {
        let mut fixture = Fixture::new();
        let tables = fixture.load("### DefaultSegment1\n    a\n###\n    b\n");

        assert_eq!(
            tables.segments.names(),
            &["DefaultSegment1".to_string(), "DefaultSegment2".to_string()]
        );
    }

    #[test]
    fn test_pad_segment_accepted() {
        let mut fixture = Fixture::new();
        let tables = fixture.load("### Intro\n    i\n### Body PAD=Intro\n    b\n");

        assert_eq!(tables.controls["Body"].pad_segment, "Intro");
    }

    #[test]
    fn test_pad_segment_forward_reference() {
        let mut fixture = Fixture::new();
        let tables = fixture.load("### Body PAD=Later\n    b\n### Later\n    l\n");

        assert!(tables.controls["Body"].pad_segment.is_empty());
        assert!(fixture.logger.contains("must be defined earlier"));
    }

    #[test]
    fn test_pad_segment_self_reference() {
        let mut fixture = Fixture::new();
        let tables = fixture.load("### Body PAD=Body\n    b\n");

        assert!(tables.controls["Body"].pad_segment.is_empty());
        assert!(fixture.logger.contains("cannot use itself"));
    }

    #[test]
    fn test_pad_segment_chain() {
        let mut fixture = Fixture::new();
        let tables = fixture.load(
            "### A\n    a\n### B PAD=A\n    b\n### C PAD=B\n    c\n### D PAD=A\n    d\n",
        );

        assert_eq!(tables.controls["B"].pad_segment, "A");
        assert!(tables.controls["C"].pad_segment.is_empty());
        assert_eq!(tables.controls["D"].pad_segment, "A");
        assert!(fixture.logger.contains("multiple levels of pad segments"));
    }

    #[test]
    fn test_pad_segment_discarded_target() {
        let mut fixture = Fixture::new();
        let tables = fixture.load("### A\n### B PAD=A\n    b\n");

        assert!(tables.controls["B"].pad_segment.is_empty());
        assert!(fixture.logger.contains("must be defined earlier"));
    }

    #[test]
    fn test_invalid_lines_are_skipped() {
        let mut fixture = Fixture::new();
        let tables = fixture.load("### Seg\n\n@+1text\nXYZ bad\n    good\n");

        assert_eq!(tables.segments.get("Seg").unwrap().len(), 1);
        assert!(fixture.logger.contains("shorter than 3 characters"));
        assert!(fixture.logger.contains("Character 4 must be blank"));
        assert!(fixture.logger.contains("Invalid control code 'XYZ'"));
    }

    #[test]
    fn test_invalid_line_before_header_opens_default_segment() {
        let mut fixture = Fixture::new();
        let tables = fixture.load("bad line\n### Seg\n    a\n");

        assert_eq!(tables.segments.names(), &["Seg".to_string()]);
        assert!(fixture.logger.contains("Missing initial segment header"));
        assert!(fixture.logger.contains("segment 'DefaultSegment1'; segment discarded"));
        assert!(tables.keys_match());
    }

    #[test]
    fn test_tokens_are_extracted() {
        let mut fixture = Fixture::new();
        fixture.load("### Seg\n    <#=name#> <#=value#>\n    <#=name#>\n");

        assert_eq!(fixture.tokens.token_names(), vec!["name", "value"]);
    }

    #[test]
    fn test_locater_tracks_file_lines() {
        let mut fixture = Fixture::new();
        fixture.load("### Seg\n    a\n\n");

        let bad = fixture
            .logger
            .entries()
            .into_iter()
            .find(|entry| entry.message.contains("shorter"))
            .unwrap();
        assert_eq!(bad.location, Some(Locater::at("Seg", 3)));
    }
}
