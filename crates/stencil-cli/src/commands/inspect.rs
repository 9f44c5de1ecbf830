// List the segments and tokens of a template

use std::{
    io::{self, Write},
    path::PathBuf,
};

use stencil_config::AppConfig;
use stencil_generation::{ControlItem, TemplateEngine};

use super::{configured_engine, resolve_template, Command};
use crate::{error::CliResult, output::OutputStyle};

/// List the segments and tokens of a template
pub struct InspectCommand {
    pub template: Option<PathBuf>,
    pub config: AppConfig,
}

impl InspectCommand {
    pub fn new(template: Option<PathBuf>, config: AppConfig) -> Self {
        Self { template, config }
    }

    /// Load the template and describe it with `style`
    pub fn run(&self, out: &mut dyn Write, style: &OutputStyle) -> CliResult<()> {
        let template = resolve_template(self.template.as_deref(), &self.config)?;
        let mut engine = configured_engine(&self.config);
        engine.load_template_from(&template)?;

        writeln!(out, "{}", style.section("Segments"))?;
        for name in engine.segment_names() {
            writeln!(out, "{}", style.key_value(name, &describe_segment(&engine, name)))?;
        }

        writeln!(out, "{}", style.section("Tokens"))?;
        for token in engine.token_names() {
            writeln!(out, "{}", style.list_item(&token))?;
        }
        Ok(())
    }
}

impl Command for InspectCommand {
    fn execute(&self) -> CliResult<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.run(&mut lock, &OutputStyle::default())
    }
}

/// Line count followed by the header options that are set
fn describe_segment(engine: &TemplateEngine, name: &str) -> String {
    let lines = engine.segment(name).map_or(0, |items| items.len());
    let mut description = format!("{} line{}", lines, if lines == 1 { "" } else { "s" });

    if let Some(control) = engine.control_item(name) {
        let options = header_options(control);
        if !options.is_empty() {
            description.push_str(&format!(" ({})", options.join(", ")));
        }
    }
    description
}

fn header_options(control: &ControlItem) -> Vec<String> {
    let mut options = Vec::new();
    if control.first_time_indent != 0 {
        options.push(format!("FTI={}", control.first_time_indent));
    }
    if control.tab_size != 0 {
        options.push(format!("TAB={}", control.tab_size));
    }
    if control.has_pad_segment() {
        options.push(format!("PAD={}", control.pad_segment));
    }
    options
}
