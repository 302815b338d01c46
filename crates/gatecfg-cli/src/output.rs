//! Table and text output for CLI commands.

use std::env;

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};
use gatecfg_config::{ConfigModule, OptionWarning, QueryRow};
use gatecfg_core::{AttributeMap, AttributeSources};

/// Table formatter for CLI output.
pub struct TableFormatter {
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Option, section, value and defining file of each query match.
    pub fn format_query(&self, rows: &[QueryRow]) -> String {
        let mut table = self.create_base_table();
        table.set_header(self.header(&["Option", "Section", "Value", "File", "First defined"]));
        for row in rows {
            let first = row
                .first_defined
                .as_ref()
                .map(|loc| format!("{}:{}", loc.file().display(), loc.line()))
                .unwrap_or_default();
            table.add_row(vec![
                Cell::new(&row.option),
                Cell::new(&row.section),
                Cell::new(&row.value),
                Cell::new(format!("{}:{}", row.file.display(), row.line)),
                Cell::new(first),
            ]);
        }
        table.to_string()
    }

    /// Modules in processing order.
    pub fn format_modules(&self, modules: &[Box<dyn ConfigModule>]) -> String {
        let mut table = self.create_base_table();
        table.set_header(self.header(&["#", "Module", "Section", "Separately configurable"]));
        for (i, module) in modules.iter().enumerate() {
            let separate = if module.separately_configurable() { "yes" } else { "no" };
            let separate_cell = if self.use_colors && module.separately_configurable() {
                Cell::new(separate).fg(Color::Green)
            } else {
                Cell::new(separate)
            };
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(module.name()),
                Cell::new(module.section()),
                separate_cell,
            ]);
        }
        table.to_string()
    }

    /// Attributes with the options that can set them.
    pub fn format_attributes(&self, attributes: &AttributeMap, sources: &AttributeSources) -> String {
        let mut table = self.create_base_table();
        table.set_header(self.header(&["Attribute", "Value", "Set by"]));
        for (name, value) in attributes {
            let set_by = sources
                .get(name)
                .map(|refs| {
                    refs.iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_else(|| "-".to_string());
            table.add_row(vec![Cell::new(name), Cell::new(value), Cell::new(set_by)]);
        }
        table.to_string()
    }

    fn header(&self, names: &[&str]) -> Vec<Cell> {
        names
            .iter()
            .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
            .collect()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.use_colors {
            table.force_no_tty();
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// One line per unknown option.
pub fn format_warnings(warnings: &[OptionWarning]) -> String {
    warnings.iter().map(|w| format!("  {w}\n")).collect()
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }
    true
}
