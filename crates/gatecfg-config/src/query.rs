use std::path::PathBuf;

use gatecfg_core::{Result, SourceLocation};
use serde::Serialize;

use crate::view::RawConfig;

/// One row of the query table: Option, Section, Value, File.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRow {
    pub option: String,
    pub section: String,
    pub value: String,
    pub file: PathBuf,
    pub line: usize,
    /// Where the option was first defined, when a later file overrode it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_defined: Option<SourceLocation>,
}

/// Look up `target` in `view`.
///
/// `target` is either `section.option` (split at the last dot, only when
/// the part before it names a section) or a bare option name, which is
/// looked up in every section that defines it.
pub fn query(view: &RawConfig, target: &str) -> Result<Vec<QueryRow>> {
    if let Some((section, option)) = target.rsplit_once('.') {
        if view.has_section(section) {
            return Ok(lookup(view, section, option)?.into_iter().collect());
        }
    }

    let sections: Vec<String> = view.sections().map(String::from).collect();
    let mut rows = Vec::new();
    for section in &sections {
        if view.options(section).iter().any(|o| o.eq_ignore_ascii_case(target)) {
            rows.extend(lookup(view, section, target)?);
        }
    }
    Ok(rows)
}

fn lookup(view: &RawConfig, section: &str, option: &str) -> Result<Option<QueryRow>> {
    let Some(location) = view.get_option_location(option, section) else {
        return Ok(None);
    };
    let value = view.get(section, option)?.unwrap_or_default();
    let first_defined = view
        .first_location(option, section)
        .filter(|first| first.file() != location.file() || first.line() != location.line())
        .cloned();
    Ok(Some(QueryRow {
        option: location.option().to_string(),
        section: location.section().to_string(),
        value,
        file: location.file().to_path_buf(),
        line: location.line(),
        first_defined,
    }))
}
