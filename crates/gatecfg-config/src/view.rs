//! The merged, read-only configuration view.

use std::collections::BTreeMap;

use gatecfg_core::{GateError, Result, SourceLocation};

use crate::ini::IniDocument;

/// Section whose options are visible from every other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

const MAX_INTERPOLATION_DEPTH: usize = 10;

/// How section and option names are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseMode {
    /// Names are folded to lower case; `Section.Option` == `section.option`.
    Normalize,
    /// Names are kept verbatim. Used for free-form environment variables.
    Preserve,
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    /// Location of the line that produced `value`.
    location: SourceLocation,
    /// Location of the first definition across all files.
    first_defined: SourceLocation,
}

#[derive(Debug, Clone)]
struct Section {
    /// Name as first written.
    name: String,
    entries: BTreeMap<String, Entry>,
}

/// Every `(section, option)` of the configuration directory, with the
/// effective value and where it came from.
#[derive(Debug, Clone)]
pub struct RawConfig {
    mode: CaseMode,
    sections: BTreeMap<String, Section>,
    defaults: BTreeMap<String, Entry>,
}

impl RawConfig {
    pub fn new(mode: CaseMode) -> Self {
        Self {
            mode,
            sections: BTreeMap::new(),
            defaults: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> CaseMode {
        self.mode
    }

    fn key(&self, name: &str) -> String {
        match self.mode {
            CaseMode::Normalize => name.to_lowercase(),
            CaseMode::Preserve => name.to_string(),
        }
    }

    /// Merge a parsed file on top of what is already here. Values from
    /// `doc` win; first-definition locations are kept.
    pub fn merge(&mut self, doc: &IniDocument) {
        for section in &doc.sections {
            let is_default = section.name == DEFAULT_SECTION;
            let section_key = self.key(&section.name);
            for entry in &section.entries {
                let option_key = self.key(&entry.key);
                let location =
                    SourceLocation::new(&doc.path, &section.name, &entry.key, entry.line);
                let table = if is_default {
                    &mut self.defaults
                } else {
                    &mut self
                        .sections
                        .entry(section_key.clone())
                        .or_insert_with(|| Section {
                            name: section.name.clone(),
                            entries: BTreeMap::new(),
                        })
                        .entries
                };
                match table.get_mut(&option_key) {
                    Some(existing) => {
                        existing.value = entry.value.clone();
                        existing.location = location;
                    }
                    None => {
                        table.insert(
                            option_key,
                            Entry {
                                value: entry.value.clone(),
                                location: location.clone(),
                                first_defined: location,
                            },
                        );
                    }
                }
            }
            // Headers with no options still count as present.
            if !is_default {
                self.sections.entry(section_key).or_insert_with(|| Section {
                    name: section.name.clone(),
                    entries: BTreeMap::new(),
                });
            }
        }
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&self.key(section))
    }

    /// Whether `option` is visible in `section`, either directly or from
    /// the `[DEFAULT]` section.
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.entry(section, option).is_some()
    }

    /// Section names as first written, in key order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.values().map(|s| s.name.as_str())
    }

    /// Options defined directly in `section` (not inherited from
    /// `[DEFAULT]`), as lookup keys.
    pub fn options(&self, section: &str) -> Vec<&str> {
        self.sections
            .get(&self.key(section))
            .map(|s| s.entries.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Names defined in `[DEFAULT]`, as lookup keys.
    pub fn default_options(&self) -> Vec<&str> {
        self.defaults.keys().map(String::as_str).collect()
    }

    fn entry(&self, section: &str, option: &str) -> Option<&Entry> {
        let option = self.key(option);
        self.sections
            .get(&self.key(section))
            .and_then(|s| s.entries.get(&option))
            .or_else(|| self.defaults.get(&option))
    }

    /// Value before interpolation.
    pub fn get_raw(&self, section: &str, option: &str) -> Option<&str> {
        self.entry(section, option).map(|e| e.value.as_str())
    }

    /// Effective value with `%(name)s` references expanded.
    pub fn get(&self, section: &str, option: &str) -> Result<Option<String>> {
        match self.get_raw(section, option) {
            Some(raw) => self.interpolate(section, option, raw, 0).map(Some),
            None => Ok(None),
        }
    }

    /// Boolean lookup that falls back to `default` when the option is
    /// missing or not a boolean. For peeking at other modules' sections.
    pub fn get_bool_or(&self, section: &str, option: &str, default: bool) -> bool {
        match self.get(section, option) {
            Ok(Some(v)) => crate::validation::parse_bool(&v).unwrap_or(default),
            _ => default,
        }
    }

    /// Where the effective value of `option` in `section` was defined.
    pub fn get_option_location(&self, option: &str, section: &str) -> Option<&SourceLocation> {
        self.entry(section, option).map(|e| &e.location)
    }

    /// Where `option` in `section` was defined first, before any override.
    pub fn first_location(&self, option: &str, section: &str) -> Option<&SourceLocation> {
        self.entry(section, option).map(|e| &e.first_defined)
    }

    fn interpolate(&self, section: &str, option: &str, raw: &str, depth: usize) -> Result<String> {
        let fail = |reason: String| GateError::Interpolation {
            section: section.to_string(),
            option: option.to_string(),
            reason,
        };
        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(fail(format!(
                "references nest deeper than {MAX_INTERPOLATION_DEPTH} levels"
            )));
        }
        if !raw.contains('%') {
            return Ok(raw.to_string());
        }

        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if let Some(tail) = after.strip_prefix('%') {
                out.push('%');
                rest = tail;
            } else if let Some(tail) = after.strip_prefix('(') {
                let close = tail
                    .find(")s")
                    .ok_or_else(|| fail(format!("unterminated reference in '{raw}'")))?;
                let name = &tail[..close];
                let referenced = self
                    .get_raw(section, name)
                    .ok_or_else(|| fail(format!("no option '{name}' to substitute")))?;
                out.push_str(&self.interpolate(section, option, referenced, depth + 1)?);
                rest = &tail[close + 2..];
            } else {
                return Err(fail(format!("'%' must be followed by '%' or '(' in '{raw}'")));
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn view(mode: CaseMode, files: &[(&str, &str)]) -> RawConfig {
        let mut view = RawConfig::new(mode);
        for (name, text) in files {
            view.merge(&IniDocument::parse(Path::new(name), text).unwrap());
        }
        view
    }

    #[test]
    fn test_interpolation_from_defaults() {
        let v = view(
            CaseMode::Normalize,
            &[("a.ini", "[DEFAULT]\nunavailable = UNAVAILABLE\n[Squid]\nlocation = %(unavailable)s\n")],
        );
        assert_eq!(v.get("Squid", "location").unwrap().as_deref(), Some("UNAVAILABLE"));
    }

    #[test]
    fn test_interpolation_literal_percent() {
        let v = view(CaseMode::Normalize, &[("a.ini", "[A]\nratio = 50%%\n")]);
        assert_eq!(v.get("A", "ratio").unwrap().as_deref(), Some("50%"));
    }

    #[test]
    fn test_interpolation_missing_reference() {
        let v = view(CaseMode::Normalize, &[("a.ini", "[A]\nx = %(nope)s\n")]);
        assert!(matches!(v.get("A", "x"), Err(GateError::Interpolation { .. })));
    }

    #[test]
    fn test_interpolation_cycle_is_bounded() {
        let v = view(CaseMode::Normalize, &[("a.ini", "[A]\nx = %(y)s\ny = %(x)s\n")]);
        assert!(v.get("A", "x").is_err());
    }

    #[test]
    fn test_bare_percent_is_error() {
        let v = view(CaseMode::Normalize, &[("a.ini", "[A]\nx = 5% off\n")]);
        assert!(v.get("A", "x").is_err());
    }

    #[test]
    fn test_empty_section_is_present() {
        let v = view(CaseMode::Normalize, &[("a.ini", "[Gateway]\n")]);
        assert!(v.has_section("gateway"));
        assert!(v.options("Gateway").is_empty());
    }

    #[test]
    fn test_defaults_are_not_listed_as_section_options() {
        let v = view(CaseMode::Normalize, &[("a.ini", "[DEFAULT]\nenable = True\n[A]\nx = 1\n")]);
        assert_eq!(v.options("A"), vec!["x"]);
        assert!(v.has_option("A", "enable"));
        assert!(!v.has_section(DEFAULT_SECTION));
    }

    #[test]
    fn test_get_bool_or() {
        let v = view(CaseMode::Normalize, &[("a.ini", "[Gateway]\nflag = nonsense\non = yes\n")]);
        assert!(v.get_bool_or("Gateway", "flag", true));
        assert!(v.get_bool_or("Gateway", "on", false));
        assert!(!v.get_bool_or("Gateway", "missing", false));
    }
}
