//! Option descriptors: the declarative side of a configuration module.

use std::collections::BTreeMap;
use std::fmt;

use gatecfg_core::{AttributeMap, AttributeSources, GateError, OptionRef, Result, SourceLocation};
use tracing::{debug, warn};

use crate::validation::{is_blank, parse_bool};
use crate::view::RawConfig;

/// Extra check run on the raw string after it parsed as its [`OptionKind`].
pub type Validator = fn(&str) -> std::result::Result<(), String>;

/// How the raw string of an option is turned into an [`OptionValue`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionKind {
    String,
    Bool,
    Int,
    Float,
    /// Comma-separated, whitespace trimmed, empty items dropped.
    List,
    /// One of a fixed set, compared case-insensitively and stored lower case.
    Choice(&'static [&'static str]),
}

/// A typed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Unset,
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    List(Vec<String>),
}

impl OptionValue {
    pub fn is_set(&self) -> bool {
        !matches!(self, OptionValue::Unset)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(f) => Some(*f),
            OptionValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::List(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Unset => Ok(()),
            OptionValue::Str(s) => f.write_str(s),
            OptionValue::Bool(true) => f.write_str("True"),
            OptionValue::Bool(false) => f.write_str("False"),
            OptionValue::Int(i) => write!(f, "{i}"),
            // Debug keeps a fractional digit: 10.0 stays "10.0".
            OptionValue::Float(v) => write!(f, "{v:?}"),
            OptionValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

/// Declarative description of one configuration key.
#[derive(Debug, Clone)]
pub struct OptionDescriptor {
    pub name: &'static str,
    pub section: &'static str,
    pub required: bool,
    pub kind: OptionKind,
    pub validator: Option<Validator>,
    pub default: Option<OptionValue>,
    /// Attribute this option is exported as.
    pub mapping: Option<&'static str>,
    pub deprecated: bool,
    /// Option that supersedes a deprecated one.
    pub replaced_by: Option<&'static str>,
}

/// An option after resolution against a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOption {
    pub value: OptionValue,
    /// `None` when the value is a default.
    pub location: Option<SourceLocation>,
}

impl OptionDescriptor {
    fn new(section: &'static str, name: &'static str, required: bool) -> Self {
        Self {
            name,
            section,
            required,
            kind: OptionKind::String,
            validator: None,
            default: None,
            mapping: None,
            deprecated: false,
            replaced_by: None,
        }
    }

    pub fn required(section: &'static str, name: &'static str) -> Self {
        Self::new(section, name, true)
    }

    pub fn optional(section: &'static str, name: &'static str) -> Self {
        Self::new(section, name, false)
    }

    pub fn kind(mut self, kind: OptionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn default_value(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn maps_to(mut self, attribute: &'static str) -> Self {
        self.mapping = Some(attribute);
        self
    }

    /// Mark as deprecated. With a replacement, using this option without
    /// also setting the replacement is an error.
    pub fn deprecated(mut self, replaced_by: Option<&'static str>) -> Self {
        self.deprecated = true;
        self.required = false;
        self.replaced_by = replaced_by;
        self
    }

    pub fn option_ref(&self) -> OptionRef {
        OptionRef::new(self.section, self.name)
    }

    fn error(&self, reason: impl Into<String>) -> GateError {
        GateError::setting(self.section, self.name, reason)
    }

    /// Look the option up in `view`, apply defaults, type and validator.
    pub fn resolve(&self, view: &RawConfig) -> Result<ResolvedOption> {
        let raw = view.get(self.section, self.name)?;
        let location = view.get_option_location(self.name, self.section).cloned();

        if self.deprecated {
            return self.resolve_deprecated(view, raw.as_deref(), location);
        }

        let raw = match raw {
            Some(v) if !is_blank(&v) => v,
            present => {
                if let Some(default) = &self.default {
                    debug!(section = self.section, option = self.name, "using default value");
                    return Ok(ResolvedOption {
                        value: default.clone(),
                        location: None,
                    });
                }
                if self.required {
                    return Err(self.error(if present.is_some() {
                        "required option has no value"
                    } else {
                        "required option is missing"
                    }));
                }
                return Ok(ResolvedOption {
                    value: OptionValue::Unset,
                    location,
                });
            }
        };

        let value = self.parse_value(&raw)?;
        if let Some(validator) = self.validator {
            validator(&raw).map_err(|reason| self.error(reason))?;
        }
        Ok(ResolvedOption { value, location })
    }

    fn resolve_deprecated(
        &self,
        view: &RawConfig,
        raw: Option<&str>,
        location: Option<SourceLocation>,
    ) -> Result<ResolvedOption> {
        let unset = ResolvedOption {
            value: OptionValue::Unset,
            location: None,
        };
        let Some(raw) = raw.filter(|v| !is_blank(v)) else {
            return Ok(unset);
        };
        match self.replaced_by {
            Some(replacement) => {
                let replaced = view
                    .get(self.section, replacement)?
                    .is_some_and(|v| !is_blank(&v));
                if !replaced {
                    return Err(self.error(format!(
                        "option is deprecated; set '{replacement}' instead"
                    )));
                }
                warn!(
                    section = self.section,
                    option = self.name,
                    replacement,
                    "ignoring deprecated option in favour of its replacement"
                );
                Ok(unset)
            }
            None => {
                warn!(section = self.section, option = self.name, "option is deprecated and ignored");
                let value = self.parse_value(raw)?;
                Ok(ResolvedOption { value, location })
            }
        }
    }

    fn parse_value(&self, raw: &str) -> Result<OptionValue> {
        let raw = raw.trim();
        match self.kind {
            OptionKind::String => Ok(OptionValue::Str(raw.to_string())),
            OptionKind::Bool => parse_bool(raw)
                .map(OptionValue::Bool)
                .ok_or_else(|| self.error(format!("'{raw}' is not a boolean"))),
            OptionKind::Int => raw
                .parse::<i64>()
                .map(OptionValue::Int)
                .map_err(|_| self.error(format!("'{raw}' is not an integer"))),
            OptionKind::Float => raw
                .parse::<f64>()
                .map(OptionValue::Float)
                .map_err(|_| self.error(format!("'{raw}' is not a number"))),
            OptionKind::List => Ok(OptionValue::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )),
            OptionKind::Choice(choices) => {
                let lower = raw.to_lowercase();
                if choices.contains(&lower.as_str()) {
                    Ok(OptionValue::Str(lower))
                } else {
                    Err(self.error(format!(
                        "'{raw}' is not one of: {}",
                        choices.join(", ")
                    )))
                }
            }
        }
    }
}

/// An option present in a module's section that no descriptor claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionWarning {
    pub section: String,
    pub option: String,
    pub location: Option<SourceLocation>,
    /// Closest known option name, if one is near enough to be a typo.
    pub suggestion: Option<String>,
}

impl fmt::Display for OptionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown option '{}' in [{}]", self.option, self.section)?;
        if let Some(loc) = &self.location {
            write!(f, " ({}:{})", loc.file().display(), loc.line())?;
        }
        if let Some(s) = &self.suggestion {
            write!(f, "; did you mean '{s}'?")?;
        }
        Ok(())
    }
}

/// The descriptors one module owns for its section, and their parsed values.
#[derive(Debug, Clone)]
pub struct OptionSet {
    section: &'static str,
    descriptors: Vec<OptionDescriptor>,
    values: BTreeMap<&'static str, ResolvedOption>,
    warnings: Vec<OptionWarning>,
}

impl OptionSet {
    pub fn new(section: &'static str, descriptors: Vec<OptionDescriptor>) -> Self {
        debug_assert!(
            descriptors
                .iter()
                .enumerate()
                .all(|(i, d)| descriptors[..i].iter().all(|o| o.name != d.name)),
            "duplicate option descriptor in [{section}]"
        );
        Self {
            section,
            descriptors,
            values: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn section(&self) -> &'static str {
        self.section
    }

    pub fn descriptors(&self) -> &[OptionDescriptor] {
        &self.descriptors
    }

    /// Resolve every descriptor against `view`, stopping at the first
    /// error, then record unknown options of the section as warnings.
    /// Names in `ignore` are neither resolved nor reported.
    pub fn parse(&mut self, view: &RawConfig, ignore: &[&str]) -> Result<()> {
        self.values.clear();
        for descriptor in &self.descriptors {
            if ignore.contains(&descriptor.name) {
                continue;
            }
            let resolved = descriptor.resolve(view)?;
            self.values.insert(descriptor.name, resolved);
        }
        self.warnings = self.unknown_options(view, ignore);
        for w in &self.warnings {
            warn!("{}", w);
        }
        Ok(())
    }

    fn unknown_options(&self, view: &RawConfig, ignore: &[&str]) -> Vec<OptionWarning> {
        let defaults = view.default_options();
        let known: Vec<&str> = self.descriptors.iter().map(|d| d.name).collect();
        view.options(self.section)
            .into_iter()
            .filter(|opt| {
                !known.iter().any(|k| k.eq_ignore_ascii_case(opt))
                    && !ignore.iter().any(|k| k.eq_ignore_ascii_case(opt))
                    && !defaults.contains(opt)
            })
            .map(|opt| OptionWarning {
                section: self.section.to_string(),
                option: opt.to_string(),
                location: view.get_option_location(opt, self.section).cloned(),
                suggestion: closest_name(opt, &known),
            })
            .collect()
    }

    pub fn warnings(&self) -> &[OptionWarning] {
        &self.warnings
    }

    pub fn value(&self, name: &str) -> &OptionValue {
        self.values
            .get(name)
            .map(|r| &r.value)
            .unwrap_or(&OptionValue::Unset)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.value(name).as_str()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.value(name).as_bool()
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.value(name).as_int()
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.value(name).as_float()
    }

    pub fn location(&self, name: &str) -> Option<&SourceLocation> {
        self.values.get(name).and_then(|r| r.location.as_ref())
    }

    /// Attributes of every mapped option that has a value.
    pub fn attributes(&self) -> AttributeMap {
        self.descriptors
            .iter()
            .filter_map(|d| {
                let attr = d.mapping?;
                let value = self.value(d.name);
                value.is_set().then(|| (attr.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Attribute → `(section, option)` for every mapped descriptor.
    pub fn attribute_sources(&self) -> AttributeSources {
        let mut sources = AttributeSources::new();
        for d in &self.descriptors {
            if let Some(attr) = d.mapping {
                sources.entry(attr.to_string()).or_default().push(d.option_ref());
            }
        }
        sources
    }
}

fn closest_name(name: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(&name.to_lowercase(), &k.to_lowercase()), *k))
        .filter(|(d, _)| *d <= 3)
        .min_by_key(|(d, _)| *d)
        .map(|(_, k)| k.to_string())
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut cur = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        prev = cur;
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("location", "location"), 0);
        assert_eq!(levenshtein("locaton", "location"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn test_closest_name() {
        let known = ["cache_size", "memory_size", "policy"];
        assert_eq!(closest_name("cache_sise", &known).as_deref(), Some("cache_size"));
        assert_eq!(closest_name("completely_unrelated", &known), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(OptionValue::Bool(true).to_string(), "True");
        assert_eq!(OptionValue::Int(2048).to_string(), "2048");
        assert_eq!(OptionValue::Float(10.0).to_string(), "10.0");
        assert_eq!(OptionValue::Float(-84.230).to_string(), "-84.23");
        assert_eq!(OptionValue::List(vec!["a".into(), "b".into()]).to_string(), "a,b");
        assert_eq!(OptionValue::Unset.to_string(), "");
    }
}
