use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Global attribute mapping: attribute name → exported value.
///
/// Ordered so that anything written from it is byte-stable across runs.
pub type AttributeMap = BTreeMap<String, String>;

/// Attribute name → the `(section, option)` pairs able to produce it.
pub type AttributeSources = BTreeMap<String, Vec<OptionRef>>;

/// Origin of an effective configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    file: PathBuf,
    section: String,
    option: String,
    line: usize,
}

impl SourceLocation {
    pub fn new(
        file: impl Into<PathBuf>,
        section: impl Into<String>,
        option: impl Into<String>,
        line: usize,
    ) -> Self {
        Self {
            file: file.into(),
            section: section.into(),
            option: option.into(),
            line,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn option(&self) -> &str {
        &self.option
    }

    /// 1-based line of the `key = value` line.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} [{}] {}",
            self.file.display(),
            self.line,
            self.section,
            self.option
        )
    }
}

/// A `(section, option)` pair, as named by an option descriptor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OptionRef {
    pub section: String,
    pub option: String,
}

impl OptionRef {
    pub fn new(section: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            option: option.into(),
        }
    }
}

impl fmt::Display for OptionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.section, self.option)
    }
}

/// Outcome of a run, as exposed to the process caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Success,
    ValidationFailed,
    FatalReadError,
    NoModulesFound,
}

impl Verdict {
    /// Process exit status for this verdict.
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Success => 0,
            Verdict::ValidationFailed => 1,
            Verdict::FatalReadError => 2,
            Verdict::NoModulesFound => 3,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Success => "success",
            Verdict::ValidationFailed => "validation failed",
            Verdict::FatalReadError => "fatal read error",
            Verdict::NoModulesFound => "no modules found",
        };
        f.write_str(s)
    }
}
