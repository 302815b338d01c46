//! Parser for the INI dialect the configuration directory is written in.
//!
//! ```ini
//! ; comment
//! [Section Name]
//! key = value
//! other: value
//! chain = first
//!     second          # continuation, joined with '\n'
//! ```
//!
//! Names are returned exactly as written; case folding is the view's job.

use std::path::{Path, PathBuf};

use gatecfg_core::{GateError, Result};

/// One `key = value` line (plus any continuation lines).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniEntry {
    pub key: String,
    pub value: String,
    pub line: usize,
}

/// A `[Section]` block. A header repeated within one file yields one
/// section per occurrence, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    pub name: String,
    pub line: usize,
    pub entries: Vec<IniEntry>,
}

/// A fully parsed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniDocument {
    pub path: PathBuf,
    pub sections: Vec<IniSection>,
}

impl IniDocument {
    /// Parse `text`, attributing errors to `path`.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let syntax = |line: usize, reason: &str| GateError::Syntax {
            path: path.to_path_buf(),
            line,
            reason: reason.to_string(),
        };

        let mut sections: Vec<IniSection> = Vec::new();
        // Whether the previous line was a value that may be continued.
        let mut in_value = false;

        for (idx, raw) in text.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let trimmed = line.trim();

            if trimmed.is_empty() {
                in_value = false;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indented = line.starts_with(' ') || line.starts_with('\t');
            if indented {
                if !in_value {
                    return Err(syntax(lineno, "indented line does not continue an option"));
                }
                if let Some(entry) = sections.last_mut().and_then(|s| s.entries.last_mut()) {
                    if !entry.value.is_empty() {
                        entry.value.push('\n');
                    }
                    entry.value.push_str(strip_inline_comment(trimmed));
                }
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .ok_or_else(|| syntax(lineno, "section header is missing ']'"))?
                    .trim();
                if name.is_empty() {
                    return Err(syntax(lineno, "section name is empty"));
                }
                sections.push(IniSection {
                    name: name.to_string(),
                    line: lineno,
                    entries: Vec::new(),
                });
                in_value = false;
                continue;
            }

            let split = trimmed
                .find(['=', ':'])
                .ok_or_else(|| syntax(lineno, "expected a section header, an option or a comment"))?;
            let key = trimmed[..split].trim();
            if key.is_empty() {
                return Err(syntax(lineno, "option name is empty"));
            }
            let value = strip_inline_comment(trimmed[split + 1..].trim());

            let section = sections
                .last_mut()
                .ok_or_else(|| syntax(lineno, "option appears before any section header"))?;
            section.entries.push(IniEntry {
                key: key.to_string(),
                value: value.to_string(),
                line: lineno,
            });
            in_value = true;
        }

        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }
}

/// Drop a trailing ` ; comment`. A `;` only starts a comment when preceded
/// by whitespace, so values like `a;b` survive.
fn strip_inline_comment(value: &str) -> &str {
    let bytes = value.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b';' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return value[..i].trim_end();
        }
    }
    value
}
