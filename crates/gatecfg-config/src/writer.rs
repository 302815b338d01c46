//! Job-environment attribute files.
//!
//! ```sh
//! #!/bin/sh
//! #---  variables -----
//! OSG_GRID="/opt/grid"
//! #--- export variables -----
//! export OSG_GRID
//! ```
//!
//! Values are double-quoted with `"`, `\`, `$` and `` ` `` backslash-escaped.

use std::io::Write;
use std::path::{Path, PathBuf};

use gatecfg_core::{AttributeMap, AttributeSources, GateError, Result};
use tracing::{debug, info};

const HEADER: &str = "#!/bin/sh\n\
#---------- This file is generated by gatecfg and rewritten on every run.\n\
#---------- DO NOT HAND EDIT. Put custom job environment variables in the\n\
#---------- [Local Settings] section of the configuration instead.\n";

/// One output file and the attributes it must (and may) carry.
///
/// With no required or optional names, every attribute is written.
#[derive(Debug, Clone)]
pub struct AttributeFile {
    path: PathBuf,
    required: Vec<String>,
    optional: Vec<String>,
}

impl AttributeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: Vec::new(),
            optional: Vec::new(),
        }
    }

    pub fn required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Attributes written when present and skipped silently otherwise.
    pub fn optional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pick this file's attributes out of the global mapping. A missing
    /// required attribute names the options that could have set it.
    pub fn select(&self, attributes: &AttributeMap, sources: &AttributeSources) -> Result<AttributeMap> {
        if self.required.is_empty() && self.optional.is_empty() {
            return Ok(attributes.clone());
        }
        let mut selected = AttributeMap::new();
        for name in &self.required {
            let value = attributes.get(name).ok_or_else(|| GateError::MissingAttribute {
                attribute: name.clone(),
                sources: sources.get(name).cloned().unwrap_or_default(),
            })?;
            selected.insert(name.clone(), value.clone());
        }
        for name in &self.optional {
            match attributes.get(name) {
                Some(value) => {
                    selected.insert(name.clone(), value.clone());
                }
                None => debug!(attribute = %name, "optional attribute not set, skipping"),
            }
        }
        Ok(selected)
    }

    /// Select and atomically write. Returns what was written.
    pub fn write(&self, attributes: &AttributeMap, sources: &AttributeSources) -> Result<AttributeMap> {
        let selected = self.select(attributes, sources)?;
        write_attributes(&self.path, &selected)?;
        Ok(selected)
    }
}

/// Atomically write `attributes` to `path` in job-environment format.
pub fn write_attributes(path: &Path, attributes: &AttributeMap) -> Result<()> {
    atomic_write(path, &render(attributes)).map_err(|e| {
        GateError::configure("attribute writer", format!("cannot write {}: {e}", path.display()))
    })?;
    info!(path = %path.display(), count = attributes.len(), "wrote attribute file");
    Ok(())
}

/// Render `attributes` in job-environment format.
pub fn render(attributes: &AttributeMap) -> String {
    let mut out = String::from(HEADER);
    out.push_str("#---  variables -----\n");
    for (key, value) in attributes {
        out.push_str(&format!("{key}=\"{}\"\n", escape(value)));
    }
    out.push_str("#--- export variables -----\n");
    let mut exported: Vec<&str> = Vec::new();
    for key in attributes.keys() {
        let name = key.split('[').next().unwrap_or(key);
        if !exported.contains(&name) {
            exported.push(name);
            out.push_str(&format!("export {name}\n"));
        }
    }
    out
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Parse job-environment text back into attributes. Comments and
/// `export` lines are skipped; quoted values may span lines.
pub fn parse_attributes(text: &str) -> AttributeMap {
    let mut map = AttributeMap::new();
    let mut rest = text;
    while !rest.is_empty() {
        let line_end = rest.find('\n').unwrap_or(rest.len());
        let next_line = (line_end + 1).min(rest.len());
        let line = &rest[..line_end];
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("export ") {
            rest = &rest[next_line..];
            continue;
        }
        let Some(eq) = line.find('=') else {
            rest = &rest[next_line..];
            continue;
        };
        let key = line[..eq].trim().to_string();
        let Some(body) = rest[eq + 1..].strip_prefix('"') else {
            map.insert(key, line[eq + 1..].trim().to_string());
            rest = &rest[next_line..];
            continue;
        };

        let mut value = String::new();
        let mut escaped = false;
        let mut close = None;
        for (i, c) in body.char_indices() {
            if escaped {
                value.push(c);
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                close = Some(i);
                break;
            } else {
                value.push(c);
            }
        }
        let Some(close) = close else {
            break;
        };
        map.insert(key, value);
        rest = &body[close + 1..];
        rest = &rest[rest.find('\n').map_or(rest.len(), |p| p + 1)..];
    }
    map
}

/// Read an attribute file written by [`write_attributes`].
pub fn read_attribute_file(path: &Path) -> Result<AttributeMap> {
    let text = std::fs::read_to_string(path).map_err(|source| GateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_attributes(&text))
}

/// Write via a temp file in the target directory and rename over `path`.
pub fn atomic_write(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
