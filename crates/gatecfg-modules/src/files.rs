//! Helpers for the system files modules rewrite.

use std::path::Path;

use gatecfg_config::writer::atomic_write;
use gatecfg_core::{GateError, Result};
use tracing::info;

/// Existing contents of `path`, or `default` if it does not exist.
pub(crate) fn read_or(path: &Path, default: &str) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(default.to_string()),
        Err(source) => Err(GateError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Atomically replace `path`, creating its directory if needed.
pub(crate) fn write(module: &str, path: &Path, contents: &str) -> Result<()> {
    let fail = |e: std::io::Error| {
        GateError::configure(module, format!("cannot write {}: {e}", path.display()))
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }
    atomic_write(path, contents).map_err(fail)?;
    info!(module, path = %path.display(), "wrote file");
    Ok(())
}

fn assigns(line: &str, key: &str) -> bool {
    line.trim_start()
        .strip_prefix(key)
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

/// Set `key=value` in a `key=value` style file, replacing the first
/// existing assignment or appending a new one.
pub(crate) fn add_or_replace_setting(contents: &str, key: &str, value: &str, quote: bool) -> String {
    let line = if quote {
        format!("{key}=\"{value}\"")
    } else {
        format!("{key}={value}")
    };
    let mut replaced = false;
    let mut out = String::with_capacity(contents.len() + line.len() + 1);
    for existing in contents.lines() {
        if !replaced && assigns(existing, key) {
            out.push_str(&line);
            replaced = true;
        } else {
            out.push_str(existing);
        }
        out.push('\n');
    }
    if !replaced {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Drop every assignment of `key`.
pub(crate) fn remove_setting(contents: &str, key: &str) -> String {
    contents
        .lines()
        .filter(|line| !assigns(line, key))
        .map(|line| format!("{line}\n"))
        .collect()
}
