use std::path::PathBuf;

use thiserror::Error;

use crate::types::{OptionRef, Verdict};

/// Unified error type for every stage of a gatecfg run.
#[derive(Error, Debug)]
pub enum GateError {
    // ── Reading sources ────────────────────────────────────────
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error in {}:{line}: {reason}", .path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("bad interpolation in [{section}] {option}: {reason}")]
    Interpolation {
        section: String,
        option: String,
        reason: String,
    },

    // ── Module parsing and validation ──────────────────────────
    #[error("invalid setting [{section}] {option}: {reason}")]
    Setting {
        section: String,
        option: String,
        reason: String,
    },

    #[error("attribute {attribute} is not set; {}", describe_sources(.sources))]
    MissingAttribute {
        attribute: String,
        sources: Vec<OptionRef>,
    },

    #[error("invalid configuration in: {}", .modules.join(", "))]
    InvalidConfiguration { modules: Vec<String> },

    // ── Configuration actions ──────────────────────────────────
    #[error("configuring {module} failed: {reason}")]
    Configure { module: String, reason: String },

    // ── Module selection ───────────────────────────────────────
    #[error("no configuration modules found")]
    NoModules,

    #[error("unknown module: {0}")]
    UnknownModule(String),

    #[error("module {0} cannot be configured separately")]
    NotSeparatelyConfigurable(String),

    // ── Tool settings (gatecfg.toml) ───────────────────────────
    #[error("settings error: {0}")]
    Settings(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl GateError {
    /// Shorthand for a [`GateError::Setting`].
    pub fn setting(
        section: impl Into<String>,
        option: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Setting {
            section: section.into(),
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`GateError::Configure`].
    pub fn configure(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configure {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// Which of the four run outcomes this error represents.
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Read { .. }
            | Self::Syntax { .. }
            | Self::Interpolation { .. }
            | Self::Settings(_)
            | Self::Io(_) => Verdict::FatalReadError,
            Self::NoModules => Verdict::NoModulesFound,
            _ => Verdict::ValidationFailed,
        }
    }
}

fn describe_sources(sources: &[OptionRef]) -> String {
    if sources.is_empty() {
        return "no configuration option provides it".to_string();
    }
    let names: Vec<String> = sources.iter().map(ToString::to_string).collect();
    format!("set one of: {}", names.join(", "))
}

pub type Result<T> = std::result::Result<T, GateError>;
