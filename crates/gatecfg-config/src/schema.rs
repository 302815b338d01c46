use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root settings of the tool itself, read from `gatecfg.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathsSettings,
    pub logging: LoggingSettings,
}

// ── Paths ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSettings {
    /// Directory holding the `.ini` configuration files.
    pub config_dir: PathBuf,
    /// Job environment file for the module-derived attributes.
    pub job_environment: PathBuf,
    /// Job environment file for `[Local Settings]` variables.
    pub local_job_environment: PathBuf,
    /// Files written by configuration actions land under this root.
    pub output_root: PathBuf,
}

impl Default for PathsSettings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/etc/gatecfg/config.d"),
            job_environment: PathBuf::from("/var/lib/gatecfg/job-environment.conf"),
            local_job_environment: PathBuf::from("/var/lib/gatecfg/local-job-environment.conf"),
            output_root: PathBuf::from("/"),
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty" or "json".
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single settings validation issue.
#[derive(Debug)]
pub struct SettingsWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
}

impl std::fmt::Display for SettingsWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
        };
        write!(f, "{}: {}: {}", tag, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, " ({})", h)?;
        }
        Ok(())
    }
}

impl Settings {
    /// Validate and return warnings. `Err` joins every error-severity issue.
    pub fn validate(&self) -> Result<Vec<SettingsWarning>, String> {
        let mut warnings = Vec::new();

        for (field, path) in [
            ("paths.job_environment", &self.paths.job_environment),
            ("paths.local_job_environment", &self.paths.local_job_environment),
        ] {
            if path.file_name().is_none() {
                warnings.push(SettingsWarning {
                    field: field.into(),
                    message: format!("'{}' does not name a file", path.display()),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            }
        }

        if self.paths.job_environment == self.paths.local_job_environment {
            warnings.push(SettingsWarning {
                field: "paths.local_job_environment".into(),
                message: "same file as paths.job_environment".into(),
                severity: WarningSeverity::Error,
                hint: Some("local variables would overwrite the job environment".into()),
            });
        }

        if !self.paths.config_dir.is_absolute() {
            warnings.push(SettingsWarning {
                field: "paths.config_dir".into(),
                message: format!("'{}' is relative", self.paths.config_dir.display()),
                severity: WarningSeverity::Warning,
                hint: Some("it is resolved against the current directory".into()),
            });
        }

        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(SettingsWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(SettingsWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Settings errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
