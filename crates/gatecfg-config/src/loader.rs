use std::path::{Path, PathBuf};

use gatecfg_core::{GateError, Result};
use tracing::{info, warn};

use crate::schema::Settings;

/// Loads the tool settings (`gatecfg.toml`).
pub struct SettingsLoader {
    settings: Settings,
    path: PathBuf,
}

impl SettingsLoader {
    /// Resolve the settings path: explicit path > GATECFG_SETTINGS env > /etc/gatecfg/gatecfg.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("GATECFG_SETTINGS") {
            return PathBuf::from(p);
        }
        PathBuf::from("/etc/gatecfg/gatecfg.toml")
    }

    /// Load settings from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path);
        let settings = if path.exists() {
            info!(?path, "loading settings");
            let raw = std::fs::read_to_string(&path).map_err(|source| GateError::Read {
                path: path.clone(),
                source,
            })?;
            Self::parse(&path, &raw)?
        } else {
            warn!(?path, "settings file not found, using defaults");
            Settings::default()
        };

        let settings = Self::apply_env_overrides(settings);

        match settings.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => return Err(GateError::Settings(e)),
        }

        Ok(Self { settings, path })
    }

    /// Parse settings text; `path` is only used in the error message.
    pub fn parse(path: &Path, raw: &str) -> Result<Settings> {
        toml::from_str::<Settings>(raw)
            .map_err(|e| GateError::Settings(format!("failed to parse {}: {}", path.display(), e)))
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Path the settings were looked up at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply env var overrides (GATECFG_CONFIG_DIR, GATECFG_LOG_LEVEL).
    fn apply_env_overrides(mut settings: Settings) -> Settings {
        if let Ok(v) = std::env::var("GATECFG_CONFIG_DIR") {
            settings.paths.config_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("GATECFG_LOG_LEVEL") {
            settings.logging.level = v;
        }
        settings
    }
}
