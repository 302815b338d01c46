//! The contract every configuration module implements.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use gatecfg_core::{AttributeMap, AttributeSources, GateError, Result};

use crate::option::OptionWarning;
use crate::validation::parse_bool;
use crate::view::{CaseMode, RawConfig};

/// Reloads a running service after its configuration changed.
pub trait ServiceControl {
    /// Returns `false` if the service could not be reconfigured.
    fn reconfigure(&self, service: &str) -> bool;
}

/// Tri-state `enabled` option of a module section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleStatus {
    #[default]
    Disabled,
    Enabled,
    /// Parsed, but checks and configuration are skipped.
    Ignored,
}

impl ModuleStatus {
    /// Read `enabled` from `section`. Missing section → `Disabled`; section
    /// without the option → `missing`.
    pub fn from_view(view: &RawConfig, section: &str, missing: ModuleStatus) -> Result<Self> {
        if !view.has_section(section) {
            return Ok(ModuleStatus::Disabled);
        }
        let Some(raw) = view.get(section, "enabled")? else {
            return Ok(missing);
        };
        if raw.trim().eq_ignore_ascii_case("ignore") {
            return Ok(ModuleStatus::Ignored);
        }
        match parse_bool(&raw) {
            Some(true) => Ok(ModuleStatus::Enabled),
            Some(false) => Ok(ModuleStatus::Disabled),
            None => Err(GateError::setting(
                section,
                "enabled",
                format!("'{raw}' is not one of: true, false, ignore"),
            )),
        }
    }

    /// Enabled or ignored; the section's options are parsed.
    pub fn is_active(self) -> bool {
        !matches!(self, ModuleStatus::Disabled)
    }

    /// Checks and configuration actions apply.
    pub fn is_enabled(self) -> bool {
        matches!(self, ModuleStatus::Enabled)
    }
}

/// What a module's `configure` step has to work with besides attributes.
pub struct ConfigureContext<'a> {
    /// Files a module writes are placed under this root.
    pub root: &'a Path,
    pub sources: &'a AttributeSources,
    pub local_job_environment: &'a Path,
}

impl ConfigureContext<'_> {
    /// Map an absolute system path under [`Self::root`].
    pub fn target(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Fetch an attribute a configuration step depends on.
    pub fn require<'m>(&self, attributes: &'m AttributeMap, name: &str) -> Result<&'m str> {
        attributes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| GateError::MissingAttribute {
                attribute: name.to_string(),
                sources: self.sources.get(name).cloned().unwrap_or_default(),
            })
    }
}

/// A cohesive unit of configuration logic for one subsystem.
///
/// The orchestrator calls, in order: `parse_configuration` on every module,
/// `get_attributes`/`attribute_sources` on every module, `check_attributes`
/// on every module with the merged attributes, and finally `configure` on
/// the selected modules if the configuration is valid.
pub trait ConfigModule {
    /// Display name, also used by `--module`.
    fn name(&self) -> &str;

    /// The section this module owns.
    fn section(&self) -> &str;

    /// Which view `parse_configuration` receives.
    fn case_mode(&self) -> CaseMode {
        CaseMode::Normalize
    }

    fn separately_configurable(&self) -> bool {
        false
    }

    fn parse_configuration(&mut self, view: &RawConfig) -> Result<()>;

    fn get_attributes(&self) -> AttributeMap;

    fn attribute_sources(&self) -> AttributeSources {
        AttributeSources::new()
    }

    /// Unknown options seen while parsing.
    fn warnings(&self) -> &[OptionWarning] {
        &[]
    }

    /// Cross-module consistency check. Logs its diagnostics; never mutates.
    fn check_attributes(&self, _attributes: &AttributeMap) -> bool {
        true
    }

    fn configure(&self, _attributes: &AttributeMap, _ctx: &ConfigureContext<'_>) -> Result<()> {
        Ok(())
    }

    fn enabled_services(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    /// Running services that must reload after this module is configured.
    fn reload_services(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}
