//! `[Local Settings]`: site-specific job environment variables.
//!
//! Every option of the section is exported verbatim, so this module reads
//! the case-preserving view. Its variables go to the local job environment
//! file rather than the main one.

use gatecfg_config::writer::write_attributes;
use gatecfg_config::{CaseMode, ConfigModule, ConfigureContext, RawConfig};
use gatecfg_core::{AttributeMap, AttributeSources, OptionRef, Result};
use tracing::{debug, error};

pub const SECTION: &str = "Local Settings";

#[derive(Default)]
pub struct LocalSettings {
    variables: AttributeMap,
}

impl LocalSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variables(&self) -> &AttributeMap {
        &self.variables
    }
}

/// A name the shell accepts as a variable.
fn valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl ConfigModule for LocalSettings {
    fn name(&self) -> &str {
        "LocalSettings"
    }

    fn section(&self) -> &str {
        SECTION
    }

    fn case_mode(&self) -> CaseMode {
        CaseMode::Preserve
    }

    fn separately_configurable(&self) -> bool {
        true
    }

    fn parse_configuration(&mut self, view: &RawConfig) -> Result<()> {
        self.variables.clear();
        if !view.has_section(SECTION) {
            debug!(section = SECTION, "section not in configuration");
            return Ok(());
        }
        for name in view.options(SECTION) {
            let value = view.get(SECTION, name)?.unwrap_or_default();
            self.variables.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn get_attributes(&self) -> AttributeMap {
        self.variables.clone()
    }

    fn attribute_sources(&self) -> AttributeSources {
        self.variables
            .keys()
            .map(|name| (name.clone(), vec![OptionRef::new(SECTION, name.as_str())]))
            .collect()
    }

    fn check_attributes(&self, _attributes: &AttributeMap) -> bool {
        let mut ok = true;
        for name in self.variables.keys() {
            if !valid_variable_name(name) {
                error!(section = SECTION, option = %name, "not a valid environment variable name");
                ok = false;
            }
        }
        ok
    }

    fn configure(&self, _attributes: &AttributeMap, ctx: &ConfigureContext<'_>) -> Result<()> {
        write_attributes(ctx.local_job_environment, &self.variables)
    }
}
