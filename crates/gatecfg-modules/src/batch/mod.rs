//! Batch system job managers (`[SLURM]`, `[PBS]`, `[SGE]`).
//!
//! All share one module type, parameterized by a [`BatchSystem`]: they
//! export the job manager attributes, check their install location and
//! contact strings, and point the HTCondor-CE blahp at their binaries.

mod pbs;
mod sge;
mod slurm;

use std::collections::BTreeSet;
use std::path::Path;

use gatecfg_config::validation::{valid_contact, valid_directory, valid_location};
use gatecfg_config::{
    ConfigModule, ConfigureContext, ModuleStatus, OptionDescriptor, OptionSet, OptionWarning,
    RawConfig,
};
use gatecfg_core::{AttributeMap, AttributeSources, OptionRef, Result};
use tracing::{debug, error, warn};

use crate::{files, gateway};

pub use pbs::PBS;
pub use sge::SGE;
pub use slurm::SLURM;

/// blahp configuration the HTCondor-CE uses to reach batch systems.
pub const BLAH_CONFIG: &str = "/etc/blah.config";

/// Static description of one supported batch system.
pub struct BatchSystem {
    /// Module name and `OSG_JOB_MANAGER` value.
    pub name: &'static str,
    pub section: &'static str,
    /// Option naming the install prefix; also exported as the job manager home.
    pub location_option: &'static str,
    /// Further attributes that carry the install prefix.
    pub location_attributes: &'static [&'static str],
    /// Option naming the directory of the batch commands. Unset means
    /// `<location>/bin`.
    pub bin_option: Option<&'static str>,
    /// Prefix of the `<prefix>_binpath` blahp setting.
    pub blah_prefix: &'static str,
    /// Job manager suffix accepted in contact strings.
    pub contact_manager: &'static str,
    /// Services needed on top of the gateway's.
    pub services: &'static [&'static str],
    pub descriptors: fn() -> Vec<OptionDescriptor>,
    /// Checks beyond location, commands and contacts.
    pub extra_checks: fn(&JobManager) -> bool,
    /// Quoted blahp settings beyond the binpath.
    pub blah_settings: fn(&JobManager) -> Vec<(&'static str, String)>,
}

fn no_extra_checks(_: &JobManager) -> bool {
    true
}

fn no_blah_settings(_: &JobManager) -> Vec<(&'static str, String)> {
    Vec::new()
}

pub struct JobManager {
    system: &'static BatchSystem,
    options: OptionSet,
    status: ModuleStatus,
    htcondor_gateway_enabled: bool,
}

impl JobManager {
    pub fn new(system: &'static BatchSystem) -> Self {
        Self {
            system,
            options: OptionSet::new(system.section, (system.descriptors)()),
            status: ModuleStatus::Disabled,
            htcondor_gateway_enabled: true,
        }
    }

    pub fn status(&self) -> ModuleStatus {
        self.status
    }

    /// Install prefix, once parsed.
    pub fn location(&self) -> Option<&str> {
        self.options.str(self.system.location_option)
    }

    /// Parsed value of any option of the section, rendered as text.
    pub fn option(&self, name: &str) -> Option<String> {
        let value = self.options.value(name);
        value.is_set().then(|| value.to_string())
    }

    fn bin_dir(&self) -> Option<String> {
        if let Some(dir) = self.system.bin_option.and_then(|o| self.options.str(o)) {
            return Some(dir.to_string());
        }
        self.location()
            .map(|loc| Path::new(loc).join("bin").display().to_string())
    }

    fn fail(&self, option: &str, message: String) {
        error!(section = self.system.section, option, "{message}");
    }

    fn gateway_services(&self) -> BTreeSet<String> {
        let mut services = BTreeSet::new();
        if self.status.is_enabled() && self.htcondor_gateway_enabled {
            services.insert("condor-ce".to_string());
        }
        services
    }
}

impl ConfigModule for JobManager {
    fn name(&self) -> &str {
        self.system.name
    }

    fn section(&self) -> &str {
        self.system.section
    }

    fn separately_configurable(&self) -> bool {
        true
    }

    fn parse_configuration(&mut self, view: &RawConfig) -> Result<()> {
        let section = self.system.section;
        self.htcondor_gateway_enabled = gateway::htcondor_enabled(view);
        self.status = ModuleStatus::from_view(view, section, ModuleStatus::Disabled)?;
        if !self.status.is_active() {
            debug!(section, "job manager not enabled");
            return Ok(());
        }
        self.options.parse(view, &["enabled"])
    }

    fn get_attributes(&self) -> AttributeMap {
        if !self.status.is_active() {
            return AttributeMap::new();
        }
        let mut attrs = self.options.attributes();
        attrs.insert("OSG_JOB_MANAGER".into(), self.system.name.into());
        if let Some(home) = self.location() {
            attrs.insert("OSG_JOB_MANAGER_HOME".into(), home.into());
            for attr in self.system.location_attributes {
                attrs.insert((*attr).into(), home.into());
            }
        }
        attrs
    }

    fn attribute_sources(&self) -> AttributeSources {
        let mut sources = self.options.attribute_sources();
        let home = std::iter::once(&"OSG_JOB_MANAGER_HOME").chain(self.system.location_attributes);
        for attr in home {
            sources
                .entry((*attr).into())
                .or_default()
                .push(OptionRef::new(self.system.section, self.system.location_option));
        }
        sources
            .entry("OSG_JOB_MANAGER".into())
            .or_default()
            .push(OptionRef::new(self.system.section, "enabled"));
        sources
    }

    fn warnings(&self) -> &[OptionWarning] {
        self.options.warnings()
    }

    fn check_attributes(&self, _attributes: &AttributeMap) -> bool {
        if !self.status.is_enabled() {
            return true;
        }
        let mut ok = true;

        if !self.htcondor_gateway_enabled {
            self.fail(
                "enabled",
                format!("{} is enabled but no job gateway is", self.system.name),
            );
            ok = false;
        }

        let location_option = self.system.location_option;
        if let Some(location) = self.location() {
            if !valid_location(location) {
                self.fail(location_option, format!("non-existent location given: {location}"));
                ok = false;
            } else if let Some(bin) = self.bin_dir().filter(|bin| !valid_directory(bin)) {
                let option = self.system.bin_option.unwrap_or(location_option);
                self.fail(option, format!("command directory '{bin}' does not exist"));
                ok = false;
            }
        }

        for option in ["job_contact", "util_contact"] {
            let contact = self.options.str(option).unwrap_or_default();
            if !valid_contact(contact, self.system.contact_manager) {
                self.fail(option, format!("invalid {}: '{contact}'", option.replace('_', " ")));
                ok = false;
            }
        }

        (self.system.extra_checks)(self) && ok
    }

    fn configure(&self, _attributes: &AttributeMap, ctx: &ConfigureContext<'_>) -> Result<()> {
        match self.status {
            ModuleStatus::Disabled => {
                debug!(section = self.system.section, "not enabled, nothing to configure");
                return Ok(());
            }
            ModuleStatus::Ignored => {
                warn!(section = self.system.section, "configuration ignored");
                return Ok(());
            }
            ModuleStatus::Enabled => {}
        }
        if !self.htcondor_gateway_enabled {
            return Ok(());
        }

        let path = ctx.target(BLAH_CONFIG);
        let mut contents = files::read_or(&path, "")?;
        if let Some(bin) = self.bin_dir() {
            let key = format!("{}_binpath", self.system.blah_prefix);
            contents = files::add_or_replace_setting(&contents, &key, &bin, true);
        }
        contents = files::add_or_replace_setting(&contents, "blah_disable_wn_proxy_renewal", "yes", false);
        contents = files::add_or_replace_setting(&contents, "blah_delegate_renewed_proxies", "no", false);
        contents = files::add_or_replace_setting(&contents, "blah_disable_limited_proxy", "yes", false);
        for (key, value) in (self.system.blah_settings)(self) {
            contents = files::add_or_replace_setting(&contents, key, &value, true);
        }
        files::write(self.system.name, &path, &contents)
    }

    fn enabled_services(&self) -> BTreeSet<String> {
        if !self.status.is_enabled() {
            return BTreeSet::new();
        }
        let mut services = self.gateway_services();
        services.extend(self.system.services.iter().map(|s| s.to_string()));
        services
    }

    fn reload_services(&self) -> BTreeSet<String> {
        self.gateway_services()
    }
}
