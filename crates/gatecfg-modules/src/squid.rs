//! `[Squid]`: the site's HTTP proxy.

use gatecfg_config::validation::valid_host_port;
use gatecfg_config::{
    ConfigModule, ModuleStatus, OptionDescriptor, OptionKind, OptionSet, OptionWarning, RawConfig,
};
use gatecfg_core::{AttributeMap, AttributeSources, GateError, Result};
use tracing::{debug, error};

pub const SECTION: &str = "Squid";

/// Exported as the proxy location when the proxy is disabled.
pub const UNAVAILABLE: &str = "UNAVAILABLE";

pub struct Squid {
    options: OptionSet,
    status: ModuleStatus,
}

impl Squid {
    pub fn new() -> Self {
        let s = SECTION;
        Self {
            options: OptionSet::new(
                s,
                vec![
                    OptionDescriptor::optional(s, "location").maps_to("OSG_SQUID_LOCATION"),
                    OptionDescriptor::optional(s, "policy")
                        .default_value("LRU")
                        .maps_to("OSG_SQUID_POLICY"),
                    OptionDescriptor::optional(s, "cache_size")
                        .kind(OptionKind::Int)
                        .default_value(2048_i64)
                        .maps_to("OSG_SQUID_CACHE_SIZE"),
                    OptionDescriptor::optional(s, "memory_size")
                        .kind(OptionKind::Int)
                        .default_value(256_i64)
                        .maps_to("OSG_SQUID_MEM_CACHE"),
                ],
            ),
            status: ModuleStatus::Disabled,
        }
    }

    pub fn status(&self) -> ModuleStatus {
        self.status
    }
}

impl Default for Squid {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigModule for Squid {
    fn name(&self) -> &str {
        SECTION
    }

    fn section(&self) -> &str {
        SECTION
    }

    fn parse_configuration(&mut self, view: &RawConfig) -> Result<()> {
        self.status = ModuleStatus::from_view(view, SECTION, ModuleStatus::Disabled)?;
        if !self.status.is_active() {
            debug!(section = SECTION, "squid not enabled");
            return Ok(());
        }
        // A blank location is caught by the check; a missing one is not
        // recoverable.
        if !view.has_option(SECTION, "location") {
            return Err(GateError::setting(SECTION, "location", "required option is missing"));
        }
        self.options.parse(view, &["enabled"])
    }

    fn get_attributes(&self) -> AttributeMap {
        if !self.status.is_active() {
            let mut attrs = AttributeMap::new();
            attrs.insert("OSG_SQUID_LOCATION".into(), UNAVAILABLE.into());
            return attrs;
        }
        self.options.attributes()
    }

    fn attribute_sources(&self) -> AttributeSources {
        self.options.attribute_sources()
    }

    fn warnings(&self) -> &[OptionWarning] {
        self.options.warnings()
    }

    fn check_attributes(&self, _attributes: &AttributeMap) -> bool {
        if !self.status.is_enabled() {
            return true;
        }
        match self.options.str("location") {
            None => {
                error!(section = SECTION, option = "location", "no proxy location given");
                false
            }
            Some(location) if !valid_host_port(location) => {
                error!(
                    section = SECTION,
                    option = "location",
                    "'{location}' is not of the form host[:port]"
                );
                false
            }
            Some(_) => true,
        }
    }
}
