//! `[Gateway]`: which job gateway fronts the site and the job `PATH`.

use std::collections::BTreeSet;

use gatecfg_config::{ConfigModule, OptionDescriptor, OptionKind, OptionSet, OptionWarning, RawConfig};
use gatecfg_core::{AttributeMap, AttributeSources, GateError, Result};
use tracing::debug;

pub const SECTION: &str = "Gateway";

/// Value of `job_envvar_path` when none is configured.
pub const DEFAULT_PATH: &str = "/bin:/usr/bin:/sbin:/usr/sbin";

pub struct Gateway {
    options: OptionSet,
    present: bool,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            options: OptionSet::new(
                SECTION,
                vec![
                    OptionDescriptor::optional(SECTION, "gram_gateway_enabled")
                        .kind(OptionKind::Bool)
                        .default_value(false),
                    OptionDescriptor::optional(SECTION, "htcondor_gateway_enabled")
                        .kind(OptionKind::Bool)
                        .default_value(true),
                    OptionDescriptor::optional(SECTION, "job_envvar_path")
                        .default_value(DEFAULT_PATH)
                        .maps_to("PATH"),
                ],
            ),
            present: false,
        }
    }

    /// Whether the HTCondor-CE gateway is in use. Defaults to on.
    pub fn htcondor_gateway_enabled(&self) -> bool {
        self.options.bool("htcondor_gateway_enabled").unwrap_or(true)
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Peek at the gateway setting from another module's point of view.
pub(crate) fn htcondor_enabled(view: &RawConfig) -> bool {
    view.get_bool_or(SECTION, "htcondor_gateway_enabled", true)
}

impl ConfigModule for Gateway {
    fn name(&self) -> &str {
        SECTION
    }

    fn section(&self) -> &str {
        SECTION
    }

    fn parse_configuration(&mut self, view: &RawConfig) -> Result<()> {
        self.present = view.has_section(SECTION);
        if !self.present {
            debug!(section = SECTION, "section not in configuration; using defaults");
        }
        // An absent section still yields the defaults, PATH included.
        self.options.parse(view, &[])?;
        if self.options.bool("gram_gateway_enabled") == Some(true) {
            return Err(GateError::setting(
                SECTION,
                "gram_gateway_enabled",
                "GRAM gateway is no longer supported",
            ));
        }
        Ok(())
    }

    fn get_attributes(&self) -> AttributeMap {
        self.options.attributes()
    }

    fn attribute_sources(&self) -> AttributeSources {
        self.options.attribute_sources()
    }

    fn warnings(&self) -> &[OptionWarning] {
        self.options.warnings()
    }

    fn reload_services(&self) -> BTreeSet<String> {
        let mut services = BTreeSet::new();
        if self.present && self.htcondor_gateway_enabled() {
            services.insert("condor-ce".to_string());
        }
        services
    }
}
