//! `[Misc Services]`: authorization and worker cleanup.

use std::collections::BTreeSet;

use gatecfg_config::validation::{valid_cron, valid_domain};
use gatecfg_config::{
    ConfigModule, ConfigureContext, OptionDescriptor, OptionKind, OptionSet, OptionWarning, RawConfig,
};
use gatecfg_core::{AttributeMap, AttributeSources, GateError, Result};
use tracing::{debug, error};

use crate::{files, gateway};

pub const SECTION: &str = "Misc Services";

pub const AUTHORIZATION_METHODS: &[&str] = &["gridmap", "local-gridmap", "xacml", "vomsmap"];

pub const GSI_AUTHZ: &str = "/etc/grid-security/gsi-authz.conf";
pub const CLEANUP_CONFIG: &str = "/etc/osg/osg-cleanup.conf";
pub const CLEANUP_CRON: &str = "/etc/cron.d/osg-cleanup";
pub const HTCONDOR_CE_CONFIG: &str = "/etc/condor-ce/config.d/50-gatecfg.conf";

const GRID_MAPFILE: &str = "/etc/grid-security/grid-mapfile";

pub struct Misc {
    options: OptionSet,
    present: bool,
    htcondor_gateway_enabled: bool,
}

impl Misc {
    pub fn new() -> Self {
        let s = SECTION;
        Self {
            options: OptionSet::new(
                s,
                vec![
                    OptionDescriptor::optional(s, "glexec_location").maps_to("OSG_GLEXEC_LOCATION"),
                    OptionDescriptor::optional(s, "gums_host"),
                    OptionDescriptor::optional(s, "authorization_method").default_value("xacml"),
                    OptionDescriptor::optional(s, "edit_lcmaps_db")
                        .kind(OptionKind::Bool)
                        .default_value(true),
                    OptionDescriptor::optional(s, "enable_cleanup")
                        .kind(OptionKind::Bool)
                        .default_value(false),
                    OptionDescriptor::optional(s, "cleanup_age_in_days")
                        .kind(OptionKind::Int)
                        .default_value(14_i64),
                    OptionDescriptor::optional(s, "cleanup_users_list").default_value("@vo-file"),
                    OptionDescriptor::optional(s, "cleanup_cron_time").default_value("15 1 * * *"),
                    OptionDescriptor::optional(s, "copy_host_cert_for_service_certs")
                        .kind(OptionKind::Bool)
                        .default_value(false),
                ],
            ),
            present: false,
            htcondor_gateway_enabled: true,
        }
    }

    pub fn authorization_method(&self) -> &str {
        self.options.str("authorization_method").unwrap_or("xacml")
    }

    fn uses_glexec(&self) -> bool {
        self.options.str("glexec_location").is_some()
    }

    fn uses_lcmaps_callout(&self) -> bool {
        matches!(self.authorization_method(), "xacml" | "vomsmap")
    }

    fn cleanup_config(&self) -> String {
        format!(
            "# This file is generated by gatecfg; manual changes are overwritten.\n\
             # Edit the [{SECTION}] section of the configuration instead.\n\
             age = {}\n\
             users = {}\n",
            self.options.value("cleanup_age_in_days"),
            self.options.value("cleanup_users_list"),
        )
    }

    fn cleanup_cron(&self) -> String {
        format!(
            "{} root [ ! -f /var/lock/subsys/osg-cleanup-cron ] || /usr/sbin/osg-cleanup\n",
            self.options.value("cleanup_cron_time")
        )
    }
}

impl Default for Misc {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigModule for Misc {
    fn name(&self) -> &str {
        "Misc"
    }

    fn section(&self) -> &str {
        SECTION
    }

    fn separately_configurable(&self) -> bool {
        true
    }

    fn parse_configuration(&mut self, view: &RawConfig) -> Result<()> {
        self.present = view.has_section(SECTION);
        if !self.present {
            debug!(section = SECTION, "section not in configuration");
            return Ok(());
        }
        self.options.parse(view, &[])?;
        self.htcondor_gateway_enabled = gateway::htcondor_enabled(view);
        Ok(())
    }

    fn get_attributes(&self) -> AttributeMap {
        if !self.present {
            return AttributeMap::new();
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
        if !self.present {
            return true;
        }
        let mut ok = true;
        let method = self.authorization_method();

        if !AUTHORIZATION_METHODS.contains(&method) {
            error!(
                section = SECTION,
                option = "authorization_method",
                "'{method}' is not one of: {}",
                AUTHORIZATION_METHODS.join(", ")
            );
            ok = false;
        }

        if method == "xacml" {
            match self.options.str("gums_host") {
                None => {
                    error!(section = SECTION, option = "gums_host", "gums host not given");
                    ok = false;
                }
                Some(host) if !valid_domain(host) => {
                    error!(section = SECTION, option = "gums_host", "'{host}' is not a valid host name");
                    ok = false;
                }
                Some(_) => {}
            }
        }

        let cron = self.options.value("cleanup_cron_time").to_string();
        if !valid_cron(&cron) {
            error!(
                section = SECTION,
                option = "cleanup_cron_time",
                "'{cron}' is not a 5 part cron time"
            );
            ok = false;
        }

        ok
    }

    fn configure(&self, _attributes: &AttributeMap, ctx: &ConfigureContext<'_>) -> Result<()> {
        if !self.present {
            debug!(section = SECTION, "not enabled, nothing to configure");
            return Ok(());
        }
        let method = self.authorization_method();
        if !AUTHORIZATION_METHODS.contains(&method) {
            return Err(GateError::configure(
                "Misc",
                format!("unknown authorization method '{method}'"),
            ));
        }
        if method == "vomsmap" && self.uses_glexec() {
            error!(section = SECTION, option = "glexec_location", "glExec cannot be used with vomsmap");
            return Err(GateError::configure(
                "Misc",
                "glExec not supported with vomsmap authorization; unset glexec_location or change authorization_method",
            ));
        }

        let callout = if self.uses_lcmaps_callout() { "" } else { "#" };
        files::write(
            "Misc",
            &ctx.target(GSI_AUTHZ),
            &format!("{callout}globus_mapping liblcas_lcmaps_gt4_mapping.so lcmaps_callout\n"),
        )?;

        if self.htcondor_gateway_enabled {
            let path = ctx.target(HTCONDOR_CE_CONFIG);
            let contents = files::read_or(&path, "# This file is managed by gatecfg\n")?;
            let contents = if method.contains("gridmap") {
                files::add_or_replace_setting(&contents, "GRIDMAP", GRID_MAPFILE, false)
            } else {
                files::remove_setting(&contents, "GRIDMAP")
            };
            files::write("Misc", &path, &contents)?;
        }

        files::write("Misc", &ctx.target(CLEANUP_CONFIG), &self.cleanup_config())?;
        files::write("Misc", &ctx.target(CLEANUP_CRON), &self.cleanup_cron())?;
        Ok(())
    }

    fn enabled_services(&self) -> BTreeSet<String> {
        let mut services = BTreeSet::new();
        if !self.present {
            return services;
        }
        services.insert("fetch-crl-cron".to_string());
        services.insert("fetch-crl-boot".to_string());
        match self.authorization_method() {
            "xacml" => {
                services.insert("gums-client-cron".to_string());
            }
            "gridmap" => {
                services.insert("edg-mkgridmap".to_string());
            }
            _ => {}
        }
        if self.options.bool("enable_cleanup") == Some(true) {
            services.insert("osg-cleanup-cron".to_string());
        }
        services
    }

    fn reload_services(&self) -> BTreeSet<String> {
        let mut services = BTreeSet::new();
        if self.present && self.htcondor_gateway_enabled {
            services.insert("condor-ce".to_string());
        }
        services
    }
}
