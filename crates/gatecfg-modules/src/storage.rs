//! `[Storage]`: directories jobs see on the worker nodes.

use std::path::Path;

use gatecfg_config::{ConfigModule, OptionDescriptor, OptionKind, OptionSet, OptionWarning, RawConfig};
use gatecfg_core::{AttributeMap, AttributeSources, Result};
use tracing::{debug, error, warn};

pub const SECTION: &str = "Storage";

pub struct Storage {
    options: OptionSet,
    present: bool,
}

impl Storage {
    pub fn new() -> Self {
        let s = SECTION;
        Self {
            options: OptionSet::new(
                s,
                vec![
                    OptionDescriptor::optional(s, "grid_dir")
                        .default_value("/etc/osg/wn-client/")
                        .maps_to("OSG_GRID"),
                    OptionDescriptor::required(s, "app_dir").maps_to("OSG_APP"),
                    OptionDescriptor::optional(s, "data_dir").maps_to("OSG_DATA"),
                    OptionDescriptor::optional(s, "worker_node_temp").maps_to("OSG_WN_TMP"),
                    OptionDescriptor::optional(s, "site_read").maps_to("OSG_SITE_READ"),
                    OptionDescriptor::optional(s, "site_write").maps_to("OSG_SITE_WRITE"),
                    OptionDescriptor::optional(s, "se_available")
                        .kind(OptionKind::Bool)
                        .default_value(false)
                        .maps_to("OSG_STORAGE_ELEMENT"),
                    OptionDescriptor::optional(s, "default_se").maps_to("OSG_DEFAULT_SE"),
                ],
            ),
            present: false,
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigModule for Storage {
    fn name(&self) -> &str {
        SECTION
    }

    fn section(&self) -> &str {
        SECTION
    }

    fn parse_configuration(&mut self, view: &RawConfig) -> Result<()> {
        self.present = view.has_section(SECTION);
        if !self.present {
            debug!(section = SECTION, "section not in configuration");
            return Ok(());
        }
        self.options.parse(view, &[])
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

        if let Some(app_dir) = self.options.str("app_dir") {
            let app = Path::new(app_dir);
            if !app.is_dir() {
                error!(section = SECTION, option = "app_dir", "'{app_dir}' is not a directory");
                ok = false;
            } else if !app.join("etc").is_dir() {
                warn!(section = SECTION, option = "app_dir", "'{app_dir}' has no etc/ subdirectory");
            }
        }

        for option in ["grid_dir", "data_dir", "worker_node_temp"] {
            if let Some(dir) = self.options.str(option) {
                if !Path::new(dir).is_absolute() {
                    error!(section = SECTION, option, "'{dir}' is not an absolute path");
                    ok = false;
                }
            }
        }

        if self.options.bool("se_available") == Some(true) && self.options.str("default_se").is_none() {
            error!(
                section = SECTION,
                option = "default_se",
                "se_available is set but no default storage element is given"
            );
            ok = false;
        }

        ok
    }
}
