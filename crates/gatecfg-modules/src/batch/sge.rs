use std::path::Path;

use gatecfg_config::validation::valid_file;
use gatecfg_config::{OptionDescriptor, OptionKind};
use tracing::warn;

use super::{BatchSystem, JobManager};

const SECTION: &str = "SGE";

pub static SGE: BatchSystem = BatchSystem {
    name: "SGE",
    section: SECTION,
    location_option: "sge_root",
    location_attributes: &["OSG_SGE_LOCATION"],
    bin_option: Some("sge_bin_location"),
    blah_prefix: "sge",
    contact_manager: "sge",
    services: &["globus-gridftp-server"],
    descriptors,
    extra_checks,
    blah_settings,
};

fn descriptors() -> Vec<OptionDescriptor> {
    let s = SECTION;
    vec![
        OptionDescriptor::required(s, "sge_root").maps_to("OSG_SGE_ROOT"),
        OptionDescriptor::optional(s, "sge_cell")
            .default_value("default")
            .maps_to("OSG_SGE_CELL"),
        OptionDescriptor::optional(s, "sge_config").default_value("/etc/sysconfig/gridengine"),
        OptionDescriptor::optional(s, "sge_bin_location"),
        OptionDescriptor::required(s, "job_contact").maps_to("OSG_JOB_CONTACT"),
        OptionDescriptor::required(s, "util_contact").maps_to("OSG_UTIL_CONTACT"),
        OptionDescriptor::optional(s, "seg_enabled")
            .kind(OptionKind::Bool)
            .default_value(false),
        OptionDescriptor::optional(s, "log_file"),
        OptionDescriptor::optional(s, "log_directory"),
        OptionDescriptor::optional(s, "accept_limited")
            .kind(OptionKind::Bool)
            .default_value(false),
        // Queue settings only ever applied to GRAM.
        OptionDescriptor::optional(s, "default_queue").deprecated(None),
        OptionDescriptor::optional(s, "validate_queues").deprecated(None),
        OptionDescriptor::optional(s, "available_queues").deprecated(None),
    ]
}

impl JobManager {
    pub fn sge() -> Self {
        Self::new(&SGE)
    }

    /// Event log the scheduler event generator reads. Falls back to the
    /// older `log_directory` option.
    pub fn sge_log_file(&self) -> Option<&str> {
        self.options.str("log_file").or_else(|| {
            let dir = self.options.str("log_directory")?;
            warn!(
                section = SECTION,
                option = "log_directory",
                "log_directory is deprecated, please use log_file instead"
            );
            Some(dir)
        })
    }

    fn sge_cell(&self) -> &str {
        self.options.str("sge_cell").unwrap_or("default")
    }
}

fn extra_checks(sge: &JobManager) -> bool {
    let mut ok = true;

    if let Some(root) = sge.location() {
        let settings = Path::new(root).join(sge.sge_cell()).join("common/settings.sh");
        if !settings.is_file() {
            sge.fail(
                "sge_cell",
                format!("$SGE_ROOT/$SGE_CELL/common/settings.sh not present: {}", settings.display()),
            );
            ok = false;
        }
    }

    let config = sge.options.str("sge_config").unwrap_or_default();
    if !valid_file(config) {
        sge.fail("sge_config", format!("'{config}' is not a valid file"));
        ok = false;
    }

    if sge.options.bool("seg_enabled") == Some(true) {
        let log = sge.sge_log_file().unwrap_or_default();
        if !valid_file(log) {
            sge.fail("log_file", format!("'{log}' is not a valid file path for SGE log files"));
            ok = false;
        }
    }

    ok
}

fn blah_settings(sge: &JobManager) -> Vec<(&'static str, String)> {
    let mut settings = Vec::new();
    if let Some(root) = sge.location() {
        settings.push(("sge_rootpath", root.to_string()));
    }
    settings.push(("sge_cellname", sge.sge_cell().to_string()));
    settings
}
