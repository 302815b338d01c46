use gatecfg_config::{OptionDescriptor, OptionKind};

use super::{BatchSystem, JobManager, no_blah_settings, no_extra_checks};

const SECTION: &str = "PBS";

pub static PBS: BatchSystem = BatchSystem {
    name: "PBS",
    section: SECTION,
    location_option: "pbs_location",
    location_attributes: &[],
    bin_option: None,
    blah_prefix: "pbs",
    contact_manager: "pbs",
    services: &[],
    descriptors,
    extra_checks: no_extra_checks,
    blah_settings: no_blah_settings,
};

fn descriptors() -> Vec<OptionDescriptor> {
    let s = SECTION;
    vec![
        OptionDescriptor::optional(s, "pbs_location")
            .default_value("/usr")
            .maps_to("OSG_PBS_LOCATION"),
        OptionDescriptor::required(s, "job_contact").maps_to("OSG_JOB_CONTACT"),
        OptionDescriptor::required(s, "util_contact").maps_to("OSG_UTIL_CONTACT"),
        OptionDescriptor::optional(s, "pbs_server"),
        OptionDescriptor::optional(s, "log_directory"),
        OptionDescriptor::optional(s, "accept_limited")
            .kind(OptionKind::Bool)
            .default_value(false),
        OptionDescriptor::optional(s, "wsgram").deprecated(None),
    ]
}

impl JobManager {
    pub fn pbs() -> Self {
        Self::new(&PBS)
    }
}
