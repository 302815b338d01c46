use gatecfg_config::{OptionDescriptor, OptionKind};

use super::{BatchSystem, JobManager, no_blah_settings, no_extra_checks};

const SECTION: &str = "SLURM";

pub static SLURM: BatchSystem = BatchSystem {
    name: "SLURM",
    section: SECTION,
    location_option: "slurm_location",
    location_attributes: &[],
    bin_option: None,
    blah_prefix: "slurm",
    // SLURM is driven through its PBS emulation layer.
    contact_manager: "pbs",
    services: &["globus-gridftp-server"],
    descriptors,
    extra_checks: no_extra_checks,
    blah_settings: no_blah_settings,
};

fn descriptors() -> Vec<OptionDescriptor> {
    let s = SECTION;
    vec![
        OptionDescriptor::optional(s, "slurm_location")
            .default_value("/usr")
            .maps_to("OSG_PBS_LOCATION"),
        OptionDescriptor::required(s, "job_contact").maps_to("OSG_JOB_CONTACT"),
        OptionDescriptor::required(s, "util_contact").maps_to("OSG_UTIL_CONTACT"),
        OptionDescriptor::optional(s, "log_directory"),
        OptionDescriptor::optional(s, "db_host"),
        OptionDescriptor::optional(s, "db_port")
            .kind(OptionKind::Int)
            .default_value(3306_i64),
        OptionDescriptor::optional(s, "db_user").default_value("slurm"),
        OptionDescriptor::optional(s, "db_name").default_value("slurm_acct_db"),
        OptionDescriptor::optional(s, "db_pass"),
        OptionDescriptor::optional(s, "slurm_cluster"),
        OptionDescriptor::optional(s, "accept_limited")
            .kind(OptionKind::Bool)
            .default_value(false),
    ]
}

impl JobManager {
    pub fn slurm() -> Self {
        Self::new(&SLURM)
    }
}
