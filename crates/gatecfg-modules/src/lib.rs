//! # gatecfg-modules
//!
//! The built-in configuration modules, one per subsystem of a gateway host,
//! and the registry that hands them to the orchestrator in processing order.

pub mod batch;
mod files;
pub mod gateway;
pub mod local_settings;
pub mod misc;
pub mod site_information;
pub mod squid;
pub mod storage;

use std::path::Path;

use gatecfg_config::{AttributeFile, ConfigModule};

pub use batch::JobManager;
pub use gateway::Gateway;
pub use local_settings::LocalSettings;
pub use misc::Misc;
pub use site_information::SiteInformation;
pub use squid::Squid;
pub use storage::Storage;

/// Every built-in module, in processing order. On an attribute collision
/// the later module wins.
pub fn builtin_modules() -> Vec<Box<dyn ConfigModule>> {
    vec![
        Box::new(Gateway::new()),
        Box::new(SiteInformation::new()),
        Box::new(Storage::new()),
        Box::new(Squid::new()),
        Box::new(JobManager::slurm()),
        Box::new(JobManager::pbs()),
        Box::new(JobManager::sge()),
        Box::new(Misc::new()),
        Box::new(LocalSettings::new()),
    ]
}

/// Attributes a job environment file must carry.
pub const JOB_ENVIRONMENT_REQUIRED: &[&str] = &[
    "OSG_GROUP",
    "OSG_HOSTNAME",
    "OSG_SITE_NAME",
    "OSG_GRID",
    "OSG_APP",
    "OSG_STORAGE_ELEMENT",
    "PATH",
];

/// Attributes written to the job environment file when some module set them.
pub const JOB_ENVIRONMENT_OPTIONAL: &[&str] = &[
    "OSG_SPONSOR",
    "OSG_SITE_INFO",
    "OSG_CONTACT_NAME",
    "OSG_CONTACT_EMAIL",
    "OSG_SITE_CITY",
    "OSG_SITE_COUNTRY",
    "OSG_SITE_LONGITUDE",
    "OSG_SITE_LATITUDE",
    "OSG_DATA",
    "OSG_WN_TMP",
    "OSG_SITE_READ",
    "OSG_SITE_WRITE",
    "OSG_DEFAULT_SE",
    "OSG_SQUID_LOCATION",
    "OSG_GLEXEC_LOCATION",
    "OSG_JOB_MANAGER",
    "OSG_JOB_MANAGER_HOME",
    "OSG_PBS_LOCATION",
    "OSG_SGE_ROOT",
    "OSG_SGE_CELL",
    "OSG_SGE_LOCATION",
    "OSG_JOB_CONTACT",
    "OSG_UTIL_CONTACT",
];

/// The job environment file at `path`.
pub fn job_environment(path: &Path) -> AttributeFile {
    AttributeFile::new(path)
        .required(JOB_ENVIRONMENT_REQUIRED.iter().copied())
        .optional(JOB_ENVIRONMENT_OPTIONAL.iter().copied())
}
