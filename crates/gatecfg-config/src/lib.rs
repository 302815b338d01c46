//! # gatecfg-config
//!
//! The configuration engine. Reads every `.ini` file of a configuration
//! directory into one merged view with provenance, resolves per-module option
//! descriptors against it, drives the modules through parse → collect →
//! cross-check, and writes the resulting attributes to job-environment files.
//!
//! Also holds the tool's own settings (`gatecfg.toml`).

pub mod aggregator;
pub mod ini;
pub mod loader;
pub mod module;
pub mod option;
pub mod orchestrator;
pub mod query;
pub mod schema;
pub mod validation;
pub mod view;
pub mod writer;

pub use aggregator::{ConfigAggregator, ConfigViews};
pub use loader::SettingsLoader;
pub use module::{ConfigModule, ConfigureContext, ModuleStatus, ServiceControl};
pub use option::{OptionDescriptor, OptionKind, OptionSet, OptionValue, OptionWarning};
pub use orchestrator::{ApplyOptions, ApplyReport, Orchestrator, Validation};
pub use query::{QueryRow, query};
pub use schema::{Settings, SettingsWarning, WarningSeverity};
pub use view::{CaseMode, RawConfig, DEFAULT_SECTION};
pub use writer::{AttributeFile, read_attribute_file};
