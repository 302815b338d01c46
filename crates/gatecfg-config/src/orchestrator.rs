use std::collections::BTreeSet;
use std::path::PathBuf;

use gatecfg_core::{AttributeMap, AttributeSources, GateError, Result};
use tracing::{debug, error, info, warn};

use crate::aggregator::ConfigViews;
use crate::module::{ConfigModule, ConfigureContext, ServiceControl};
use crate::option::OptionWarning;
use crate::writer::{AttributeFile, write_attributes};

/// Result of parsing, collecting and cross-checking every module.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    pub attributes: AttributeMap,
    pub sources: AttributeSources,
    pub valid: bool,
    /// Modules whose `check_attributes` returned false, in module order.
    pub failed: Vec<String>,
    pub warnings: Vec<OptionWarning>,
}

/// Knobs for [`Orchestrator::apply`].
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Configure even if validation failed.
    pub force: bool,
    /// Configure only this module; the job environment file is not written.
    pub only_module: Option<String>,
}

/// What [`Orchestrator::apply`] did.
#[derive(Debug, Clone, Default)]
pub struct ApplyReport {
    pub configured: Vec<String>,
    pub written: Vec<PathBuf>,
    pub reloaded: Vec<String>,
    pub reload_failures: Vec<String>,
}

/// Drives an ordered list of modules through a run.
///
/// Module order is significant: when two modules export the same attribute
/// the later one wins.
pub struct Orchestrator {
    modules: Vec<Box<dyn ConfigModule>>,
}

impl Orchestrator {
    pub fn new(modules: Vec<Box<dyn ConfigModule>>) -> Result<Self> {
        if modules.is_empty() {
            return Err(GateError::NoModules);
        }
        Ok(Self { modules })
    }

    pub fn modules(&self) -> &[Box<dyn ConfigModule>] {
        &self.modules
    }

    /// Parse (fail fast), collect, then run every cross-check.
    pub fn run(&mut self, views: &ConfigViews) -> Result<Validation> {
        for module in &mut self.modules {
            debug!(module = module.name(), "parsing configuration");
            let mode = module.case_mode();
            module.parse_configuration(views.view(mode))?;
        }

        let mut validation = Validation::default();
        for module in &self.modules {
            for (key, value) in module.get_attributes() {
                if let Some(previous) = validation.attributes.get(&key) {
                    if *previous != value {
                        warn!(
                            attribute = %key,
                            module = module.name(),
                            "attribute set by more than one module; later module wins"
                        );
                    }
                }
                validation.attributes.insert(key, value);
            }
            for (key, refs) in module.attribute_sources() {
                let entry = validation.sources.entry(key).or_default();
                for r in refs {
                    if !entry.contains(&r) {
                        entry.push(r);
                    }
                }
            }
            validation.warnings.extend(module.warnings().iter().cloned());
        }

        for module in &self.modules {
            if !module.check_attributes(&validation.attributes) {
                error!(module = module.name(), "configuration check failed");
                validation.failed.push(module.name().to_string());
            }
        }
        validation.valid = validation.failed.is_empty();
        info!(
            valid = validation.valid,
            attributes = validation.attributes.len(),
            "configuration validated"
        );
        Ok(validation)
    }

    /// Union of every module's enabled services. Call after [`Self::run`].
    pub fn enabled_services(&self) -> BTreeSet<String> {
        self.modules
            .iter()
            .flat_map(|m| m.enabled_services())
            .collect()
    }

    fn select(&self, only: Option<&str>) -> Result<Vec<&dyn ConfigModule>> {
        let Some(name) = only else {
            return Ok(self.modules.iter().map(|m| &**m).collect());
        };
        let module = self
            .modules
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| GateError::UnknownModule(name.to_string()))?;
        if !module.separately_configurable() {
            return Err(GateError::NotSeparatelyConfigurable(module.name().to_string()));
        }
        Ok(vec![&**module])
    }

    /// Run configuration actions, write the job environment file and
    /// reload affected services.
    ///
    /// Nothing is written when `validation` is invalid and `force` is off.
    /// The first module that fails to configure stops the run.
    pub fn apply(
        &self,
        validation: &Validation,
        options: &ApplyOptions,
        ctx: &ConfigureContext<'_>,
        job_environment: &AttributeFile,
        services: &dyn ServiceControl,
    ) -> Result<ApplyReport> {
        if !validation.valid {
            if !options.force {
                return Err(GateError::InvalidConfiguration {
                    modules: validation.failed.clone(),
                });
            }
            warn!(
                modules = %validation.failed.join(", "),
                "configuration is invalid; continuing because of --force"
            );
        }

        let selected = self.select(options.only_module.as_deref())?;
        // Resolved before any module touches the filesystem.
        let job_attributes = match options.only_module {
            None => Some(job_environment.select(&validation.attributes, &validation.sources)?),
            Some(_) => None,
        };

        let mut report = ApplyReport::default();
        for module in &selected {
            info!(module = module.name(), "configuring");
            module.configure(&validation.attributes, ctx)?;
            report.configured.push(module.name().to_string());
        }

        if let Some(attributes) = job_attributes {
            write_attributes(job_environment.path(), &attributes)?;
            report.written.push(job_environment.path().to_path_buf());
        }

        let reload: BTreeSet<String> = selected.iter().flat_map(|m| m.reload_services()).collect();
        for service in reload {
            if services.reconfigure(&service) {
                info!(service = %service, "service reconfigured");
                report.reloaded.push(service);
            } else {
                warn!(service = %service, "service reconfiguration failed");
                report.reload_failures.push(service);
            }
        }
        Ok(report)
    }
}
