use console::style;
use std::path::{Path, PathBuf};

use gatecfg_config::{ApplyOptions, ApplyReport, ConfigureContext, ServiceControl, Settings};
use gatecfg_core::{Result, Verdict};
use gatecfg_modules::job_environment;

use super::{print_warnings, validate};
use crate::services::{NoReload, SystemServiceControl};

/// Verify, then apply: module configuration, job environment files, reloads.
pub(super) fn cmd_configure(
    settings: &Settings,
    config_dir: &Path,
    force: bool,
    module: Option<String>,
    no_reload: bool,
) -> Result<Verdict> {
    let (orchestrator, validation) = validate(config_dir)?;
    print_warnings(&validation);

    let root = settings.paths.output_root.as_path();
    let local_job_environment = under_root(root, &settings.paths.local_job_environment);
    let ctx = ConfigureContext {
        root,
        sources: &validation.sources,
        local_job_environment: &local_job_environment,
    };
    let job_env = job_environment(&under_root(root, &settings.paths.job_environment));
    let options = ApplyOptions {
        force,
        only_module: module,
    };
    let services: &dyn ServiceControl = if no_reload { &NoReload } else { &SystemServiceControl };

    if validation.valid || force {
        for path in [job_env.path(), local_job_environment.as_path()] {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let report = orchestrator.apply(&validation, &options, &ctx, &job_env, services)?;
    print_report(&report, no_reload);

    if !validation.valid {
        // Only reachable with --force.
        println!(
            "{} configuration was written despite failed checks in: {}",
            style("!").yellow().bold(),
            validation.failed.join(", ")
        );
        return Ok(Verdict::ValidationFailed);
    }
    Ok(Verdict::Success)
}

/// `path` relocated under the output root.
fn under_root(root: &Path, path: &Path) -> PathBuf {
    root.join(path.strip_prefix("/").unwrap_or(path))
}

fn print_report(report: &ApplyReport, no_reload: bool) {
    for module in &report.configured {
        println!("{} configured {module}", style("✓").green());
    }
    for path in &report.written {
        println!("{} wrote {}", style("✓").green(), path.display());
    }
    if no_reload {
        if !report.reloaded.is_empty() {
            println!("Not reloaded (--no-reload): {}", report.reloaded.join(", "));
        }
        return;
    }
    for service in &report.reloaded {
        println!("{} reloaded {service}", style("✓").green());
    }
    for service in &report.reload_failures {
        println!("{} could not reload {service}", style("✗").red().bold());
    }
}
