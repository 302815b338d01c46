use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use console::style;
use std::path::{Path, PathBuf};

use gatecfg_config::{
    ConfigAggregator, ConfigViews, Orchestrator, Settings, SettingsLoader, Validation, query,
};
use gatecfg_core::{Result, Verdict};
use gatecfg_modules::builtin_modules;
use tracing::{debug, info};

use crate::output::{TableFormatter, format_warnings};

mod configure;

/// Aggregate, validate and apply gateway host configuration
#[derive(Parser)]
#[command(name = "gatecfg", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to gatecfg.toml settings file
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Configuration directory to read instead of the configured one
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and check the configuration without changing anything
    Verify,
    /// Verify, then run configuration actions and write job environment files
    Configure {
        /// Write even if checks fail
        #[arg(short, long)]
        force: bool,
        /// Configure only this module (must be separately configurable)
        #[arg(short, long)]
        module: Option<String>,
        /// Do not reload services afterwards
        #[arg(long)]
        no_reload: bool,
    },
    /// Show the effective value of an option and the file that set it
    Query {
        /// `option` or `section.option`
        target: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List modules in processing order
    List,
    /// Print the merged attribute mapping
    Attributes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the services the configuration enables
    Services,
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Load settings, set up logging and run the command.
    pub fn run(self) -> Result<Verdict> {
        // Load settings first so we can use them for the log format
        let loader = SettingsLoader::load(self.settings.as_deref())?;
        let settings_path = loader.path().to_path_buf();
        let settings = loader.into_settings();

        // Resolve log level: --verbose > --quiet > --log-level > settings
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level
                .as_deref()
                .unwrap_or(settings.logging.level.as_str())
        };

        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
        if settings.logging.format == "json" {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        debug!(path = %settings_path.display(), "settings loaded");

        self.execute(&settings)
    }

    /// Run the command with already loaded settings.
    pub fn execute(self, settings: &Settings) -> Result<Verdict> {
        let config_dir = self
            .dir
            .clone()
            .unwrap_or_else(|| settings.paths.config_dir.clone());

        match self.command {
            Commands::Verify => Self::cmd_verify(&config_dir),
            Commands::Configure {
                force,
                module,
                no_reload,
            } => configure::cmd_configure(settings, &config_dir, force, module, no_reload),
            Commands::Query { target, json } => Self::cmd_query(&config_dir, &target, json),
            Commands::List => Self::cmd_list(),
            Commands::Attributes { json } => Self::cmd_attributes(&config_dir, json),
            Commands::Services => Self::cmd_services(&config_dir),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_verify(config_dir: &Path) -> Result<Verdict> {
        let (orchestrator, validation) = validate(config_dir)?;
        print_warnings(&validation);

        if !validation.valid {
            println!(
                "{} checks failed in: {}",
                style("✗").red().bold(),
                validation.failed.join(", ")
            );
            return Ok(Verdict::ValidationFailed);
        }

        println!("{} configuration is valid", style("✓").green().bold());
        let services = orchestrator.enabled_services();
        if !services.is_empty() {
            println!("Enabled services:");
            for service in &services {
                println!("  {service}");
            }
        }
        Ok(Verdict::Success)
    }

    fn cmd_query(config_dir: &Path, target: &str, json: bool) -> Result<Verdict> {
        let views = load_views(config_dir)?;
        let rows = query(views.normalized(), target)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else if rows.is_empty() {
            println!("{} no option matches '{target}'", style("!").yellow().bold());
        } else {
            println!("{}", TableFormatter::new().format_query(&rows));
        }
        Ok(Verdict::Success)
    }

    fn cmd_list() -> Result<Verdict> {
        let orchestrator = Orchestrator::new(builtin_modules())?;
        println!("{}", TableFormatter::new().format_modules(orchestrator.modules()));
        Ok(Verdict::Success)
    }

    fn cmd_attributes(config_dir: &Path, json: bool) -> Result<Verdict> {
        let (_, validation) = validate(config_dir)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&validation.attributes)?);
        } else {
            println!(
                "{}",
                TableFormatter::new().format_attributes(&validation.attributes, &validation.sources)
            );
        }
        Ok(if validation.valid {
            Verdict::Success
        } else {
            Verdict::ValidationFailed
        })
    }

    fn cmd_services(config_dir: &Path) -> Result<Verdict> {
        let (orchestrator, _) = validate(config_dir)?;
        for service in orchestrator.enabled_services() {
            println!("{service}");
        }
        Ok(Verdict::Success)
    }

    fn cmd_completions(shell: Shell) -> Result<Verdict> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "gatecfg", &mut std::io::stdout());
        Ok(Verdict::Success)
    }
}

fn load_views(config_dir: &Path) -> Result<ConfigViews> {
    ConfigAggregator::new(config_dir).load()
}

/// Read the directory and run every built-in module through validation.
pub(crate) fn validate(config_dir: &Path) -> Result<(Orchestrator, Validation)> {
    let views = load_views(config_dir)?;
    let mut orchestrator = Orchestrator::new(builtin_modules())?;
    let validation = orchestrator.run(&views)?;
    info!(
        dir = %config_dir.display(),
        files = views.files().len(),
        valid = validation.valid,
        "validation finished"
    );
    Ok((orchestrator, validation))
}

fn print_warnings(validation: &Validation) {
    if validation.warnings.is_empty() {
        return;
    }
    println!("{} unknown options:", style("!").yellow().bold());
    print!("{}", format_warnings(&validation.warnings));
}
