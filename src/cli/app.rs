// ABOUTME: Main application orchestration for the ecfgen CLI
// ABOUTME: Coordinates CLI arguments, tool configuration, experiment variables, and command execution

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::commands;
use super::{Args, Commands, Config};
use crate::vars::{self, FlatConfig};

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self, verbose: bool, no_color: bool) -> Result<()> {
        let log_level = if verbose {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        match self.config.logging.format.as_str() {
            "compact" => {
                tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .init();
            }
            _ => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(!no_color)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the application with parsed arguments
    pub fn run(&self, args: Args) -> Result<()> {
        // The experiment's VERBOSE flag raises the log level too, so variables
        // are loaded before logging starts.
        let experiment_vars = match &args.command {
            Commands::Generate { var_defns, .. } | Commands::Tasks { var_defns, .. } => {
                Some(vars::load_config(var_defns).map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to load experiment variables from {}: {}",
                        var_defns.display(),
                        e
                    )
                })?)
            }
            Commands::Fill { .. } => None,
        };

        let verbose = args.verbose || experiment_vars.as_ref().is_some_and(experiment_verbose);
        self.init_logging(verbose, args.no_color)?;

        debug!("ecfgen v{}", env!("CARGO_PKG_VERSION"));
        debug!("Configuration loaded from: {:?}", args.config);

        match (args.command, experiment_vars) {
            (Commands::Generate { tasks, dry_run, .. }, Some(flat)) => {
                commands::generate(flat, tasks, dry_run, &self.config)
            }
            (Commands::Tasks { tasks, .. }, Some(flat)) => {
                commands::list_tasks(flat, tasks, &self.config)
            }
            (
                Commands::Fill {
                    template,
                    output,
                    settings,
                    settings_files,
                },
                _,
            ) => commands::fill(template, output, settings, settings_files),
            _ => Err(anyhow::anyhow!("Experiment variables were not loaded")),
        }
    }

    /// Create application from command line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let config = Config::load(args.config.clone())?;
        Ok(Self::new(config))
    }
}

fn experiment_verbose(flat: &FlatConfig) -> bool {
    flat.flag("VERBOSE").unwrap_or(false)
}
