// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and the generate, tasks, and fill subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecfgen")]
#[command(about = "Generate ecFlow job cards and suite definitions for cycled forecast experiments")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to ecfgen configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create job cards, links, the suite definition, and the environment file
    Generate {
        #[arg(help = "Path to the experiment variable definitions (var_defns.sh or .yaml)")]
        var_defns: PathBuf,

        #[arg(
            short = 'w',
            long = "tasks",
            help = "Task document(s) listing task groups (default: <PARMdir>/ecflow/tasks.yaml)"
        )]
        tasks: Vec<PathBuf>,

        #[arg(long, help = "Render everything but write nothing")]
        dry_run: bool,
    },

    /// Resolve and print the task table without writing anything
    Tasks {
        #[arg(help = "Path to the experiment variable definitions (var_defns.sh or .yaml)")]
        var_defns: PathBuf,

        #[arg(short = 'w', long = "tasks", help = "Task document(s) listing task groups")]
        tasks: Vec<PathBuf>,
    },

    /// Fill a single template from YAML settings
    Fill {
        #[arg(short, long, help = "Template file")]
        template: PathBuf,

        #[arg(short, long, help = "Output file")]
        output: PathBuf,

        #[arg(
            short = 'u',
            long = "settings",
            help = "Settings as a YAML string, applied last"
        )]
        settings: Option<String>,

        #[arg(
            short = 'y',
            long = "settings-file",
            help = "YAML settings file(s), applied in order"
        )]
        settings_files: Vec<PathBuf>,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
