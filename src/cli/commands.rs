// ABOUTME: Command implementations for the ecfgen CLI
// ABOUTME: Handles execution of the generate, tasks, and fill commands

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use super::config::Config;
use crate::generate::{Generator, TaskResources};
use crate::template::{TemplateFiller, TemplateSettings};
use crate::vars::FlatConfig;

/// Generate job cards, links, the suite definition, and the env file
pub fn generate(
    experiment_vars: FlatConfig,
    tasks: Vec<PathBuf>,
    dry_run: bool,
    config: &Config,
) -> Result<()> {
    let generator = Generator::new(experiment_vars, config.generate_options(dry_run))
        .map_err(|e| anyhow::anyhow!("Invalid experiment configuration: {}", e))?;

    let report = generator
        .run(&tasks)
        .map_err(|e| anyhow::anyhow!("Generation failed: {}", e))?;

    let prefix = if report.dry_run { "Would generate" } else { "Generated" };
    println!(
        "{} {} job cards and {} links under {}",
        prefix,
        report.scripts.len(),
        report.links.len(),
        generator.experiment().ecf_dir().display()
    );
    println!("  Definition: {}", report.definition.display());
    println!("  Environment: {}", report.env_file.display());
    if !report.dry_run {
        println!("  Include files copied: {}", report.include_files);
    }

    info!("Generation completed");
    Ok(())
}

/// Resolve task documents and print one row per task
pub fn list_tasks(experiment_vars: FlatConfig, tasks: Vec<PathBuf>, config: &Config) -> Result<()> {
    let generator = Generator::new(experiment_vars, config.generate_options(true))
        .map_err(|e| anyhow::anyhow!("Invalid experiment configuration: {}", e))?;

    let workflow = generator
        .resolve_tasks(&tasks)
        .map_err(|e| anyhow::anyhow!("Failed to resolve tasks: {}", e))?;

    println!(
        "{:<16} {:<28} {:>6} {:>5} {:>7} {:>6} {:>10} {:>7}",
        "GROUP", "TASK", "NODES", "PPN", "THREADS", "NCPUS", "WALLTIME", "MEMORY"
    );
    for task in workflow.tasks() {
        let resources =
            TaskResources::compute(&task.name, &task.descriptor, config.defaults.threads)
                .map_err(|e| anyhow::anyhow!("Invalid task resources: {}", e))?;
        println!(
            "{:<16} {:<28} {:>6} {:>5} {:>7} {:>6} {:>10} {:>7}",
            task.group,
            task.name,
            resources.nnodes,
            resources.ppn,
            resources.threads,
            resources.ncpus,
            resources.walltime,
            resources.memory
        );
    }

    info!(
        "Resolved {} tasks in {} groups",
        workflow.len(),
        workflow.groups().len()
    );
    Ok(())
}

/// Fill one template from settings files and an inline YAML string
pub fn fill(
    template: PathBuf,
    output: PathBuf,
    settings: Option<String>,
    settings_files: Vec<PathBuf>,
) -> Result<()> {
    let settings = collect_settings(settings.as_deref(), &settings_files)?;

    TemplateFiller::new()
        .fill(&template, &output, &settings)
        .map_err(|e| anyhow::anyhow!("Failed to fill {}: {}", template.display(), e))?;

    info!("Wrote {}", output.display());
    Ok(())
}

/// Files apply in order, then the inline string overrides them.
fn collect_settings(inline: Option<&str>, files: &[PathBuf]) -> Result<TemplateSettings> {
    let mut settings = TemplateSettings::new();

    for path in files {
        let loaded = TemplateSettings::from_yaml_file(path).map_err(|e| {
            anyhow::anyhow!("Failed to load settings file '{}': {}", path.display(), e)
        })?;
        settings.merge(loaded);
    }

    if let Some(inline) = inline {
        let loaded = TemplateSettings::from_yaml_str(inline)
            .map_err(|e| anyhow::anyhow!("Invalid settings string: {}", e))?;
        settings.merge(loaded);
    }

    Ok(settings)
}
