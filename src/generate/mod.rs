// ABOUTME: Generation pipeline for ecFlow job cards, links, and suite files
// ABOUTME: Runs include copy, task resolution, script rendering, linking, and definition rendering in order

pub mod definition;
pub mod error;
pub mod experiment;
pub mod files;
pub mod links;
pub mod resources;
pub mod scripts;

pub use error::{GenerateError, Result};
pub use experiment::Experiment;
pub use links::{default_link_specs, LinkCount, LinkSpec, PlannedLink};
pub use resources::TaskResources;
pub use scripts::{RenderedScript, ScriptRenderer};

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::parser::{ResolverRules, TaskWorkflow, WorkflowResolver};
use crate::template::{TemplateError, TemplateFiller};
use crate::vars::FlatConfig;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub rules: ResolverRules,
    pub default_threads: u32,
    pub links: Vec<LinkSpec>,
    /// Render everything in memory but write nothing.
    pub dry_run: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            rules: ResolverRules::default(),
            default_threads: 1,
            links: default_link_specs(),
            dry_run: false,
        }
    }
}

/// What a generation run produced (or would produce, for a dry run).
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub include_files: u64,
    pub scripts: Vec<PathBuf>,
    pub links: Vec<PathBuf>,
    pub definition: PathBuf,
    pub env_file: PathBuf,
    pub dry_run: bool,
}

pub struct Generator {
    config: FlatConfig,
    experiment: Experiment,
    options: GenerateOptions,
    filler: TemplateFiller,
}

impl Generator {
    pub fn new(config: FlatConfig, options: GenerateOptions) -> Result<Self> {
        let experiment = Experiment::from_config(&config)?;
        Ok(Self {
            config,
            experiment,
            options,
            filler: TemplateFiller::new(),
        })
    }

    pub fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    /// Task documents to read: the given ones, or the experiment default.
    pub fn task_documents(&self, given: &[PathBuf]) -> Vec<PathBuf> {
        if given.is_empty() {
            vec![self.experiment.default_task_document()]
        } else {
            given.to_vec()
        }
    }

    pub fn resolve_tasks(&self, documents: &[PathBuf]) -> Result<TaskWorkflow> {
        let resolver = WorkflowResolver::new(self.options.rules.clone())
            .with_base_dir(self.experiment.homedir.clone())
            .with_flags(self.experiment.cpl_aqm, self.experiment.coldstart);
        Ok(resolver.resolve(&self.task_documents(documents))?)
    }

    pub fn script_renderer(&self) -> ScriptRenderer<'_> {
        ScriptRenderer::new(&self.experiment, &self.filler, self.options.default_threads)
    }

    /// Every planned link across all link specs, in spec order.
    pub fn plan_links(&self) -> Result<Vec<PlannedLink>> {
        let mut planned = Vec::new();
        for spec in &self.options.links {
            let links = spec.plan(&self.config, &self.experiment)?;
            debug!(
                "Planned {} links for {}/{}",
                links.len(),
                spec.group,
                spec.script
            );
            planned.extend(links);
        }
        Ok(planned)
    }

    /// Run the whole pipeline. The first failure aborts the run.
    ///
    /// Tasks, links and every rendered file are resolved in memory first, so a
    /// bad task document, variable or template leaves the experiment untouched.
    pub fn run(&self, documents: &[PathBuf]) -> Result<GenerationReport> {
        info!(
            "Creating ecFlow job cards and definition files in {}",
            self.experiment.exptdir.display()
        );

        let workflow = self.resolve_tasks(documents)?;
        let links = self.plan_links()?;

        let renderer = self.script_renderer();
        let scripts = workflow
            .tasks()
            .map(|task| {
                info!("Creating ecFlow job card for {}", task.name);
                renderer.render(task)
            })
            .collect::<Result<Vec<_>>>()?;

        let definition_settings = definition::definition_settings(&self.experiment, &workflow)?;
        let definition = self
            .filler
            .render_file(&self.experiment.definition_template(), &definition_settings)
            .map_err(|source| GenerateError::DefinitionRender { source })?;

        let env = self
            .filler
            .render_file(
                &self.experiment.env_template(),
                &definition::env_settings(&self.experiment),
            )
            .map_err(|source| GenerateError::EnvRender { source })?;

        let mut report = GenerationReport {
            dry_run: self.options.dry_run,
            definition: self.experiment.definition_output(),
            env_file: self.experiment.env_output(),
            ..Default::default()
        };

        report.include_files = self.copy_include()?;

        for script in scripts {
            self.write(&script.path, &script.content)
                .map_err(|source| GenerateError::ScriptRender {
                    task: script.task.clone(),
                    source,
                })?;
            report.scripts.push(script.path);
        }

        for planned in links {
            if !self.options.dry_run {
                files::force_symlink(&planned.target, &planned.link).map_err(|source| {
                    GenerateError::Link {
                        link: planned.link.clone(),
                        source,
                    }
                })?;
            }
            report.links.push(planned.link);
        }

        self.write(&report.definition, &definition)
            .map_err(|source| GenerateError::DefinitionRender { source })?;
        self.write(&report.env_file, &env)
            .map_err(|source| GenerateError::EnvRender { source })?;

        info!(
            "Generated {} job cards, {} links, and {}",
            report.scripts.len(),
            report.links.len(),
            report.definition.display()
        );
        Ok(report)
    }

    fn copy_include(&self) -> Result<u64> {
        let source = self.experiment.include_source();
        if !source.is_dir() {
            return Err(GenerateError::CopyInclude {
                path: source,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "include directory does not exist",
                ),
            });
        }
        if self.options.dry_run {
            return Ok(0);
        }

        let copied = files::copy_dir(&source, &self.experiment.include_dest()).map_err(|e| {
            GenerateError::CopyInclude {
                path: source.clone(),
                source: e,
            }
        })?;
        debug!("Copied {} include files from {}", copied, source.display());
        Ok(copied)
    }

    fn write(&self, path: &Path, content: &str) -> std::result::Result<(), TemplateError> {
        if self.options.dry_run {
            info!("Dry run: would write {}", path.display());
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| TemplateError::WriteOutput {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| TemplateError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })
    }
}
