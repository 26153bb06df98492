// ABOUTME: Script renderer turning resolved tasks into ecFlow job cards
// ABOUTME: Builds per-task settings from experiment values and computed resources

use std::path::PathBuf;
use tracing::debug;

use super::error::{GenerateError, Result};
use super::experiment::Experiment;
use super::resources::TaskResources;
use crate::parser::ResolvedTask;
use crate::template::{TemplateFiller, TemplateSettings};

#[derive(Debug, Clone)]
pub struct RenderedScript {
    pub task: String,
    pub path: PathBuf,
    pub content: String,
}

pub struct ScriptRenderer<'a> {
    experiment: &'a Experiment,
    filler: &'a TemplateFiller,
    default_threads: u32,
}

impl<'a> ScriptRenderer<'a> {
    pub fn new(experiment: &'a Experiment, filler: &'a TemplateFiller, default_threads: u32) -> Self {
        Self {
            experiment,
            filler,
            default_threads,
        }
    }

    pub fn settings(&self, task: &ResolvedTask) -> Result<TemplateSettings> {
        let resources = TaskResources::compute(&task.name, &task.descriptor, self.default_threads)?;
        let experiment = self.experiment;

        let mut settings = TemplateSettings::new();
        settings
            .set("exptdir", experiment.exptdir.display().to_string())
            .set("task", task.name.as_str())
            .set("group", task.group.as_str())
            .set("net", experiment.net.as_str())
            .set("run", experiment.run.as_str())
            .set("envir", experiment.envir.as_str())
            .set("model_ver", experiment.model_ver.as_str())
            .set("nnodes", resources.nnodes)
            .set("ppn", resources.ppn)
            .set("threads", resources.threads)
            .set("ncpus", resources.ncpus)
            .set("walltime", resources.walltime)
            .set("memory", resources.memory)
            .set("select", resources.select);
        Ok(settings)
    }

    /// Render the job card for one task. Any failure is reported against the task.
    pub fn render(&self, task: &ResolvedTask) -> Result<RenderedScript> {
        let template = self.experiment.script_template(&task.group, &task.name);
        let settings = self.settings(task)?;

        let content = self
            .filler
            .render_file(&template, &settings)
            .map_err(|source| GenerateError::ScriptRender {
                task: task.name.clone(),
                source,
            })?;

        debug!("Rendered job card for {} from {}", task.name, template.display());

        Ok(RenderedScript {
            task: task.name.clone(),
            path: self.experiment.script_output(&task.group, &task.name),
            content,
        })
    }
}
