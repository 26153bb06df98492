// ABOUTME: Settings for the suite definition file and the ecFlow environment file
// ABOUTME: Definition settings include the resolved groups so templates can iterate them

use serde::Serialize;

use super::error::Result;
use super::experiment::Experiment;
use crate::parser::TaskWorkflow;
use crate::template::TemplateSettings;

#[derive(Debug, Serialize)]
struct GroupEntry<'a> {
    name: &'a str,
    tasks: &'a [String],
}

pub fn definition_settings(
    experiment: &Experiment,
    workflow: &TaskWorkflow,
) -> Result<TemplateSettings> {
    let groups: Vec<GroupEntry> = workflow
        .groups()
        .iter()
        .map(|(name, tasks)| GroupEntry {
            name: name.as_str(),
            tasks: tasks.as_slice(),
        })
        .collect();

    let mut settings = TemplateSettings::new();
    settings
        .set("model_ver", experiment.model_ver.as_str())
        .set("exptdir", experiment.exptdir.display().to_string())
        .set("net", experiment.net.as_str())
        .set("run", experiment.run.as_str())
        .set("envir", experiment.envir.as_str())
        .set("opsroot", experiment.opsroot.as_str());
    settings.set_serialized("groups", &groups)?;
    Ok(settings)
}

pub fn env_settings(experiment: &Experiment) -> TemplateSettings {
    let ecf_home = experiment.ecf_home();

    let mut settings = TemplateSettings::new();
    settings
        .set("ecf_home", ecf_home.as_str())
        .set("ecf_data_root", format!("{}/data", ecf_home))
        .set("ecf_outputdir", format!("{}/output", ecf_home))
        .set("ecf_comdir", format!("{}/com", ecf_home))
        .set("lfs_outputdir", format!("{}/lsf", ecf_home))
        .set("exptdir", experiment.exptdir.display().to_string())
        .set("pdy", experiment.pdy());
    settings
}
