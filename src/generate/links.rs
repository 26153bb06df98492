// ABOUTME: Link generator for repeated task variants
// ABOUTME: Fans one rendered job card out to zero-padded per-hour or per-split script names

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::{GenerateError, Result};
use super::experiment::{script_file_name, Experiment};
use crate::vars::{FlatConfig, VarsError};

/// One rendered script served under many numbered names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub group: String,
    /// Script name without the `.ecf` extension.
    pub script: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    pub width: usize,
    pub count: LinkCount,
}

/// Where the number of links comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkCount {
    /// `max(list) + 1`, e.g. forecast hours 0..=max(FCST_LEN_CYCL)
    MaxPlusOne { key: String },
    /// The integer value itself, e.g. NUM_SPLIT_NEXUS
    Value { key: String },
}

fn default_separator() -> String {
    "_f".to_string()
}

/// Post-processing per forecast hour and NEXUS emission per split.
pub fn default_link_specs() -> Vec<LinkSpec> {
    vec![
        LinkSpec {
            group: "post".to_string(),
            script: "jpost".to_string(),
            separator: default_separator(),
            width: 3,
            count: LinkCount::MaxPlusOne {
                key: "FCST_LEN_CYCL".to_string(),
            },
        },
        LinkSpec {
            group: "nexus".to_string(),
            script: "jnexus_emission".to_string(),
            separator: default_separator(),
            width: 2,
            count: LinkCount::Value {
                key: "NUM_SPLIT_NEXUS".to_string(),
            },
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedLink {
    pub target: PathBuf,
    pub link: PathBuf,
}

impl LinkCount {
    pub fn resolve(&self, config: &FlatConfig) -> Result<u32> {
        match self {
            LinkCount::MaxPlusOne { key } => {
                let values = config.get_u32_list(key)?;
                let max = values
                    .iter()
                    .max()
                    .ok_or_else(|| GenerateError::EmptyLinkCount { key: key.clone() })?;
                let count = max.checked_add(1).ok_or_else(|| VarsError::InvalidValue {
                    key: key.clone(),
                    expected: "list of forecast lengths below 4294967295",
                    value: max.to_string(),
                })?;
                Ok(count)
            }
            LinkCount::Value { key } => Ok(config.get_u32(key)?),
        }
    }
}

impl LinkSpec {
    pub fn link_name(&self, index: u32) -> String {
        script_file_name(&format!(
            "{}{}{:0width$}",
            self.script,
            self.separator,
            index,
            width = self.width
        ))
    }

    /// Every link this spec produces, in index order.
    pub fn plan(&self, config: &FlatConfig, experiment: &Experiment) -> Result<Vec<PlannedLink>> {
        let count = self.count.resolve(config)?;
        let target = experiment.script_output(&self.group, &self.script);
        let dir = experiment.scripts_dir(&self.group);

        Ok((0..count)
            .map(|index| PlannedLink {
                target: target.clone(),
                link: dir.join(self.link_name(index)),
            })
            .collect())
    }
}
