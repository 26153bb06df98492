// ABOUTME: Task descriptor structures and task key naming rules
// ABOUTME: Reads per-task resources from YAML and maps task_/enstask_/metatask_ keys to names

use serde::Serialize;
use serde_yaml::Value;

use super::error::{ParserError, Result};

pub const DEFAULT_MEMORY: &str = "2G";

/// Resource request for one task as written in the task document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDescriptor {
    pub nnodes: u32,
    pub ppn: u32,
    pub walltime: String,
    pub memory: String,
    /// Per-task thread override; the renderer falls back to its default when unset.
    pub threads: Option<u32>,
}

/// A key of a task document mapping, classified by its prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKey<'a> {
    Task(String),
    Metatask(&'a str),
}

/// Map a document key to a task name or metatask label.
///
/// `task_` and `enstask_` prefixes name a task, `metatask_` names a group of
/// tasks to descend into. `#mem#` becomes the ecFlow variable `%mem%`.
/// Keys without one of these prefixes are not tasks.
pub fn task_name(key: &str) -> Option<TaskKey<'_>> {
    if let Some(name) = key.strip_prefix("metatask_") {
        Some(TaskKey::Metatask(name))
    } else if let Some(name) = key
        .strip_prefix("task_")
        .or_else(|| key.strip_prefix("enstask_"))
    {
        Some(TaskKey::Task(name.replace("#mem#", "%mem%")))
    } else {
        None
    }
}

impl TaskDescriptor {
    /// Read the resource fields of a task entry.
    ///
    /// `nnodes`, `ppn` and `walltime` must be present. `memory` falls back to
    /// `default_memory`. `threads` may be given directly or through
    /// `envars.OMP_NUM_THREADS`.
    pub fn from_yaml(task: &str, value: &Value, default_memory: &str) -> Result<Self> {
        let mapping = value.as_mapping().ok_or_else(|| {
            ParserError::InvalidFormat(format!("task '{}' must be a mapping", task))
        })?;

        let nnodes = required_u32(task, mapping, "nnodes")?;
        let ppn = required_u32(task, mapping, "ppn")?;

        let walltime = match mapping.get("walltime") {
            Some(value) => scalar_string(value).ok_or_else(|| invalid(task, "walltime", value))?,
            None => return Err(missing(task, "walltime")),
        };

        let memory = match mapping.get("memory") {
            Some(value) => scalar_string(value).ok_or_else(|| invalid(task, "memory", value))?,
            None => default_memory.to_string(),
        };

        let threads = match mapping.get("threads") {
            Some(value) => Some(to_u32(value).ok_or_else(|| invalid(task, "threads", value))?),
            None => match mapping
                .get("envars")
                .and_then(|envars| envars.get("OMP_NUM_THREADS"))
            {
                Some(value) => Some(
                    to_u32(value).ok_or_else(|| invalid(task, "envars.OMP_NUM_THREADS", value))?,
                ),
                None => None,
            },
        };

        Ok(Self {
            nnodes,
            ppn,
            walltime,
            memory,
            threads,
        })
    }
}

fn required_u32(task: &str, mapping: &serde_yaml::Mapping, field: &str) -> Result<u32> {
    let value = mapping.get(field).ok_or_else(|| missing(task, field))?;
    to_u32(value).ok_or_else(|| invalid(task, field, value))
}

fn to_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn missing(task: &str, field: &str) -> ParserError {
    ParserError::MissingField {
        task: task.to_string(),
        field: field.to_string(),
    }
}

fn invalid(task: &str, field: &str, value: &Value) -> ParserError {
    ParserError::InvalidField {
        task: task.to_string(),
        field: field.to_string(),
        value: serde_yaml::to_string(value)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
