// ABOUTME: Error types for task document parsing and task group resolution
// ABOUTME: Names the offending file, task, or field so a failed run points at its source

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to read task document {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse task document {path}: {source}")]
    YamlError {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid task document format: {0}")]
    InvalidFormat(String),

    #[error("Task '{task}' is missing required field '{field}'")]
    MissingField { task: String, field: String },

    #[error("Task '{task}' has an invalid '{field}' value: {value}")]
    InvalidField {
        task: String,
        field: String,
        value: String,
    },

    #[error("Task group file {path} includes itself through taskgroups")]
    GroupCycle { path: PathBuf },

    #[error("No tasks found in task documents")]
    EmptyWorkflow,
}

pub type Result<T> = std::result::Result<T, ParserError>;
