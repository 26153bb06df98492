// ABOUTME: Error types for the generation run
// ABOUTME: Wraps configuration, resolution, template, and filesystem failures with what was being built

use std::path::PathBuf;
use thiserror::Error;

use crate::parser::ParserError;
use crate::template::TemplateError;
use crate::vars::VarsError;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Vars(#[from] VarsError),

    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Call to create the ecFlow job card for '{task}' failed: {source}")]
    ScriptRender {
        task: String,
        #[source]
        source: TemplateError,
    },

    #[error("Call to create the ecFlow definition file failed: {source}")]
    DefinitionRender {
        #[source]
        source: TemplateError,
    },

    #[error("Call to create the ecFlow environment file failed: {source}")]
    EnvRender {
        #[source]
        source: TemplateError,
    },

    #[error("Failed to copy ecFlow include directory {path}: {source}")]
    CopyInclude {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create link {link}: {source}")]
    Link {
        link: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Task '{task}' requests {threads} threads x {ppn} ppn, which overflows ncpus")]
    ResourceOverflow { task: String, ppn: u32, threads: u32 },

    #[error("Link count variable '{key}' is empty")]
    EmptyLinkCount { key: String },
}

pub type Result<T> = std::result::Result<T, GenerateError>;
