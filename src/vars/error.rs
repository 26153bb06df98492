// ABOUTME: Error types for experiment configuration loading
// ABOUTME: Covers unreadable files, malformed shell lines, and missing or mistyped keys

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VarsError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Malformed shell assignment on line {line}: {content}")]
    MalformedLine { line: usize, content: String },

    #[error("Unterminated array for '{key}' starting on line {line}")]
    UnterminatedArray { key: String, line: usize },

    #[error("Missing required configuration variable: {0}")]
    MissingKey(String),

    #[error("Configuration variable '{key}' is not a valid {expected}: '{value}'")]
    InvalidValue {
        key: String,
        expected: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, VarsError>;
