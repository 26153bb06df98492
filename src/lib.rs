// ABOUTME: Main library module for the ecfgen ecFlow job card generator
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod generate;
pub mod parser;
pub mod template;
pub mod vars;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use generate::{GenerateOptions, GenerationReport, Generator};
pub use parser::{TaskWorkflow, WorkflowResolver};
pub use template::{TemplateFiller, TemplateSettings};
pub use vars::{load_config, FlatConfig};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
