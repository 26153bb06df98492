// ABOUTME: Parser module for workflow-manager task documents
// ABOUTME: Exports task descriptors, naming rules, and the task group resolver

pub mod error;
pub mod task;
pub mod workflow;

pub use error::{ParserError, Result};
pub use task::{task_name, TaskDescriptor, DEFAULT_MEMORY};
pub use workflow::{ResolvedTask, ResolverRules, TaskWorkflow, WorkflowResolver};
