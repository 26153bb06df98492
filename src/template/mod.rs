// ABOUTME: Template module for job cards, suite definitions, and environment files
// ABOUTME: Exports the Handlebars engine, settings maps, and the file-level template filler

pub mod context;
pub mod engine;
pub mod error;
pub mod filler;
pub mod helpers;

pub use context::TemplateSettings;
pub use engine::TemplateEngine;
pub use error::{Result, TemplateError};
pub use filler::TemplateFiller;
