// ABOUTME: Template engine implementation using Handlebars
// ABOUTME: Renders job cards and definition files in strict mode with shell-safe output

use handlebars::Handlebars;
use serde_json::Value as JsonValue;

use super::context::TemplateSettings;
use super::error::{Result, TemplateError};
use super::helpers;

#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with all built-in helpers.
    ///
    /// Strict mode is on: a template that references a setting which was not
    /// provided fails instead of rendering an empty string.
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        handlebars.set_strict_mode(true);
        handlebars.set_dev_mode(false);

        // Output is shell scripts and ecFlow definitions, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        helpers::register_helpers(&mut handlebars);

        Self { handlebars }
    }

    /// Render a template string with a raw JSON context
    pub fn render_template(&self, template: &str, context: &JsonValue) -> Result<String> {
        self.handlebars
            .render_template(template, context)
            .map_err(TemplateError::HandlebarsError)
    }

    /// Render a template string with template settings
    pub fn render(&self, template: &str, settings: &TemplateSettings) -> Result<String> {
        self.render_template(template, &settings.to_json())
    }

}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
