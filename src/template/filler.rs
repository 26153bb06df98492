// ABOUTME: File-level template filler: template path + settings -> output file
// ABOUTME: Reads a template, renders it with the given settings, and writes the result

use std::path::Path;
use tracing::debug;

use super::context::TemplateSettings;
use super::engine::TemplateEngine;
use super::error::{Result, TemplateError};

#[derive(Clone, Default)]
pub struct TemplateFiller {
    engine: TemplateEngine,
}

impl TemplateFiller {
    pub fn new() -> Self {
        Self {
            engine: TemplateEngine::new(),
        }
    }

    /// Render the template at `template_path` without writing anything.
    pub fn render_file(&self, template_path: &Path, settings: &TemplateSettings) -> Result<String> {
        let template =
            std::fs::read_to_string(template_path).map_err(|source| TemplateError::ReadTemplate {
                path: template_path.to_path_buf(),
                source,
            })?;
        self.engine.render(&template, settings)
    }

    /// Render `template_path` and write it to `output_path`, creating parent
    /// directories and replacing any existing file.
    pub fn fill(
        &self,
        template_path: &Path,
        output_path: &Path,
        settings: &TemplateSettings,
    ) -> Result<()> {
        let rendered = self.render_file(template_path, settings)?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| TemplateError::WriteOutput {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(output_path, &rendered).map_err(|source| TemplateError::WriteOutput {
            path: output_path.to_path_buf(),
            source,
        })?;

        debug!(
            "Filled {} -> {} ({} bytes)",
            template_path.display(),
            output_path.display(),
            rendered.len()
        );
        Ok(())
    }
}
