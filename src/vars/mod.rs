// ABOUTME: Experiment configuration module
// ABOUTME: Loads shell-style or YAML variable definitions into one flat key/value map

pub mod error;
pub mod flatten;
pub mod shell;
pub mod value;

pub use error::{Result, VarsError};
pub use flatten::flatten;
pub use shell::parse_shell;
pub use value::{ConfigValue, FlatConfig};

use std::path::Path;
use tracing::debug;

/// Load an experiment configuration file.
///
/// Files ending in `.yaml`/`.yml` are parsed as YAML and flattened; anything
/// else is read as shell variable assignments (`var_defns.sh`).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FlatConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );

    let config = if is_yaml {
        let value: serde_yaml::Value = serde_yaml::from_str(&content)?;
        flatten(&value)
    } else {
        parse_shell(&content)?
    };

    debug!(
        "Loaded {} configuration variables from {}",
        config.len(),
        path.display()
    );
    Ok(config)
}
