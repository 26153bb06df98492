// ABOUTME: Configuration management for the ecfgen application
// ABOUTME: Loads logging, resource defaults, link fan-out, and task naming rules from YAML and env

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::generate::{default_link_specs, GenerateOptions, LinkSpec};
use crate::parser::{ResolverRules, DEFAULT_MEMORY};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub defaults: ResourceDefaults,

    #[serde(default = "default_link_specs")]
    pub links: Vec<LinkSpec>,

    #[serde(default)]
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceDefaults {
    pub memory: String,
    pub threads: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub ics_task: String,
    pub ens_post_metatask: String,
    pub ens_post_task: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            defaults: ResourceDefaults::default(),
            links: default_link_specs(),
            rules: RulesConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for ResourceDefaults {
    fn default() -> Self {
        Self {
            memory: DEFAULT_MEMORY.to_string(),
            threads: 1,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        let rules = ResolverRules::default();
        Self {
            ics_task: rules.ics_task,
            ens_post_metatask: rules.ens_post_metatask,
            ens_post_task: rules.ens_post_task,
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_yaml::from_str(&contents)?
        } else {
            Config::default()
        };

        config.merge_env();
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> PathBuf {
        let possible_paths = vec![
            PathBuf::from("ecfgen.yaml"),
            PathBuf::from("ecfgen.yml"),
            PathBuf::from(".ecfgen.yaml"),
            PathBuf::from(".ecfgen.yml"),
        ];

        for path in possible_paths {
            if path.exists() {
                return path;
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".ecfgen").join("config.yaml");
            if home_config.exists() {
                return home_config;
            }
        }

        // Return default path (may not exist)
        PathBuf::from("ecfgen.yaml")
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) {
        if let Ok(level) = std::env::var("ECFGEN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ECFGEN_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn resolver_rules(&self) -> ResolverRules {
        ResolverRules {
            ics_task: self.rules.ics_task.clone(),
            ens_post_metatask: self.rules.ens_post_metatask.clone(),
            ens_post_task: self.rules.ens_post_task.clone(),
            default_memory: self.defaults.memory.clone(),
        }
    }

    pub fn generate_options(&self, dry_run: bool) -> GenerateOptions {
        GenerateOptions {
            rules: self.resolver_rules(),
            default_threads: self.defaults.threads,
            links: self.links.clone(),
            dry_run,
        }
    }
}
