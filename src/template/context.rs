// ABOUTME: Template settings: the key/value map a template is filled from
// ABOUTME: Built in code or parsed from YAML strings and files, later sources overriding earlier ones

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::path::Path;

use super::error::{Result, TemplateError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateSettings {
    values: Map<String, JsonValue>,
}

impl TemplateSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from a YAML mapping such as `"exptdir: /path\nnet: aqm"`.
    /// An empty string yields empty settings.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        match value {
            serde_yaml::Value::Null => Ok(Self::new()),
            serde_yaml::Value::Mapping(_) => match serde_json::to_value(&value)? {
                JsonValue::Object(values) => Ok(Self { values }),
                _ => Err(TemplateError::InvalidSettings(
                    "settings must be a mapping".to_string(),
                )),
            },
            _ => Err(TemplateError::InvalidSettings(format!(
                "settings must be a mapping, got: {}",
                content.trim()
            ))),
        }
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| TemplateError::ReadTemplate {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml_str(&content)
    }

    pub fn set<V: Into<JsonValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn set_serialized<T: Serialize>(&mut self, key: &str, value: &T) -> Result<&mut Self> {
        self.values
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Merge `other` into these settings; keys from `other` win.
    pub fn merge(&mut self, other: TemplateSettings) {
        self.values.extend(other.values);
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_yaml_str() {
        let settings = TemplateSettings::from_yaml_str("exptdir: /tmp/expt\nnnodes: 2\n").unwrap();

        assert_eq!(settings.get("exptdir"), Some(&json!("/tmp/expt")));
        assert_eq!(settings.get("nnodes"), Some(&json!(2)));
    }

    #[test]
    fn test_empty_and_invalid_yaml() {
        assert!(TemplateSettings::from_yaml_str("").unwrap().is_empty());
        assert!(matches!(
            TemplateSettings::from_yaml_str("- a\n- b\n"),
            Err(TemplateError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = TemplateSettings::new();
        base.set("net", "aqm").set("run", "aqm");

        let mut overrides = TemplateSettings::new();
        overrides.set("run", "rrfs");
        base.merge(overrides);

        assert_eq!(base.get("net"), Some(&json!("aqm")));
        assert_eq!(base.get("run"), Some(&json!("rrfs")));
    }
}
