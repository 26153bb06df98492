// ABOUTME: Flattening of nested YAML configuration into a single-level map
// ABOUTME: Leaf keys are lifted to the top level; sequences become list values

use serde_yaml::Value;

use super::value::{ConfigValue, FlatConfig};

/// Flatten a nested YAML document.
///
/// Section mappings disappear and their leaves are lifted to the top level.
/// When two sections define the same leaf key the later one wins.
pub fn flatten(value: &Value) -> FlatConfig {
    let mut config = FlatConfig::new();
    if let Value::Mapping(mapping) = value {
        flatten_into(mapping, &mut config);
    }
    config
}

fn flatten_into(mapping: &serde_yaml::Mapping, config: &mut FlatConfig) {
    for (key, value) in mapping {
        let Some(key) = scalar_to_string(key) else {
            continue;
        };

        match value {
            Value::Mapping(nested) => flatten_into(nested, config),
            Value::Sequence(items) => {
                let items = items.iter().filter_map(scalar_to_string).collect();
                config.insert(key, ConfigValue::List(items));
            }
            Value::Tagged(tagged) => {
                if let Some(s) = scalar_to_string(&tagged.value) {
                    config.insert(key, ConfigValue::Scalar(s));
                }
            }
            other => {
                config.insert(key, ConfigValue::Scalar(scalar_to_string(other).unwrap_or_default()));
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}
