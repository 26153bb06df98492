// ABOUTME: Flat configuration map and typed accessors over its values
// ABOUTME: Values are shell scalars or lists; accessors coerce to bool, integers, and dates

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;

use super::error::{Result, VarsError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Scalar(String),
    List(Vec<String>),
}

impl ConfigValue {
    pub fn scalar<S: Into<String>>(value: S) -> Self {
        ConfigValue::Scalar(value.into())
    }

    /// Items of the value viewed as a list. A scalar holding a bracketed list
    /// literal such as `[6, 12]` is split; any other scalar is a one-item list.
    pub fn items(&self) -> Vec<String> {
        match self {
            ConfigValue::List(items) => items.clone(),
            ConfigValue::Scalar(s) => match parse_list_literal(s) {
                Some(items) => items,
                None if s.trim().is_empty() => Vec::new(),
                None => vec![s.trim().to_string()],
            },
        }
    }

    fn display(&self) -> String {
        match self {
            ConfigValue::Scalar(s) => s.clone(),
            ConfigValue::List(items) => format!("( {} )", items.join(" ")),
        }
    }
}

/// Read-only, insertion-ordered view of the experiment variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlatConfig {
    values: IndexMap<String, ConfigValue>,
}

impl FlatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<K: Into<String>>(&mut self, key: K, value: ConfigValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn require(&self, key: &str) -> Result<&ConfigValue> {
        self.values
            .get(key)
            .ok_or_else(|| VarsError::MissingKey(key.to_string()))
    }

    pub fn get_str(&self, key: &str) -> Result<&str> {
        match self.require(key)? {
            ConfigValue::Scalar(s) => Ok(s.as_str()),
            other => Err(invalid(key, "string", other)),
        }
    }

    /// Optional string lookup; lists are rejected the same way as in `get_str`.
    pub fn get_opt_str(&self, key: &str) -> Result<Option<&str>> {
        if self.contains_key(key) {
            self.get_str(key).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get_str(key)?;
        parse_bool(value).ok_or_else(|| VarsError::InvalidValue {
            key: key.to_string(),
            expected: "boolean",
            value: value.to_string(),
        })
    }

    /// Boolean flag that reads as `false` when the variable is absent.
    pub fn flag(&self, key: &str) -> Result<bool> {
        if self.contains_key(key) {
            self.get_bool(key)
        } else {
            Ok(false)
        }
    }

    pub fn get_u32(&self, key: &str) -> Result<u32> {
        let value = self.get_str(key)?;
        value.trim().parse().map_err(|_| VarsError::InvalidValue {
            key: key.to_string(),
            expected: "non-negative integer",
            value: value.to_string(),
        })
    }

    pub fn get_u32_list(&self, key: &str) -> Result<Vec<u32>> {
        let value = self.require(key)?;
        value
            .items()
            .iter()
            .map(|item| {
                item.parse().map_err(|_| VarsError::InvalidValue {
                    key: key.to_string(),
                    expected: "list of non-negative integers",
                    value: value.display(),
                })
            })
            .collect()
    }

    /// Parse a cycle date such as `2023060112`, `20230601` or `2023-06-01 12:00:00`.
    pub fn get_datetime(&self, key: &str) -> Result<NaiveDateTime> {
        let value = self.get_str(key)?;
        parse_cycle_date(value).ok_or_else(|| VarsError::InvalidValue {
            key: key.to_string(),
            expected: "cycle date",
            value: value.to_string(),
        })
    }
}

impl FromIterator<(String, ConfigValue)> for FlatConfig {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

fn invalid(key: &str, expected: &'static str, value: &ConfigValue) -> VarsError {
    VarsError::InvalidValue {
        key: key.to_string(),
        expected,
        value: value.display(),
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "TRUE" | "True" | "true" | "YES" | "Yes" | "yes" | "Y" | "y" | "1" => Some(true),
        "FALSE" | "False" | "false" | "NO" | "No" | "no" | "N" | "n" | "0" | "" => Some(false),
        _ => None,
    }
}

/// Split a bracketed list literal (`[6, 12]`, `['a', "b"]`) into its items.
/// Returns `None` when the string is not bracketed.
pub fn parse_list_literal(value: &str) -> Option<Vec<String>> {
    let inner = value.trim().strip_prefix('[')?.strip_suffix(']')?;
    Some(
        inner
            .split(',')
            .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
            .filter(|item| !item.is_empty())
            .collect(),
    )
}

pub(crate) fn parse_cycle_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let all_digits = value.chars().all(|c| c.is_ascii_digit());

    match value.len() {
        8 if all_digits => NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0)),
        10 if all_digits => {
            NaiveDateTime::parse_from_str(&format!("{value}00"), "%Y%m%d%H%M").ok()
        }
        12 if all_digits => NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M").ok(),
        _ => NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
            .ok(),
    }
}
