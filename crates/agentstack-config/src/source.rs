//! Configuration sources: a JSON file or the process environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::schema;

/// Environment variable naming the JSON config file.
pub const STACK_CONFIG_VAR: &str = "SEMAPHORE_AGENT_STACK_CONFIG";

/// Raw key → string values, independent of where they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationSet {
    values: BTreeMap<String, String>,
}

impl ConfigurationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Snapshot the process environment. Non-UTF-8 variables are skipped.
    pub fn from_process_env() -> Self {
        let values = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { values }
    }

    /// Parse a JSON object. Strings are taken verbatim, numbers and booleans
    /// are rendered to strings, `null` counts as absent.
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Self::parse_json(content, Path::new("<inline>"))
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::ConfigSourceNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_json(&content, path)
    }

    fn parse_json(content: &str, path: &Path) -> ConfigResult<Self> {
        let object: serde_json::Map<String, Value> =
            serde_json::from_str(content).map_err(|source| ConfigError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut values = BTreeMap::new();
        for (key, value) in object {
            let rendered = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                // Keys outside the schema are never read, whatever their shape.
                other if schema::spec_for(&key).is_none() => {
                    debug!(key = %key, kind = json_kind(&other), "ignoring non-scalar key outside schema");
                    continue;
                }
                other => {
                    return Err(ConfigError::invalid(&key, other.to_string(), "expected a scalar"));
                }
            };
            values.insert(key, rendered);
        }
        Ok(Self { values })
    }

    /// The value for `key`, treating an empty string as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        _ => "scalar",
    }
}

/// Where raw configuration is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A JSON object stored in a file.
    File(PathBuf),
    /// The ambient process environment.
    Environment,
}

impl ConfigSource {
    /// Pick the source the process environment asks for.
    pub fn detect() -> Self {
        Self::detect_with(|name| std::env::var(name).ok())
    }

    /// Pick a source using `lookup` in place of the process environment.
    pub fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(STACK_CONFIG_VAR).filter(|p| !p.is_empty()) {
            Some(path) => ConfigSource::File(PathBuf::from(path)),
            None => ConfigSource::Environment,
        }
    }

    /// Perform the single read of this source.
    pub fn load(&self) -> ConfigResult<ConfigurationSet> {
        match self {
            ConfigSource::File(path) => {
                info!(path = %path.display(), "using config file");
                ConfigurationSet::from_file(path)
            }
            ConfigSource::Environment => {
                info!("no config file specified, using environment variables");
                Ok(ConfigurationSet::from_process_env())
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConfigSource::File(_) => "file",
            ConfigSource::Environment => "environment",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_reads_as_absent() {
        let set = ConfigurationSet::from_pairs([("A", ""), ("B", "x")]);
        assert_eq!(set.get("A"), None);
        assert_eq!(set.get("B"), Some("x"));
        assert_eq!(set.get("C"), None);
    }

    #[test]
    fn json_scalars_are_rendered() {
        let set = ConfigurationSet::from_json_str(
            r#"{"S": "v", "N": 3, "B": false, "Z": null}"#,
        )
        .unwrap();
        assert_eq!(set.get("S"), Some("v"));
        assert_eq!(set.get("N"), Some("3"));
        assert_eq!(set.get("B"), Some("false"));
        assert_eq!(set.get("Z"), None);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn json_arrays_are_rejected() {
        let err = ConfigurationSet::from_json_str(r#"{"SEMAPHORE_AGENT_SUBNETS": ["a"]}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "SEMAPHORE_AGENT_SUBNETS"));
    }

    #[test]
    fn nested_values_outside_schema_are_ignored() {
        let set = ConfigurationSet::from_json_str(
            r#"{
                "SEMAPHORE_AGENT_STACK_NAME": "s",
                "SEMAPHORE_ORGANIZATION": "acme",
                "SEMAPHORE_AGENT_TOKEN_PARAMETER_NAME": "tok",
                "tags": {"team": "ci"},
                "notes": ["a", "b"]
            }"#,
        )
        .unwrap();
        assert_eq!(set.get("tags"), None);
        assert_eq!(set.get("notes"), None);

        let args = crate::ResolvedArguments::from_set(&set).unwrap();
        assert_eq!(args.stack_name, "s");
    }

    #[test]
    fn environment_source_reads_process_env() {
        let Some((key, value)) = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .find(|(_, v)| !v.is_empty())
        else {
            return;
        };
        let set = ConfigSource::Environment.load().unwrap();
        assert_eq!(set.get(&key), Some(value.as_str()));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ConfigurationSet::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParse { .. }));

        let err = ConfigurationSet::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParse { .. }));
    }

    #[test]
    fn detect_prefers_config_file() {
        let source = ConfigSource::detect_with(|name| {
            (name == STACK_CONFIG_VAR).then(|| "/etc/agent.json".to_string())
        });
        assert_eq!(source, ConfigSource::File(PathBuf::from("/etc/agent.json")));
        assert_eq!(source.kind(), "file");
    }

    #[test]
    fn detect_falls_back_to_environment() {
        assert_eq!(ConfigSource::detect_with(|_| None), ConfigSource::Environment);
        assert_eq!(
            ConfigSource::detect_with(|_| Some(String::new())),
            ConfigSource::Environment
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = ConfigSource::File(path.clone()).load().unwrap_err();
        assert!(matches!(err, ConfigError::ConfigSourceNotFound(p) if p == path));
    }

    #[test]
    fn loads_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.json");
        std::fs::write(&path, r#"{"SEMAPHORE_AGENT_STACK_NAME": "s"}"#).unwrap();

        let set = ConfigSource::File(path).load().unwrap();
        assert_eq!(set.get("SEMAPHORE_AGENT_STACK_NAME"), Some("s"));
    }
}
