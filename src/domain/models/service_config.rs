use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::ConnectorError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Setting names whose values must never leave a connector.
pub const SENSITIVE_KEYS: [&str; 5] = ["api_key", "secret_key", "password", "token", "access_token"];

/// Configuration of one service connector:
/// `{provider, timeout, max_retries, <provider>: {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceConfig(Map<String, Value>);

impl ServiceConfig {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Build a config for `provider` with its provider-specific section.
    pub fn for_provider(provider: impl Into<String>, settings: ProviderSettings) -> Self {
        let provider = provider.into();
        let mut map = Map::new();
        map.insert(provider.clone(), Value::Object(settings.into_map()));
        map.insert("provider".to_string(), Value::String(provider));
        Self(map)
    }

    pub fn from_value(value: Value) -> Result<Self, ConnectorError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ConnectorError::configuration(format!(
                "service configuration must be a table, got {}",
                value_type(&other)
            ))),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.0.insert("timeout".to_string(), Value::from(secs));
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.0.insert("max_retries".to_string(), Value::from(retries));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn provider(&self) -> Option<&str> {
        self.0
            .get("provider")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn timeout(&self) -> Result<Duration, ConnectorError> {
        let secs = read_f64(&self.0, "timeout")?.unwrap_or(DEFAULT_TIMEOUT_SECS as f64);
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ConnectorError::configuration(format!(
                "timeout must be a positive number of seconds, got {}",
                secs
            )));
        }
        Duration::try_from_secs_f64(secs)
            .map_err(|e| ConnectorError::configuration(format!("invalid timeout {}: {}", secs, e)))
    }

    pub fn max_retries(&self) -> Result<u32, ConnectorError> {
        match read_i64(&self.0, "max_retries")? {
            None => Ok(DEFAULT_MAX_RETRIES),
            Some(n) if (0..=i64::from(u32::MAX)).contains(&n) => Ok(n as u32),
            Some(n) => Err(ConnectorError::configuration(format!(
                "max_retries must be a non-negative integer, got {}",
                n
            ))),
        }
    }

    /// The section named after the selected provider, or empty settings.
    pub fn provider_settings(&self) -> ProviderSettings {
        self.provider()
            .and_then(|name| self.0.get(name))
            .and_then(|v| v.as_object())
            .cloned()
            .map(ProviderSettings::new)
            .unwrap_or_default()
    }

    /// Key-order independent JSON rendering of the whole (nested) config.
    pub fn canonical_json(&self) -> String {
        canonicalize(&Value::Object(self.0.clone())).to_string()
    }
}

impl From<Map<String, Value>> for ServiceConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Provider-specific settings (the `<provider>` section of a [`ServiceConfig`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderSettings(Map<String, Value>);

impl ProviderSettings {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn str_or(&self, key: &str, default: &str) -> String {
        self.get_str(key).unwrap_or(default).to_string()
    }

    pub fn required_str(&self, key: &str) -> Result<&str, ConnectorError> {
        self.get_str(key)
            .ok_or_else(|| ConnectorError::configuration(format!("{} is required", key)))
    }

    pub fn i64_or(&self, key: &str, default: i64) -> Result<i64, ConnectorError> {
        Ok(read_i64(&self.0, key)?.unwrap_or(default))
    }

    pub fn usize_or(&self, key: &str, default: usize) -> Result<usize, ConnectorError> {
        match read_i64(&self.0, key)? {
            None => Ok(default),
            Some(n) if n > 0 => Ok(n as usize),
            Some(n) => Err(ConnectorError::configuration(format!(
                "{} must be a positive integer, got {}",
                key, n
            ))),
        }
    }

    pub fn f64_or(&self, key: &str, default: f64) -> Result<f64, ConnectorError> {
        Ok(read_f64(&self.0, key)?.unwrap_or(default))
    }

    /// Copy of the settings with every sensitive key removed, at any depth.
    pub fn redacted(&self) -> Map<String, Value> {
        redact_map(&self.0)
    }
}

fn redact_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(k, _)| !is_sensitive_key(k))
        .map(|(k, v)| (k.clone(), redact_value(v)))
        .collect()
}

fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(redact_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        other => other.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.contains(&key.as_str())
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

// Numbers may arrive as strings after `${VAR}` expansion in the config file.
fn read_i64(map: &Map<String, Value>, key: &str) -> Result<Option<i64>, ConnectorError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| ConnectorError::configuration(format!("{} must be an integer", key))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ConnectorError::configuration(format!("{} must be an integer, got '{}'", key, s))),
        Some(other) => Err(ConnectorError::configuration(format!(
            "{} must be an integer, got {}",
            key,
            value_type(other)
        ))),
    }
}

fn read_f64(map: &Map<String, Value>, key: &str) -> Result<Option<f64>, ConnectorError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ConnectorError::configuration(format!("{} must be a number, got '{}'", key, s))),
        Some(other) => Err(ConnectorError::configuration(format!(
            "{} must be a number, got {}",
            key,
            value_type(other)
        ))),
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> ServiceConfig {
        ServiceConfig::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_when_absent() {
        let cfg = config(json!({"provider": "internal"}));
        assert_eq!(cfg.timeout().unwrap(), Duration::from_secs(30));
        assert_eq!(cfg.max_retries().unwrap(), 3);
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let cfg = config(json!({"provider": "x", "timeout": "12", "max_retries": "5"}));
        assert_eq!(cfg.timeout().unwrap(), Duration::from_secs(12));
        assert_eq!(cfg.max_retries().unwrap(), 5);
    }

    #[test]
    fn test_invalid_timeout_is_configuration_error() {
        let cfg = config(json!({"provider": "x", "timeout": -1}));
        assert!(cfg.timeout().unwrap_err().is_configuration());

        let cfg = config(json!({"provider": "x", "timeout": "soon"}));
        assert!(cfg.timeout().unwrap_err().is_configuration());
    }

    #[test]
    fn test_provider_settings_selects_named_section() {
        let cfg = config(json!({
            "provider": "ollama",
            "ollama": {"model_name": "nomic-embed-text"},
            "openai": {"api_key": "sk-other"}
        }));
        let settings = cfg.provider_settings();
        assert_eq!(settings.get_str("model_name"), Some("nomic-embed-text"));
        assert!(settings.get("api_key").is_none());
    }

    #[test]
    fn test_canonical_json_is_order_independent() {
        let a = config(json!({"provider": "hf", "hf": {"a": 1, "b": {"y": 2, "x": 1}}}));
        let mut map = Map::new();
        let mut nested = Map::new();
        nested.insert("b".into(), json!({"x": 1, "y": 2}));
        nested.insert("a".into(), json!(1));
        map.insert("hf".into(), Value::Object(nested));
        map.insert("provider".into(), json!("hf"));
        let b = ServiceConfig::new(map);
        assert_eq!(a.canonical_json(), b.canonical_json());
    }

    #[test]
    fn test_redaction_removes_sensitive_keys_at_any_depth() {
        let settings = ProviderSettings::default()
            .with("api_key", "sk-secret")
            .with("base_url", "https://api.example.com")
            .with("auth", json!({"token": "t0k3n", "user": "svc", "Password": "hunter2"}));

        let redacted = Value::Object(settings.redacted()).to_string();
        assert!(!redacted.contains("sk-secret"));
        assert!(!redacted.contains("t0k3n"));
        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("https://api.example.com"));
        assert!(redacted.contains("svc"));
    }

    #[test]
    fn test_usize_or_rejects_non_positive() {
        let settings = ProviderSettings::default().with("batch_size", 0);
        assert!(settings.usize_or("batch_size", 16).unwrap_err().is_configuration());
        assert_eq!(ProviderSettings::default().usize_or("batch_size", 16).unwrap(), 16);
    }
}
