use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::defaults::{default_document, default_service_config};
use crate::domain::{ConnectorError, ServiceConfig, ServiceType};

pub const DEFAULT_CONFIG_PATH: &str = "config/service_conf.toml";
pub const CONFIG_PATH_ENV: &str = "DOCCONNECT_CONFIG";

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Where a [`ConfigDocument`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::File(path) => write!(f, "{}", path.display()),
            ConfigOrigin::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Parsed service configuration document, one `<service>_service` table per
/// service type.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    origin: ConfigOrigin,
    sections: Map<String, Value>,
}

impl ConfigDocument {
    pub fn defaults() -> Self {
        Self {
            origin: ConfigOrigin::Defaults,
            sections: default_document(),
        }
    }

    /// Read and parse `path`. Never fails: a missing or broken file yields
    /// the built-in defaults and a `config.fallback` warning.
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(doc) => {
                debug!(path = %path.display(), "Loaded service configuration");
                doc
            }
            Err(reason) => {
                warn!(
                    event = "config.fallback",
                    path = %path.display(),
                    reason = %reason,
                    "Using default service configuration"
                );
                Self::defaults()
            }
        }
    }

    pub fn read(path: &Path) -> Result<Self, ConnectorError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConnectorError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut doc = Self::parse(&text)?;
        doc.origin = ConfigOrigin::File(path.to_path_buf());
        Ok(doc)
    }

    /// Parse TOML text after `${VAR}` substitution.
    pub fn parse(text: &str) -> Result<Self, ConnectorError> {
        let expanded = substitute_env(text);
        let value: Value = toml::from_str(&expanded)
            .map_err(|e| ConnectorError::configuration(format!("invalid TOML: {}", e)))?;

        match value {
            Value::Object(sections) => Ok(Self {
                origin: ConfigOrigin::Defaults,
                sections,
            }),
            _ => Err(ConnectorError::configuration("configuration root must be a table")),
        }
    }

    pub fn origin(&self) -> &ConfigOrigin {
        &self.origin
    }

    /// The service's section, or its built-in default when the document has
    /// no usable section for it.
    pub fn service(&self, service: ServiceType) -> ServiceConfig {
        let section = service.config_section();
        match self.sections.get(&section) {
            Some(Value::Object(map)) => ServiceConfig::new(map.clone()),
            Some(_) => {
                warn!(
                    event = "config.fallback",
                    section = %section,
                    reason = "section is not a table",
                    "Using default {} configuration",
                    service
                );
                default_service_config(service)
            }
            None => default_service_config(service),
        }
    }
}

/// Replace every `${NAME}` with the value of environment variable `NAME`.
/// Placeholders naming unset variables are left untouched.
pub fn substitute_env(text: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

/// `explicit`, else `$DOCCONNECT_CONFIG`, else `config/service_conf.toml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}
