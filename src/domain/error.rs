use std::fmt;

use thiserror::Error;

/// Root error for everything the connector framework reports.
///
/// Callers that only care whether a connector call failed can match on the
/// whole enum; callers that need to react to a specific cause match the
/// variant (or use the `is_*` predicates).
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Health check error: {0}")]
    HealthCheck(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Discriminant of [`ConnectorError`], useful for logging and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ProviderNotFound,
    Configuration,
    Connection,
    HealthCheck,
    Processing,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ProviderNotFound => "provider_not_found",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Connection => "connection",
            ErrorKind::HealthCheck => "health_check",
            ErrorKind::Processing => "processing",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ConnectorError {
    pub fn provider_not_found(msg: impl Into<String>) -> Self {
        Self::ProviderNotFound(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn health_check(msg: impl Into<String>) -> Self {
        Self::HealthCheck(msg.into())
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    /// Input rejected before any work was done (bad chunk sizes, empty image...).
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Processing(format!("validation failed: {}", msg.into()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProviderNotFound(_) => ErrorKind::ProviderNotFound,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Connection(_) => ErrorKind::Connection,
            Self::HealthCheck(_) => ErrorKind::HealthCheck,
            Self::Processing(_) => ErrorKind::Processing,
        }
    }

    pub fn is_provider_not_found(&self) -> bool {
        matches!(self, Self::ProviderNotFound(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing(_))
    }

    /// Outward status code used when the error crosses an HTTP-like boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ProviderNotFound(_) => 404,
            Self::Configuration(_) => 400,
            Self::Connection(_) | Self::HealthCheck(_) | Self::Processing(_) => 503,
        }
    }

    /// Classify an arbitrary provider error into the taxonomy.
    ///
    /// Errors that already are a `ConnectorError` keep their kind. Transport
    /// failures from `reqwest` (timeouts, refused connections) become
    /// `Connection`; everything else is a `Processing` failure.
    pub fn classify(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ConnectorError>() {
            Ok(connector_err) => return connector_err,
            Err(other) => other,
        };

        if let Some(req_err) = err.downcast_ref::<reqwest::Error>() {
            if req_err.is_timeout() || req_err.is_connect() {
                return Self::Connection(format!("{:#}", err));
            }
        }

        Self::Processing(format!("{:#}", err))
    }
}
