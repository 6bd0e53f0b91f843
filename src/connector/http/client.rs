use std::fmt;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, error};

use super::retry::{with_retry, RetryPolicy, RetryResult, Retryable};
use crate::domain::ConnectorError;

/// Health probes use this timeout no matter how the connector is configured,
/// so a slow provider cannot stall liveness checks.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// A file sent as one `multipart/form-data` field.
#[derive(Debug, Clone)]
pub struct MultipartUpload {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    Multipart(MultipartUpload),
}

/// One logical request. It is rebuilt for every attempt, so it must be
/// reusable: bodies are owned data, not streams.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub method: Method,
    pub endpoint: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub payload: Option<Payload>,
}

impl CallRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            headers: Vec::new(),
            query: Vec::new(),
            payload: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.payload = Some(Payload::Json(body));
        self
    }

    pub fn multipart(mut self, upload: MultipartUpload) -> Self {
        self.payload = Some(Payload::Multipart(upload));
        self
    }
}

/// Why a single attempt failed.
#[derive(Debug)]
enum AttemptError {
    Transport(reqwest::Error),
    Status { status: StatusCode, body: String },
    Body(String),
}

impl Retryable for AttemptError {
    fn is_retryable(&self) -> bool {
        match self {
            AttemptError::Transport(e) => e.is_timeout() || e.is_connect(),
            AttemptError::Status { .. } | AttemptError::Body(_) => false,
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Transport(e) if e.is_timeout() => write!(f, "request timeout: {}", e),
            AttemptError::Transport(e) if e.is_connect() => write!(f, "connection failed: {}", e),
            AttemptError::Transport(e) => write!(f, "request failed: {}", e),
            AttemptError::Status { status, body } if body.is_empty() => write!(f, "HTTP error: {}", status),
            AttemptError::Status { status, body } => write!(f, "HTTP error: {}: {}", status, body),
            AttemptError::Body(msg) => write!(f, "invalid response: {}", msg),
        }
    }
}

/// HTTP client shared by every remote provider of one connector.
///
/// Each attempt is bounded by the connector timeout. Timeouts and failed
/// connections are retried according to the [`RetryPolicy`]; anything else
/// fails on the first occurrence.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    probe_client: reqwest::Client,
    timeout: Duration,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Client with the standard backoff (2s floor, 10s cap).
    pub fn new(timeout: Duration, max_attempts: u32) -> Result<Self, ConnectorError> {
        Self::with_policy(timeout, RetryPolicy::new(max_attempts))
    }

    pub fn with_policy(timeout: Duration, policy: RetryPolicy) -> Result<Self, ConnectorError> {
        let client = build_client(timeout)?;
        let probe_client = reqwest::Client::builder()
            .connect_timeout(HEALTH_CHECK_TIMEOUT)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .build()
            .map_err(|e| ConnectorError::configuration(format!("failed to build probe client: {}", e)))?;

        Ok(Self {
            client,
            probe_client,
            timeout,
            policy,
        })
    }

    /// Same retry policy and probe client, different per-attempt timeout.
    pub fn with_timeout(self, timeout: Duration) -> Result<Self, ConnectorError> {
        Ok(Self {
            client: build_client(timeout)?,
            timeout,
            ..self
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// `call(endpoint, payload, headers, method)`: GET sends the payload's
    /// top-level fields as query parameters, every other method sends it as
    /// a JSON body.
    pub async fn call(
        &self,
        endpoint: &str,
        payload: &Value,
        headers: &[(String, String)],
        method: Method,
    ) -> Result<Value, ConnectorError> {
        let mut request = CallRequest::new(method.clone(), endpoint);
        request.headers = headers.to_vec();

        if method == Method::GET {
            if let Value::Object(fields) = payload {
                for (key, value) in fields {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    request = request.query(key.clone(), value);
                }
            }
        } else {
            request = request.json(payload.clone());
        }

        self.send(&request).await
    }

    /// Send the request with retries and decode the JSON response body.
    pub async fn send(&self, request: &CallRequest) -> Result<Value, ConnectorError> {
        debug!(method = %request.method, endpoint = %request.endpoint, "calling service");

        let outcome = with_retry(&self.policy, |_| self.attempt(&self.client, request)).await;

        match outcome {
            RetryResult::Success(value) => Ok(value),
            RetryResult::Failed { last_error, attempts } => {
                error!(
                    endpoint = %request.endpoint,
                    attempts,
                    "service call failed: {}",
                    last_error
                );
                if last_error.is_retryable() {
                    Err(ConnectorError::connection(format!(
                        "{} after {} attempt(s): {}",
                        request.endpoint, attempts, last_error
                    )))
                } else {
                    Err(ConnectorError::processing(format!("{}: {}", request.endpoint, last_error)))
                }
            }
        }
    }

    async fn attempt(&self, client: &reqwest::Client, request: &CallRequest) -> Result<Value, AttemptError> {
        let builder = Self::build(client, request)?;
        let response = builder.send().await.map_err(AttemptError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Status { status, body });
        }

        let bytes = response.bytes().await.map_err(AttemptError::Transport)?;
        serde_json::from_slice(&bytes).map_err(|e| AttemptError::Body(e.to_string()))
    }

    fn build(client: &reqwest::Client, request: &CallRequest) -> Result<RequestBuilder, AttemptError> {
        let mut builder = client.request(request.method.clone(), &request.endpoint);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.payload {
            None => builder,
            Some(Payload::Json(body)) => builder.json(body),
            Some(Payload::Multipart(upload)) => {
                let part = Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone())
                    .mime_str(&upload.mime)
                    .map_err(|e| AttemptError::Body(format!("invalid upload mime type: {}", e)))?;
                builder.multipart(Form::new().part(upload.field.clone(), part))
            }
        };

        Ok(builder)
    }

    /// Single GET with the fixed health-check timeout and no retries.
    pub async fn probe(&self, url: &str) -> Result<StatusCode, ConnectorError> {
        self.probe_client
            .get(url)
            .send()
            .await
            .map(|response| response.status())
            .map_err(|e| ConnectorError::connection(format!("probe {} failed: {}", url, e)))
    }

    /// Send `request` once with the health-check timeout, for probes that
    /// need a real request body. Any failure is reported as the error
    /// [`send`](Self::send) would give after a single attempt.
    pub async fn probe_send(&self, request: &CallRequest) -> Result<Value, ConnectorError> {
        self.attempt(&self.probe_client, request).await.map_err(|e| {
            if e.is_retryable() {
                ConnectorError::connection(format!("probe {} failed: {}", request.endpoint, e))
            } else {
                ConnectorError::processing(format!("probe {}: {}", request.endpoint, e))
            }
        })
    }

    /// Like [`probe`](Self::probe) but also decodes a JSON body when the
    /// service answers with success.
    pub async fn probe_json(&self, url: &str) -> Result<(StatusCode, Option<Value>), ConnectorError> {
        let response = self
            .probe_client
            .get(url)
            .send()
            .await
            .map_err(|e| ConnectorError::connection(format!("probe {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Ok((status, None));
        }
        let body = response.json::<Value>().await.ok();
        Ok((status, body))
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, ConnectorError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConnectorError::configuration(format!("failed to build HTTP client: {}", e)))
}
