use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use crate::config::{EngineConfig, Scheme};
use crate::types::{Credential, Details, ProbeOutcome, ProbeReport};

/// One classified login attempt against one target.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &str, credential: &Credential) -> ProbeReport;
}

/// Why a `/v2` request did not come back as `200 {}`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    UnexpectedStatus(StatusCode),
    #[error("unexpected response body: {0}")]
    UnexpectedBody(String),
}

/// Turn a failure description into an outcome.
///
/// A failure is a denial only when its text mentions both `401` and
/// `Unauthorized`; everything else is an error carrying the text. This is the
/// only place that looks at failure text.
pub fn classify_failure(message: &str) -> ProbeOutcome {
    if message.contains("401") && message.contains("Unauthorized") {
        ProbeOutcome::Denied
    } else {
        ProbeOutcome::Error(message.to_owned())
    }
}

/// `Basic base64(user:pass)`, or `None` for the anonymous credential.
pub fn basic_auth_header(credential: &Credential) -> Option<String> {
    if credential.is_anonymous() {
        return None;
    }
    let raw = format!("{}:{}", credential.username, credential.password);
    Some(format!("Basic {}", STANDARD.encode(raw)))
}

/// Probes the Docker Registry HTTP API v2 root (and optionally its catalog).
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    scheme: Scheme,
    capture_details: bool,
}

impl HttpProbe {
    /// Registries are commonly fronted by self-signed certificates, so
    /// certificate and hostname checks are off.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;
        Ok(Self {
            client,
            scheme: config.scheme,
            capture_details: config.capture_details,
        })
    }

    fn url(&self, target: &str, path: &str) -> String {
        format!("{}://{}{}", self.scheme, target.trim_end_matches('/'), path)
    }

    async fn get(
        &self,
        url: &str,
        auth: Option<&str>,
    ) -> std::result::Result<reqwest::Response, ProbeError> {
        let mut req = self.client.get(url);
        if let Some(value) = auth {
            req = req.header(AUTHORIZATION, value);
        }
        Ok(req.send().await?.error_for_status()?)
    }

    async fn check_root(
        &self,
        target: &str,
        auth: Option<&str>,
    ) -> std::result::Result<(), ProbeError> {
        let resp = self.get(&self.url(target, "/v2"), auth).await?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ProbeError::UnexpectedStatus(status));
        }
        let body: serde_json::Value = resp.json().await?;
        match body.as_object() {
            Some(map) if map.is_empty() => Ok(()),
            _ => Err(ProbeError::UnexpectedBody(body.to_string())),
        }
    }

    async fn catalog(
        &self,
        target: &str,
        auth: Option<&str>,
    ) -> std::result::Result<serde_json::Value, ProbeError> {
        let resp = self.get(&self.url(target, "/v2/_catalog"), auth).await?;
        Ok(resp.json().await?)
    }

    /// Catalog failures only cost the details, never the login.
    async fn fetch_details(&self, target: &str, auth: Option<&str>) -> Option<Details> {
        match self.catalog(target, auth).await {
            Ok(repositories) => Some(Details { repositories }),
            Err(e) => {
                debug!(registry = %target, error = %e, "catalog fetch failed");
                None
            }
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, target: &str, credential: &Credential) -> ProbeReport {
        let start = Instant::now();
        let auth = basic_auth_header(credential);
        let outcome = match self.check_root(target, auth.as_deref()).await {
            Ok(()) => {
                let details = if self.capture_details {
                    self.fetch_details(target, auth.as_deref()).await
                } else {
                    None
                };
                ProbeOutcome::Authorized(details)
            }
            Err(e) => classify_failure(&e.to_string()),
        };
        ProbeReport {
            outcome,
            elapsed: start.elapsed(),
        }
    }
}
