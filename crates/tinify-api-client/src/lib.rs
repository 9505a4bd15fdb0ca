//! HTTP client for the Tinify image optimization service.
//!
//! Provides a minimal client that forwards the session credential on every call,
//! the stage/submit/retrieve operations, the completion event stream, input
//! resolution, and the [`Optimizer`] that sequences them end to end.
//! The MCP server and the CLI use this crate directly.

pub mod api;
pub mod events;
pub mod input;
pub mod optimize;

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, RequestBuilder, Response};
use tinify_core::{TinifyConfig, TinifyError, TinifyResult};

/// Header carrying the reusable session credential.
pub const SESSION_HEADER: &str = "X-Session-Token";

/// HTTP client for the Tinify service.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String, request_timeout: Duration) -> TinifyResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("tinify-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &TinifyConfig) -> TinifyResult<Self> {
        Self::new(config.base_url.clone(), config.request_timeout)
    }

    /// Create client from environment: TINIFY_API_URL (or API_URL).
    pub fn from_env() -> anyhow::Result<Self> {
        let config = TinifyConfig::from_env()?;
        Self::from_config(&config).context("Failed to create HTTP client")
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_credential(&self, request: RequestBuilder, credential: Option<&str>) -> RequestBuilder {
        match credential {
            Some(token) if !token.is_empty() => request.header(SESSION_HEADER, token),
            _ => request,
        }
    }

    /// Raw client for requests outside the service (e.g. fetching remote inputs).
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Body of a non-success service response.
#[derive(Debug, Default)]
pub(crate) struct ErrorBody {
    pub detail: Option<String>,
    pub credits_required: Option<u32>,
}

impl ErrorBody {
    /// Read the JSON error body. Non-JSON bodies yield an empty `ErrorBody`.
    pub(crate) async fn read(response: Response) -> Self {
        let value: serde_json::Value = match response.json().await {
            Ok(value) => value,
            Err(_) => return Self::default(),
        };
        Self {
            detail: value
                .get("detail")
                .and_then(|d| d.as_str())
                .map(str::to_string),
            credits_required: value
                .get("credits_required")
                .and_then(|c| c.as_u64())
                .and_then(|c| u32::try_from(c).ok()),
        }
    }

    pub(crate) fn into_remote_failure(self, status: u16, fallback: &str) -> TinifyError {
        TinifyError::RemoteRequestFailed {
            status,
            detail: self
                .detail
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

// Re-export commonly used types for convenience.
pub use events::EventStream;
pub use input::InputResolver;
pub use optimize::{OptimizeRequest, Optimizer};
pub use tinify_core::models::{
    ArtifactBytes, CompletionEvent, JobHandle, OptimizationResult, ProcessingSettings,
    SubmissionResult, UploadHandle,
};
