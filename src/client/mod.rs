//! Landscape API client.
//!
//! `Client::new(base_url, ClientOptions)` -> `Client`
//!
//! Every call issues exactly one HTTP request and never retries. Raw calls
//! return the `reqwest::Response` untouched; `*_with_response` calls read
//! the body into an [`ApiResponse`] with `json200` / `json404` decoded.
//! HTTP error statuses are ordinary results; only transport failures are
//! errors.

mod auth;
mod endpoints;
mod error;
mod legacy;
mod models;
mod query;
mod response;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Request, Response};
use url::Url;

pub use auth::{BearerToken, RequestEditor, StaticHeader};
pub use error::ClientError;
pub use legacy::{ActionOutcome, LEGACY_API_VERSION, LegacyAction, LegacyActionParams};
pub use models::{
    ErrorEnvelope, LegacyActionResult, Script, ScriptAttachment, ScriptCreatedBy, ScriptCreator,
    ScriptResult, ScriptType, ScriptV1, ScriptV2,
};
pub use query::QueryValues;
pub use response::{ApiResponse, NoContent};

/// First path segment of every endpoint, below the base URL.
const API_PREFIX: &str = "api";

/// Construction options: transport, request editors and timeout.
#[derive(Clone, Default)]
pub struct ClientOptions {
    http_client: Option<reqwest::Client>,
    editors: Vec<Arc<dyn RequestEditor>>,
    timeout: Option<Duration>,
}

impl ClientOptions {
    /// Use a caller-owned transport (connection pool, TLS roots, proxies).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Add an editor applied to every request, in insertion order.
    pub fn with_request_editor(mut self, editor: impl RequestEditor + 'static) -> Self {
        self.editors.push(Arc::new(editor));
        self
    }

    /// Per-request deadline covering connect through body.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("http_client", &self.http_client.is_some())
            .field("editors", &self.editors.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Handle to one Landscape server. Cheap to clone; holds no mutable state.
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    editors: Vec<Arc<dyn RequestEditor>>,
    timeout: Option<Duration>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("editors", &self.editors.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Client {
    /// Create a client for `base_url` (e.g. `https://landscape.example.com`).
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self, ClientError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ClientError::Validation("base URL is empty".into()));
        }
        let base_url = Url::parse(trimmed)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Validation(format!(
                "base URL cannot carry a path: {trimmed}"
            )));
        }
        Ok(Self {
            base_url,
            http: options.http_client.unwrap_or_default(),
            editors: options.editors,
            timeout: options.timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/<segments...>`. Segments are percent-encoded as path
    /// segments; an empty last segment yields a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(API_PREFIX).extend(segments);
        }
        url
    }

    fn build_request(&self, method: Method, url: Url) -> Result<Request, ClientError> {
        let mut request = Request::new(method, url);
        if let Some(timeout) = self.timeout {
            *request.timeout_mut() = Some(timeout);
        }
        for editor in &self.editors {
            editor.edit(&mut request)?;
        }
        Ok(request)
    }

    async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, "sending request");
        let response = self.http.execute(request).await.map_err(|e| {
            tracing::debug!(%method, %path, error = %e, "transport failure");
            ClientError::Transport(e)
        })?;
        tracing::debug!(%method, %path, status = %response.status(), "received response");
        Ok(response)
    }
}
