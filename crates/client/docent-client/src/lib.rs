//! HTTP client for the Docent backend API
//!
//! Every endpoint of the backend is exposed as a typed method on
//! [`ApiClient`]. All requests go through a single wrapper that attaches
//! the session cookie, maps authentication failures to
//! [`DocentError::Unauthorized`] and extracts the backend's `detail`
//! message from error responses.

#![warn(missing_docs)]
#![warn(clippy::all)]

use docent_core::{config, DocentError, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

pub mod admin;
pub mod auth;
pub mod chat;
pub mod documents;
pub mod session_file;
pub mod system;

/// Shared HTTP client for connection pooling
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

/// Get or initialize the shared HTTP client
fn get_http_client(timeout: Duration) -> Client {
    HTTP_CLIENT
        .get_or_init(|| {
            Client::builder()
                .pool_max_idle_per_host(50)
                .pool_idle_timeout(Duration::from_secs(300))
                .tcp_keepalive(Duration::from_secs(60))
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client")
        })
        .clone()
}

/// Name of the cookie the backend issues after OAuth login
pub const SESSION_COOKIE: &str = "session_token";

/// Connection settings for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash
    pub base_url: String,
    /// Session token sent as the `session_token` cookie
    pub session_cookie: Option<String>,
    /// Request timeout applied to the shared HTTP client
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a config for the given base URL with no session
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            session_cookie: None,
            timeout: Duration::from_secs(120),
        }
    }

    /// Build a config from the environment
    ///
    /// Reads `DOCENT_API_URL` (required), `DOCENT_TIMEOUT_SECS` and the
    /// persisted session token from the session file if one exists.
    pub fn from_env() -> Result<Self> {
        let base_url = config::get_required_env("DOCENT_API_URL")?;
        let timeout_secs: u64 = config::get_env_int("DOCENT_TIMEOUT_SECS", 120);
        Ok(Self {
            base_url: normalize_base_url(base_url),
            session_cookie: session_file::load_session(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Set the session token
    pub fn with_session_cookie(mut self, token: impl Into<String>) -> Self {
        self.session_cookie = Some(token.into());
        self
    }
}

fn normalize_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Callback invoked when the backend rejects the session
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Typed client for the Docent backend
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    pub(crate) config: ClientConfig,
    pub(crate) on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    /// Create a client with shared connection pool
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: get_http_client(config.timeout),
            config,
            on_unauthorized: None,
        }
    }

    /// Create a client from the environment
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    /// Register a callback fired whenever a request comes back 401 or 403
    pub fn on_unauthorized(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    /// Current session token, if any
    pub fn session_cookie(&self) -> Option<&str> {
        self.config.session_cookie.as_deref()
    }

    /// Replace the session token for subsequent requests
    pub fn set_session_cookie(&mut self, token: Option<String>) {
        self.config.session_cookie = token;
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Attach the session cookie to a request
    pub(crate) fn with_session(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.session_cookie {
            Some(token) => builder.header(
                reqwest::header::COOKIE,
                format!("{}={}", SESSION_COOKIE, token),
            ),
            None => builder,
        }
    }

    /// Send a request and map error statuses to [`DocentError`]
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let resp = self.with_session(builder).send().await?;
        self.check_status(resp).await
    }

    /// Send a request and deserialize the JSON response body
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let resp = self.send(builder).await?;
        Ok(resp.json::<T>().await?)
    }

    /// Map 401/403 to `Unauthorized` and other error statuses to `Api`
    async fn check_status(&self, resp: Response) -> Result<Response> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(status = status.as_u16(), "session rejected by backend");
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
            return Err(DocentError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DocentError::api(status.as_u16(), extract_detail(status, &body)));
        }
        Ok(resp)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Pull the `detail` field out of an error body, falling back to raw text
fn extract_detail(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.detail;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}
