//! The typed request function every network call goes through.
//!
//! Each response carries a tri-part envelope: a machine-readable `code`, a
//! human `message`, and optional typed `details`.  A non-2xx status always
//! pairs with a non-success code and becomes [`GatewayError::Rejection`].

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use parlor_shared::constants::{API_PREFIX, SESSION_COOKIE};

use crate::error::{GatewayError, Result};

/// The uniform response wrapper used by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    pub message: Option<String>,
    pub details: Option<T>,
}

impl<T> Envelope<T> {
    /// Take `details`, rejecting the envelope when the server omitted a body
    /// the endpoint requires.
    pub fn into_details(self) -> Result<T> {
        self.details.ok_or_else(|| GatewayError::Rejection {
            status: 200,
            code: self.code,
            message: Some("missing response details".to_string()),
        })
    }
}

/// Shared HTTP client for the versioned JSON API.
///
/// Cheap to clone; the underlying connection pool and cookie jar are shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl ApiClient {
    /// Build a client for the given origin, e.g. `https://chat.example.com`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url: Url = base_url
            .parse()
            .map_err(|_| GatewayError::InvalidUrl(base_url.to_string()))?;

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self {
            http,
            base_url,
            jar,
        })
    }

    /// Whether the session cookie is currently present in the jar.
    ///
    /// This is the only place the core looks at the cookie at all; its value
    /// is never read.
    pub fn has_session_cookie(&self) -> bool {
        self.jar
            .cookies(&self.base_url)
            .and_then(|header| header.to_str().map(str::to_owned).ok())
            .map(|cookies| {
                cookies
                    .split(';')
                    .any(|pair| pair.trim().starts_with(SESSION_COOKIE))
            })
            .unwrap_or(false)
    }

    /// Perform one API call and parse the response envelope.
    ///
    /// Business rejections arrive as [`GatewayError::Rejection`] carrying the
    /// envelope's `code` and `message`; transport failures as
    /// [`GatewayError::Http`].  No retry is performed here.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Envelope<T>> {
        let url = self
            .base_url
            .join(&format!("{API_PREFIX}{path}"))
            .map_err(|_| GatewayError::InvalidUrl(format!("{API_PREFIX}{path}")))?;

        debug!(method = %method, path = %path, "API request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            // Non-2xx always pairs with a failure envelope; decode just the
            // code/message half.
            let failure: Envelope<serde_json::Value> = serde_json::from_str(&raw)?;
            debug!(
                status = status.as_u16(),
                code = %failure.code,
                "API request rejected"
            );
            return Err(GatewayError::Rejection {
                status: status.as_u16(),
                code: failure.code,
                message: failure.message,
            });
        }

        Ok(serde_json::from_str(&raw)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<Envelope<T>> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>> {
        self.send(Method::POST, path, None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>> {
        self.send(Method::DELETE, path, None).await
    }
}
