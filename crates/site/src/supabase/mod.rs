//! Hosted backend (Supabase) API clients.
//!
//! # Architecture
//!
//! - Supabase is source of truth - the site holds only a replace-on-refresh
//!   in-memory view of the `listings` table
//! - Typed `reqwest` JSON calls against the project's REST surfaces:
//!   PostgREST (`/rest/v1`), GoTrue auth (`/auth/v1`), Storage (`/storage/v1`)
//! - Change events arrive over the Realtime WebSocket (`/realtime/v1`)
//!
//! Every request carries the project `apikey`; authenticated requests
//! additionally carry the user's access token as a bearer so row-level
//! security applies to writes.

mod auth;
mod realtime;
mod rest;
mod storage;

pub use auth::{AuthSession, AuthUser, SignUpOutcome};
pub use realtime::{ListingChange, realtime_task};
pub use storage::{LISTING_IMAGES_BUCKET, bucket_object_key, object_key_from_url};

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use thiserror::Error;

use crate::config::SupabaseConfig;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Authentication was rejected by the auth provider.
    #[error("Auth error: {0}")]
    Auth(String),

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration produced an unusable endpoint.
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),

    /// Realtime WebSocket transport failed.
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

/// Client for the hosted Supabase project.
///
/// Cheaply cloneable via `Arc`. One instance is shared across all handlers
/// and the realtime subscription task.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a new client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build (e.g., the anon key
    /// is not a valid header value).
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.anon_key)
                .map_err(|e| SupabaseError::Parse(format!("invalid anon key: {e}")))?,
        );

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                http,
                base_url: config.url.trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
            }),
        })
    }

    /// The project base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The project anon key.
    #[must_use]
    pub(crate) fn anon_key(&self) -> &str {
        &self.inner.anon_key
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Bearer value for a request: the user's access token when present,
    /// the anon key otherwise.
    pub(crate) fn bearer(&self, access_token: Option<&str>) -> String {
        format!("Bearer {}", access_token.unwrap_or(&self.inner.anon_key))
    }
}

/// Read an error body and convert a non-success response into `SupabaseError`.
pub(crate) async fn error_for_response(response: reqwest::Response) -> SupabaseError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    SupabaseError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SupabaseError::NotFound("listing 123".to_string());
        assert_eq!(err.to_string(), "Not found: listing 123");

        let err = SupabaseError::Api {
            status: 403,
            message: "permission denied".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 403 - permission denied");
    }

    #[test]
    fn test_bearer_prefers_access_token() {
        let client = SupabaseClient::new(&SupabaseConfig {
            url: "https://test-project.supabase.co/".to_string(),
            anon_key: "anon".to_string(),
        })
        .expect("client");

        assert_eq!(client.bearer(Some("user-token")), "Bearer user-token");
        assert_eq!(client.bearer(None), "Bearer anon");
        // trailing slash trimmed
        assert_eq!(client.base_url(), "https://test-project.supabase.co");
    }
}
