//! Catalog access token cache
//!
//! One shared slot, owned explicitly and injected into the catalog client.
//! The slot mutex is held across the credential exchange, so concurrent callers
//! that find the token stale wait for a single refresh instead of each issuing
//! their own.

use super::CatalogError;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Tokens are not reused inside this window before expiry
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Client-credentials pair
#[derive(Clone)]
pub struct CatalogCredentials {
    client_id: String,
    client_secret: String,
}

impl CatalogCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }
}

impl fmt::Debug for CatalogCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Bearer token plus its expiry instant
#[derive(Clone)]
pub struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at: Instant) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// `now < expires_at - margin`
    pub fn is_usable(&self, now: Instant, margin: Duration) -> bool {
        now + margin < self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Process-wide catalog token cache
pub struct TokenCache {
    http_client: reqwest::Client,
    auth_url: String,
    credentials: Option<CatalogCredentials>,
    safety_margin: Duration,
    slot: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    /// `credentials = None` is allowed; every `get_token` then fails with
    /// [`CatalogError::Configuration`].
    pub fn new(
        http_client: reqwest::Client,
        auth_url: impl Into<String>,
        credentials: Option<CatalogCredentials>,
    ) -> Self {
        Self {
            http_client,
            auth_url: auth_url.into(),
            credentials,
            safety_margin: DEFAULT_SAFETY_MARGIN,
            slot: Mutex::new(None),
        }
    }

    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Return the cached token, refreshing when absent or near expiry
    pub async fn get_token(&self) -> Result<AccessToken, CatalogError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(CatalogError::Configuration)?;

        let mut slot = self.slot.lock().await;

        if let Some(token) = slot.as_ref() {
            if token.is_usable(Instant::now(), self.safety_margin) {
                return Ok(token.clone());
            }
            debug!("Catalog token inside expiry window, refreshing");
        }

        match self.fetch_token(credentials).await {
            Ok(token) => {
                *slot = Some(token.clone());
                Ok(token)
            }
            Err(e) => {
                *slot = None;
                Err(e)
            }
        }
    }

    /// Drop the cached token so the next caller re-authenticates
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            info!("Catalog token invalidated");
        }
    }

    /// Drop the cached token only if it is still `rejected`
    ///
    /// A caller holding a stale token must not discard a fresh one that another
    /// caller fetched in the meantime.
    pub async fn invalidate_if(&self, rejected: &str) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|token| token.value() == rejected) {
            *slot = None;
            info!("Catalog token invalidated");
            true
        } else {
            debug!("Rejected catalog token already replaced, keeping cached token");
            false
        }
    }

    async fn fetch_token(
        &self,
        credentials: &CatalogCredentials,
    ) -> Result<AccessToken, CatalogError> {
        debug!(client_id = %credentials.client_id, "Requesting catalog access token");

        let response = self
            .http_client
            .post(&self.auth_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(CatalogError::from_transport)?;

        let status = response.status();

        if matches!(status.as_u16(), 400 | 401 | 403) {
            warn!(status = status.as_u16(), "Catalog rejected client credentials");
            return Err(CatalogError::Authentication);
        }

        if status.as_u16() == 429 || status.is_server_error() {
            warn!(status = status.as_u16(), "Catalog auth endpoint unavailable");
            return Err(CatalogError::UpstreamUnavailable(status.as_u16()));
        }

        if !status.is_success() {
            warn!(status = status.as_u16(), "Unexpected catalog auth response");
            return Err(CatalogError::Api(status.as_u16()));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("token response: {}", e.without_url())))?;

        if body.access_token.is_empty() {
            return Err(CatalogError::Parse("token response: empty access_token".to_string()));
        }

        info!(expires_in = body.expires_in, "Catalog access token acquired");

        Ok(AccessToken::new(
            body.access_token,
            Instant::now() + Duration::from_secs(body.expires_in),
        ))
    }
}
