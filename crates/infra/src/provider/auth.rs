//! Client-credentials tokens for the partner API
//!
//! [`CredentialCache`] hands out bearer tokens, fetching a new one through a
//! [`TokenEndpoint`] only when the cached token is missing or about to
//! expire.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use passiae_core::Clock;
use passiae_domain::constants::{PARTNER_REALM, TOKEN_REFRESH_MARGIN};
use passiae_domain::{ProviderConfig, Result, TransportFailure};
use reqwest::Method;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::errors::{from_reqwest, from_status};
use crate::http::HttpClient;

/// Answer of the OAuth token endpoint
#[derive(Clone, Deserialize)]
pub struct TokenGrant {
    /// Usually `Bearer`.
    pub token_type: String,
    /// Opaque token value.
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("token_type", &self.token_type)
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Credential exchange with the OAuth server
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn exchange(&self, scopes: &[&str]) -> std::result::Result<TokenGrant, TransportFailure>;
}

/// A token ready to be sent as the `Authorization` header
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    header_value: String,
    expires_at: DateTime<Utc>,
}

impl BearerToken {
    fn from_grant(grant: &TokenGrant, now: DateTime<Utc>) -> Self {
        let lifetime = i64::try_from(grant.expires_in).unwrap_or(i64::MAX);
        Self {
            header_value: format!("{} {}", grant.token_type, grant.access_token),
            expires_at: now
                .checked_add_signed(chrono::Duration::seconds(lifetime))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// `"{token_type} {access_token}"`.
    pub fn header_value(&self) -> &str {
        &self.header_value
    }

    /// Expiry computed from the grant lifetime.
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        let margin = chrono::Duration::from_std(margin).unwrap_or(chrono::Duration::MAX);
        now.checked_add_signed(margin).is_some_and(|limit| self.expires_at > limit)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("header_value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token cache keyed by scope set
///
/// Readers share the fast path. A refresh holds the write lock for the
/// duration of the exchange and re-checks the entry first, so callers
/// queued behind it reuse the fresh token.
pub struct CredentialCache {
    endpoint: Arc<dyn TokenEndpoint>,
    clock: Arc<dyn Clock>,
    margin: Duration,
    tokens: RwLock<HashMap<String, BearerToken>>,
}

impl CredentialCache {
    /// Empty cache refreshing tokens [`TOKEN_REFRESH_MARGIN`] before expiry.
    pub fn new(endpoint: Arc<dyn TokenEndpoint>, clock: Arc<dyn Clock>) -> Self {
        Self { endpoint, clock, margin: TOKEN_REFRESH_MARGIN, tokens: RwLock::default() }
    }

    /// A token valid for more than the refresh margin.
    ///
    /// # Errors
    ///
    /// The transport failure of the credential exchange. Nothing is cached
    /// in that case, the next call tries again.
    #[instrument(skip(self))]
    pub async fn get_token(
        &self,
        scopes: &[&str],
    ) -> std::result::Result<BearerToken, TransportFailure> {
        let key = scopes.join(" ");

        if let Some(token) = self.tokens.read().await.get(&key) {
            if token.is_fresh(self.clock.now(), self.margin) {
                return Ok(token.clone());
            }
        }

        let mut tokens = self.tokens.write().await;
        if let Some(token) = tokens.get(&key) {
            if token.is_fresh(self.clock.now(), self.margin) {
                debug!("token refreshed by a concurrent caller");
                return Ok(token.clone());
            }
        }

        let grant = self.endpoint.exchange(scopes).await.map_err(|failure| {
            warn!(failure = %failure, "credential exchange failed");
            failure
        })?;
        let token = BearerToken::from_grant(&grant, self.clock.now());
        info!(expires_at = %token.expires_at(), "obtained new access token");
        tokens.insert(key, token.clone());
        Ok(token)
    }

    /// Drop every cached token.
    pub async fn invalidate(&self) {
        self.tokens.write().await.clear();
    }
}

/// OAuth client-credentials exchange over HTTP
pub struct OAuthTokenEndpoint {
    http: HttpClient,
    url: String,
    client_id: String,
    client_secret: String,
}

impl OAuthTokenEndpoint {
    /// Endpoint for the partner realm.
    ///
    /// The exchange is idempotent and retried once on connection failures
    /// and server errors.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.timeout()).max_attempts(2).build()?;
        Ok(Self::with_client(http, config))
    }

    /// Endpoint sending through `http`.
    pub fn with_client(http: HttpClient, config: &ProviderConfig) -> Self {
        Self {
            http,
            url: format!("{}/connexion/oauth2/access_token", config.auth_base_url.trim_end_matches('/')),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }
}

#[async_trait]
impl TokenEndpoint for OAuthTokenEndpoint {
    async fn exchange(&self, scopes: &[&str]) -> std::result::Result<TokenGrant, TransportFailure> {
        let scope = format!("application_{} {}", self.client_id, scopes.join(" "));
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];
        let request =
            self.http.request(Method::POST, &self.url).query(&[("realm", PARTNER_REALM)]).form(&form);

        let response = self.http.send(request).await.map_err(|err| from_reqwest(&err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(from_status(status));
        }
        response.json::<TokenGrant>().await.map_err(|err| {
            TransportFailure::malformed(format!("invalid token response: {err}"))
        })
    }
}
