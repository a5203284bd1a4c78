//! Google service-account OAuth.
//!
//! The bearer token is obtained with the JWT bearer grant: an RS256
//! assertion signed with the service-account key is exchanged at the token
//! URI for a short-lived access token scoped to the Android Publisher API.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::ServiceAccountKey;
use crate::error::{IapError, IapResult};

/// Android Publisher read scope.
pub const GOOGLE_API_SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

/// Default OAuth token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_TTL_SECS: i64 = 3600;
// 60s before expiry + 30s clock skew.
const REFRESH_BUFFER_SECS: i64 = 90;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    #[serde(default)]
    token_type: Option<String>,
}

fn default_expires_in() -> i64 {
    ASSERTION_TTL_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    identity: String,
    token: String,
    expires_at: DateTime<Utc>,
}

/// Obtains bearer tokens for one service account.
#[derive(Clone)]
pub struct GoogleAuthenticator {
    client_email: String,
    private_key_id: Option<String>,
    key: Arc<EncodingKey>,
    token_url: String,
    http: reqwest::Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl GoogleAuthenticator {
    /// Build from a service account.
    ///
    /// Token URL precedence: `token_url` override, the account's `token_uri`,
    /// then [`GOOGLE_TOKEN_URL`].
    pub fn new(
        account: &ServiceAccountKey,
        token_url: Option<&str>,
        http: reqwest::Client,
    ) -> IapResult<Self> {
        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes()).map_err(|e| {
            IapError::config(format!(
                "Google service account private_key is not a valid RSA PEM key: {}",
                e
            ))
        })?;

        let token_url = token_url
            .or(account.token_uri.as_deref())
            .unwrap_or(GOOGLE_TOKEN_URL)
            .to_string();

        Ok(Self {
            client_email: account.client_email.clone(),
            private_key_id: account.private_key_id.clone(),
            key: Arc::new(key),
            token_url,
            http,
            cached_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Get a bearer token, exchanging a new assertion if the cached one is
    /// missing or about to expire.
    pub async fn access_token(&self) -> IapResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(cached) = cache.as_ref() {
                let buffer = chrono::Duration::seconds(REFRESH_BUFFER_SECS);
                if cached.identity == self.client_email && cached.expires_at > Utc::now() + buffer {
                    debug!("using cached Google access token");
                    return Ok(cached.token.clone());
                }
            }
        }

        debug!(client_email = %self.client_email, "exchanging Google service account assertion");
        self.exchange().await
    }

    /// Drop the cached access token.
    pub async fn clear_cache(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub(crate) fn assertion_at(&self, now: DateTime<Utc>) -> IapResult<String> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: GOOGLE_API_SCOPE.to_string(),
            aud: self.token_url.clone(),
            iat,
            exp: iat + ASSERTION_TTL_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        Ok(encode(&header, &claims, &self.key)?)
    }

    async fn exchange(&self) -> IapResult<String> {
        let assertion = self.assertion_at(Utc::now())?;

        let response = self
            .http
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "Google token exchange rejected");

            // invalid_grant arrives as 400.
            return Err(if status.is_client_error() {
                IapError::Unauthorized {
                    message: format!("Google token exchange failed: HTTP {}", status.as_u16()),
                }
            } else {
                IapError::Network {
                    message: format!("Google token exchange failed: HTTP {}", status.as_u16()),
                }
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            debug!(error = %e, "unparseable Google token response");
            IapError::InvalidResponse {
                message: "failed to parse Google token response".to_string(),
            }
        })?;

        if token_response.access_token.is_empty() {
            return Err(IapError::Unauthorized {
                message: "Google token exchange returned an empty access token".to_string(),
            });
        }

        let expires_in = token_response.expires_in.clamp(0, ASSERTION_TTL_SECS);
        let expires_at = Utc::now() + chrono::Duration::seconds(expires_in);

        {
            let mut cache = self.cached_token.write().await;
            *cache = Some(CachedToken {
                identity: self.client_email.clone(),
                token: token_response.access_token.clone(),
                expires_at,
            });
        }

        debug!(
            expires_in,
            token_type = ?token_response.token_type,
            "obtained Google access token"
        );

        Ok(token_response.access_token)
    }
}

impl fmt::Debug for GoogleAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleAuthenticator")
            .field("client_email", &self.client_email)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}
