//! App Store Server API tokens.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::config::AppleConfig;
use crate::error::{IapError, IapResult};

/// Audience required by the App Store Server API.
pub const APPLE_AUDIENCE: &str = "appstoreconnect-v1";

/// Token lifetime. Apple rejects anything above one hour.
pub const APPLE_TOKEN_TTL_SECS: i64 = 3600;

/// Claims of an App Store Server API token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppleClaims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
    pub nonce: String,
    pub bid: String,
}

/// Mints ES256 tokens from an App Store Connect `.p8` key.
#[derive(Clone)]
pub struct AppleTokenSigner {
    issuer_id: String,
    key_id: String,
    bundle_id: String,
    key: Arc<EncodingKey>,
}

impl AppleTokenSigner {
    pub fn new(config: &AppleConfig) -> IapResult<Self> {
        let key = EncodingKey::from_ec_pem(config.private_key.as_bytes())
            .map_err(|e| IapError::config(format!("Apple privateKey is not a valid EC PEM key: {}", e)))?;

        Ok(Self {
            issuer_id: config.issuer_id.clone(),
            key_id: config.key_id.clone(),
            bundle_id: config.bundle_id.clone(),
            key: Arc::new(key),
        })
    }

    /// Mint a fresh token. Every call carries a new nonce.
    pub fn sign(&self) -> IapResult<String> {
        self.sign_at(Utc::now())
    }

    pub(crate) fn sign_at(&self, now: DateTime<Utc>) -> IapResult<String> {
        let iat = now.timestamp();
        let claims = AppleClaims {
            iss: self.issuer_id.clone(),
            iat,
            exp: iat + APPLE_TOKEN_TTL_SECS,
            aud: APPLE_AUDIENCE.to_string(),
            nonce: uuid::Uuid::new_v4().to_string(),
            bid: self.bundle_id.clone(),
        };

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());
        header.typ = Some("JWT".to_string());

        Ok(encode(&header, &claims, &self.key)?)
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl fmt::Debug for AppleTokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppleTokenSigner")
            .field("issuer_id", &self.issuer_id)
            .field("key_id", &self.key_id)
            .field("bundle_id", &self.bundle_id)
            .finish_non_exhaustive()
    }
}
