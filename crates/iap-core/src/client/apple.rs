//! App Store Server API `GET /inApps/v1/transactions/{transactionId}`.

use jsonwebtoken::dangerous::insecure_decode;
use tracing::debug;
use url::Url;

use super::base_url;
use super::http::{get_with_bearer, BodyOutcome};
use crate::error::{IapError, IapResult};
use crate::types::{AppleTransaction, AppleTransactionResponse, Environment};

pub const APPLE_SANDBOX_URL: &str = "https://api.storekit-sandbox.itunes.apple.com/inApps/v1";
pub const APPLE_PRODUCTION_URL: &str = "https://api.storekit.itunes.apple.com/inApps/v1";

/// Base URL for an environment. Apple rejects cross-environment calls.
pub fn apple_base_url(environment: Environment) -> &'static str {
    match environment {
        Environment::Sandbox => APPLE_SANDBOX_URL,
        Environment::Production => APPLE_PRODUCTION_URL,
    }
}

/// Client for App Store transactions.
#[derive(Debug, Clone)]
pub struct AppleClient {
    http: reqwest::Client,
    base_url: String,
}

impl AppleClient {
    pub fn new(
        http: reqwest::Client,
        environment: Environment,
        base_url_override: Option<&str>,
    ) -> Self {
        Self {
            http,
            base_url: base_url(base_url_override.unwrap_or_else(|| apple_base_url(environment))),
        }
    }

    /// Fetch and decode a transaction.
    ///
    /// A missing `signedTransactionInfo` or an undecodable payload is a vendor
    /// rejection. The payload environment falls back to the envelope's.
    pub async fn fetch_transaction(
        &self,
        transaction_id: &str,
        token: &str,
    ) -> IapResult<AppleTransaction> {
        let url = self.transaction_url(transaction_id)?;
        debug!(transaction_id, "fetching App Store transaction");

        let body = match get_with_bearer(&self.http, url, token).await? {
            BodyOutcome::Empty => {
                return Err(IapError::verify_failed("empty App Store transaction response"))
            }
            BodyOutcome::Present(body) => body,
        };

        let response: AppleTransactionResponse = serde_json::from_str(&body)
            .map_err(|_| IapError::verify_failed("malformed App Store transaction response"))?;

        let signed = response
            .signed_transaction_info
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| IapError::verify_failed("missing signedTransactionInfo"))?;

        let mut transaction = decode_signed_transaction(signed)?;
        if transaction.environment.is_none() {
            transaction.environment = response.environment;
        }

        Ok(transaction)
    }

    pub fn transaction_url(&self, transaction_id: &str) -> IapResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| IapError::Network {
            message: format!("invalid App Store API URL: {}", e),
        })?;

        url.path_segments_mut()
            .map_err(|_| IapError::Network {
                message: "App Store API URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["transactions", transaction_id]);

        Ok(url)
    }
}

/// Decode the payload of a compact JWS transaction.
///
/// The signature and its x5c certificate chain are NOT checked against
/// Apple's root CA; the payload is trusted as delivered over TLS from the
/// App Store Server API.
pub fn decode_signed_transaction(jws: &str) -> IapResult<AppleTransaction> {
    let decoded = insecure_decode::<AppleTransaction>(jws).map_err(|e| {
        debug!(error = %e, "undecodable signedTransactionInfo");
        IapError::verify_failed("signedTransactionInfo is not a decodable JWS transaction")
    })?;

    Ok(decoded.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    fn jws(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"ES256","x5c":[]}"#);
        let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{}.{}.c2lnbmF0dXJl", header, payload)
    }

    #[test]
    fn test_base_url_mapping_is_exact() {
        assert_eq!(
            apple_base_url(Environment::Sandbox),
            "https://api.storekit-sandbox.itunes.apple.com/inApps/v1"
        );
        assert_eq!(
            apple_base_url(Environment::Production),
            "https://api.storekit.itunes.apple.com/inApps/v1"
        );
    }

    #[test]
    fn test_transaction_url() {
        let client = AppleClient::new(reqwest::Client::new(), Environment::Production, None);
        assert_eq!(
            client.transaction_url("2000000123456789").unwrap().as_str(),
            "https://api.storekit.itunes.apple.com/inApps/v1/transactions/2000000123456789"
        );

        let client = AppleClient::new(
            reqwest::Client::new(),
            Environment::Production,
            Some("http://127.0.0.1:9000"),
        );
        assert_eq!(
            client.transaction_url("1/2").unwrap().as_str(),
            "http://127.0.0.1:9000/transactions/1%2F2"
        );
    }

    #[test]
    fn test_decode_signed_transaction() {
        let token = jws(&serde_json::json!({
            "transactionId": "2000000123456789",
            "productId": "gems_500",
            "bundleId": "com.example.game",
            "originalPurchaseDate": 1_700_000_000_000_i64,
            "inAppOwnershipType": "PURCHASED",
            "type": "Consumable",
            "environment": "Sandbox"
        }));

        let tx = decode_signed_transaction(&token).unwrap();
        assert_eq!(tx.transaction_id.as_deref(), Some("2000000123456789"));
        assert_eq!(tx.product_type.as_deref(), Some("Consumable"));
        assert_eq!(tx.environment.as_deref(), Some("Sandbox"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        for bad in ["", "abc", "a.b", "a.!!!.c", "a.bm90LWpzb24.c"] {
            let err = decode_signed_transaction(bad).unwrap_err();
            assert!(matches!(err, IapError::VerifyFailed { .. }), "{bad}");
        }
    }
}
