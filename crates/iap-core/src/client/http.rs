//! HTTP layer: status mapping and body outcome.
//!
//! This is the ONLY place for status code handling. Vendor bodies are logged
//! at debug level and never copied into errors.

use reqwest::header::AUTHORIZATION;
use tracing::debug;

use crate::error::{IapError, IapResult};

/// Outcome of a successful (2xx) vendor call.
#[derive(Debug)]
pub(crate) enum BodyOutcome {
    /// Empty body or JSON `null`.
    Empty,
    Present(String),
}

/// GET `url` with a bearer token and map the status.
pub(crate) async fn get_with_bearer(
    client: &reqwest::Client,
    url: url::Url,
    token: &str,
) -> IapResult<BodyOutcome> {
    let response = client
        .get(url)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await.map_err(|e| IapError::Network {
        message: format!("failed to read response body: {}", e.without_url()),
    })?;

    if !status.is_success() {
        debug!(status = status.as_u16(), body = %body, "vendor returned error status");
    }

    match status.as_u16() {
        200..=299 => {
            let trimmed = body.trim();
            if trimmed.is_empty() || trimmed == "null" {
                Ok(BodyOutcome::Empty)
            } else {
                Ok(BodyOutcome::Present(body))
            }
        }

        401 | 403 => Err(IapError::Unauthorized {
            message: format!("vendor rejected credentials: HTTP {}", status.as_u16()),
        }),

        429 => Err(IapError::Network {
            message: "vendor rate limit exceeded".to_string(),
        }),

        // Unknown token/transaction, malformed identifiers.
        400..=499 => Err(IapError::verify_failed(format!(
            "vendor rejected request: HTTP {}",
            status.as_u16()
        ))),

        _ => Err(IapError::Network {
            message: format!("vendor error: HTTP {}", status.as_u16()),
        }),
    }
}
