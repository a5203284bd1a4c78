//! Vendor clients.
//!
//! Public API: no status code knowledge. All HTTP/status mapping in http.rs.
//! One outbound call per verification, no retries; retry policy belongs to
//! the caller.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::{IapError, IapResult};

pub mod apple;
pub mod google;
mod http;

pub use apple::{apple_base_url, AppleClient, APPLE_PRODUCTION_URL, APPLE_SANDBOX_URL};
pub use google::{GoogleClient, GOOGLE_API_URL};

pub const IAP_USER_AGENT: &str = concat!("iap-core/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client. The timeout bounds every vendor call so a
/// hung vendor cannot stall other verifications.
pub fn build_http_client(timeout_secs: u64) -> IapResult<reqwest::Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, HeaderValue::from_static(IAP_USER_AGENT));

    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .default_headers(default_headers)
        .build()
        .map_err(|e| IapError::config(format!("failed to create HTTP client: {}", e)))
}

fn base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
