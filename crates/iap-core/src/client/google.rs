//! Android Publisher `purchases.products.get`.

use tracing::debug;
use url::Url;

use super::base_url;
use super::http::{get_with_bearer, BodyOutcome};
use crate::error::{IapError, IapResult};
use crate::types::GoogleProductPurchase;

/// Android Publisher v3 base URL. Same for test and live purchases.
pub const GOOGLE_API_URL: &str = "https://androidpublisher.googleapis.com/androidpublisher/v3";

/// Client for Google Play product purchases.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleClient {
    pub fn new(http: reqwest::Client, base_url_override: Option<&str>) -> Self {
        Self {
            http,
            base_url: base_url(base_url_override.unwrap_or(GOOGLE_API_URL)),
        }
    }

    /// Fetch a product purchase.
    ///
    /// An empty body is a vendor rejection; transport and auth failures are
    /// errors of their own kind.
    pub async fn fetch_purchase(
        &self,
        package_name: &str,
        product_id: &str,
        purchase_token: &str,
        access_token: &str,
    ) -> IapResult<GoogleProductPurchase> {
        let url = self.product_url(package_name, product_id, purchase_token)?;
        debug!(package_name, product_id, "fetching Google product purchase");

        match get_with_bearer(&self.http, url, access_token).await? {
            BodyOutcome::Empty => Err(IapError::verify_failed("empty Google purchase response")),
            BodyOutcome::Present(body) => {
                serde_json::from_str(&body).map_err(|e| {
                    debug!(error = %e, "unparseable Google purchase body");
                    IapError::InvalidResponse {
                        message: "failed to parse Google purchase".to_string(),
                    }
                })
            }
        }
    }

    /// `{base}/applications/{package}/purchases/products/{product}/tokens/{token}`
    /// with each identifier percent-encoded as a single path segment.
    pub fn product_url(
        &self,
        package_name: &str,
        product_id: &str,
        purchase_token: &str,
    ) -> IapResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| IapError::Network {
            message: format!("invalid Google API URL: {}", e),
        })?;

        url.path_segments_mut()
            .map_err(|_| IapError::Network {
                message: "Google API URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend([
                "applications",
                package_name,
                "purchases",
                "products",
                product_id,
                "tokens",
                purchase_token,
            ]);

        Ok(url)
    }
}
