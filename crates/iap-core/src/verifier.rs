//! Verifier facade.
//!
//! `verify` never fails: every outcome, including transport faults, comes
//! back as a [`VerificationResult`] envelope.

use std::sync::Arc;

use tracing::{error, info, warn, Instrument};

use crate::auth::{AppleTokenSigner, GoogleAuthenticator};
use crate::client::{build_http_client, AppleClient, GoogleClient};
use crate::config::VerifierConfig;
use crate::error::{IapError, IapResult};
use crate::platform::{missing_fields, resolve};
use crate::status::{apple_transaction_status, google_purchase_status};
use crate::types::{Platform, PurchaseDetails, VerificationRequest, VerificationResult};

#[derive(Debug)]
struct GooglePipeline {
    auth: GoogleAuthenticator,
    client: GoogleClient,
}

#[derive(Debug)]
struct ApplePipeline {
    signer: AppleTokenSigner,
    client: AppleClient,
}

#[derive(Debug)]
struct Inner {
    config: VerifierConfig,
    google: Option<GooglePipeline>,
    apple: Option<ApplePipeline>,
}

/// Verifies purchases against Google Play and the App Store.
///
/// Cheap to clone and safe to share across tasks; configuration is frozen
/// at construction.
#[derive(Debug, Clone)]
pub struct Verifier {
    inner: Arc<Inner>,
}

impl Verifier {
    /// Validate `config` and build the per-platform pipelines.
    ///
    /// Fails on the first missing or malformed credential, before any
    /// network call.
    pub fn new(config: VerifierConfig) -> IapResult<Self> {
        config.validate()?;

        let http = build_http_client(config.timeout_secs)?;
        let endpoints = &config.endpoints;

        let google = match &config.google {
            Some(google) => {
                // validate() guarantees the account is present.
                let account = google
                    .service_account
                    .as_ref()
                    .ok_or_else(|| IapError::config("Google serviceAccount is required"))?;
                Some(GooglePipeline {
                    auth: GoogleAuthenticator::new(
                        account,
                        endpoints.google_token_url.as_deref(),
                        http.clone(),
                    )?,
                    client: GoogleClient::new(http.clone(), endpoints.google_api_url.as_deref()),
                })
            }
            None => None,
        };

        let apple = match &config.apple {
            Some(apple) => Some(ApplePipeline {
                signer: AppleTokenSigner::new(apple)?,
                client: AppleClient::new(
                    http.clone(),
                    config.environment,
                    endpoints.apple_api_url.as_deref(),
                ),
            }),
            None => None,
        };

        info!(
            environment = %config.environment,
            google_account = google.as_ref().map(|p| p.auth.client_email()),
            apple_key_id = apple.as_ref().map(|p| p.signer.key_id()),
            "purchase verifier ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                google,
                apple,
            }),
        })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.inner.config
    }

    /// Whether credentials for `platform` are configured.
    pub fn supports(&self, platform: Platform) -> bool {
        match platform {
            Platform::Google => self.inner.google.is_some(),
            Platform::Apple => self.inner.apple.is_some(),
        }
    }

    /// Verify one purchase.
    pub async fn verify(&self, request: &VerificationRequest) -> VerificationResult {
        let platform = resolve(request.platform.as_deref(), request);
        let span = tracing::info_span!(
            "verify_purchase",
            platform = platform.map(|p| p.as_str()).unwrap_or("unresolved"),
        );

        async move {
            match self.verify_resolved(platform, request).await {
                Ok(result) => {
                    info!(status = %result.status(), "purchase verified");
                    result
                }
                Err(err) => {
                    if err.is_client_error() {
                        warn!(error = %err, code = err.code(), "purchase verification rejected");
                    } else {
                        error!(error = %err, code = err.code(), "purchase verification failed");
                    }
                    VerificationResult::from_error(&err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn verify_resolved(
        &self,
        platform: Option<Platform>,
        request: &VerificationRequest,
    ) -> IapResult<VerificationResult> {
        let platform = platform.ok_or(IapError::InvalidParameters)?;

        let missing = missing_fields(platform, request);
        if !missing.is_empty() {
            return Err(IapError::MissingParameters {
                platform,
                missing: missing.join(", "),
            });
        }

        match platform {
            Platform::Google => {
                let pipeline = self
                    .inner
                    .google
                    .as_ref()
                    .ok_or(IapError::PlatformNotConfigured { platform })?;
                self.verify_google(pipeline, request).await
            }
            Platform::Apple => {
                let pipeline = self
                    .inner
                    .apple
                    .as_ref()
                    .ok_or(IapError::PlatformNotConfigured { platform })?;
                self.verify_apple(pipeline, request).await
            }
        }
    }

    async fn verify_google(
        &self,
        pipeline: &GooglePipeline,
        request: &VerificationRequest,
    ) -> IapResult<VerificationResult> {
        let package_name = field(&request.package_name);
        let product_id = field(&request.product_id);
        let purchase_token = field(&request.purchase_token);

        let access_token = pipeline.auth.access_token().await?;
        let purchase = match pipeline
            .client
            .fetch_purchase(package_name, product_id, purchase_token, &access_token)
            .await
        {
            Ok(purchase) => purchase,
            Err(err @ IapError::Unauthorized { .. }) => {
                // Revoked before expiry; next call re-exchanges.
                pipeline.auth.clear_cache().await;
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let mut details = PurchaseDetails::new(google_purchase_status(&purchase));
        details.product_id = Some(product_id.to_string());
        details.order_id = purchase.order_id.clone();
        details.transaction_id = purchase.order_id;
        details.purchase_date = purchase
            .purchase_time_millis
            .as_deref()
            .and_then(|ms| ms.parse().ok());
        details.environment = Some(self.inner.config.environment.label().to_string());

        Ok(VerificationResult::success(details))
    }

    async fn verify_apple(
        &self,
        pipeline: &ApplePipeline,
        request: &VerificationRequest,
    ) -> IapResult<VerificationResult> {
        let transaction_id = field(&request.transaction_id);

        let token = pipeline.signer.sign()?;
        let transaction = pipeline
            .client
            .fetch_transaction(transaction_id, &token)
            .await?;

        let mut details = PurchaseDetails::new(apple_transaction_status(&transaction));
        details.bundle_id = transaction.bundle_id;
        details.product_id = transaction.product_id;
        details.transaction_id = transaction.transaction_id;
        details.purchase_date = transaction.original_purchase_date;
        details.environment = Some(
            transaction
                .environment
                .unwrap_or_else(|| self.inner.config.environment.label().to_string()),
        );

        Ok(VerificationResult::success(details))
    }
}

/// Build a verifier for a single request.
///
/// Configuration errors propagate; everything after construction is
/// reported in the envelope.
pub async fn verify_once(
    config: VerifierConfig,
    request: &VerificationRequest,
) -> IapResult<VerificationResult> {
    let verifier = Verifier::new(config)?;
    Ok(verifier.verify(request).await)
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}
