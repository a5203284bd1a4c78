//! In-app purchase verification for Google Play and the App Store.
//!
//! This crate provides:
//!
//! - Platform resolution from explicit hints (including legacy `android` /
//!   `ios`) or from the identifiers a request carries
//! - Vendor authentication (App Store ES256 tokens, Google service-account
//!   OAuth)
//! - HTTP clients for Android Publisher `purchases.products.get` and the App
//!   Store Server API transaction lookup
//! - Normalization of vendor states into one [`UnifiedStatus`]
//! - A uniform [`VerificationResult`] envelope that `verify` always returns
//!
//! # Quick Start
//!
//! ```no_run
//! use iap_core::{AppleConfig, VerificationRequest, Verifier, VerifierConfig};
//!
//! # async fn example() -> iap_core::IapResult<()> {
//! let apple = AppleConfig::new("issuer-id", "KEY123", "com.example.game", "")
//!     .load_private_key("AuthKey_KEY123.p8")?;
//! let verifier = Verifier::new(VerifierConfig::default().with_apple(apple))?;
//!
//! let result = verifier
//!     .verify(&VerificationRequest::apple("2000000123456789"))
//!     .await;
//! println!("{} {}", result.status_code, result.result.status);
//! # Ok(())
//! # }
//! ```
//!
//! # Status codes
//!
//! | Code | Message | Meaning |
//! |------|---------|---------|
//! | 200 | `VERIFY_PURCHASE_SUCCESS` | Vendor vouched for the purchase |
//! | 400 | `INVALID_PARAMETERS` | Platform could not be determined |
//! | 400 | `MISSING_PARAMETERS` | Identifiers for the platform are absent |
//! | 400 | `INVALID_PLATFORM` | Platform has no credentials on this verifier |
//! | 400 | `VERIFY_PURCHASE_FAILED` | Vendor rejected the purchase |
//! | 500 | `INTERNAL_SERVER_ERROR` | Transport, auth or decoding fault |
//!
//! # Logging
//!
//! All diagnostics go through `tracing`; install a subscriber to see them.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod platform;
pub mod status;
pub mod types;
pub mod verifier;

// Re-export main types
pub use auth::{AppleTokenSigner, GoogleAuthenticator};
pub use client::{AppleClient, GoogleClient};
pub use config::{AppleConfig, Endpoints, GoogleConfig, ServiceAccountKey, VerifierConfig};
pub use error::{IapError, IapResult};
pub use event::PurchaseEvent;
pub use platform::{normalize_platform, resolve};
pub use status::{map_apple_status, map_google_status};
pub use types::{
    AppleTransaction, Environment, GoogleProductPurchase, Platform, PurchaseDetails,
    UnifiedStatus, VerificationRequest, VerificationResult,
};
pub use verifier::{verify_once, Verifier};
