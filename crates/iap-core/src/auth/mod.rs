//! Vendor authentication.
//!
//! - Apple: ES256 JWT minted fresh for every call, never cached.
//! - Google: RS256 service-account assertion exchanged for an OAuth bearer
//!   token, cached per service-account identity until shortly before expiry.
//!
//! Key material is parsed when the signer is built, so malformed keys fail
//! verifier construction instead of individual requests.

pub mod apple;
pub mod google;

pub use apple::{AppleClaims, AppleTokenSigner, APPLE_AUDIENCE, APPLE_TOKEN_TTL_SECS};
pub use google::{GoogleAuthenticator, GOOGLE_API_SCOPE, GOOGLE_TOKEN_URL};
