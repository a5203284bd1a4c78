//! Error types for purchase verification.

/// Message constant returned for a verified purchase.
pub const VERIFY_PURCHASE_SUCCESS: &str = "VERIFY_PURCHASE_SUCCESS";
/// Platform could not be determined from the request.
pub const INVALID_PARAMETERS: &str = "INVALID_PARAMETERS";
/// Platform resolved but required identifiers are absent.
pub const MISSING_PARAMETERS: &str = "MISSING_PARAMETERS";
/// Platform resolved but this verifier has no credentials for it.
pub const INVALID_PLATFORM: &str = "INVALID_PLATFORM";
/// Vendor answered but the purchase is invalid or unverifiable.
pub const VERIFY_PURCHASE_FAILED: &str = "VERIFY_PURCHASE_FAILED";
/// Transport, auth, or otherwise unexpected fault.
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

/// Verification errors.
#[derive(Debug, thiserror::Error)]
pub enum IapError {
    /// Missing or malformed credentials. Raised at construction only.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// No platform hint and the request shape is ambiguous.
    #[error("could not determine platform from provided parameters")]
    InvalidParameters,

    /// Required identifiers for the resolved platform are absent.
    #[error("missing required parameters for {platform}: {missing}")]
    MissingParameters {
        platform: crate::types::Platform,
        missing: String,
    },

    /// The resolved platform has no configuration on this verifier.
    #[error("platform not configured: {platform}")]
    PlatformNotConfigured { platform: crate::types::Platform },

    /// Vendor responded but rejected or could not vouch for the purchase.
    #[error("vendor rejected purchase: {reason}")]
    VerifyFailed { reason: String },

    /// Vendor refused our credentials.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Network error or vendor-side failure.
    #[error("network error: {message}")]
    Network { message: String },

    /// Vendor payload that could not be interpreted.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Token signing failed.
    #[error("signing error: {message}")]
    Signing { message: String },
}

impl IapError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn verify_failed(reason: impl Into<String>) -> Self {
        Self::VerifyFailed {
            reason: reason.into(),
        }
    }

    /// HTTP status code reported in the result envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidParameters
            | Self::MissingParameters { .. }
            | Self::PlatformNotConfigured { .. }
            | Self::VerifyFailed { .. } => 400,

            Self::Config { .. }
            | Self::Unauthorized { .. }
            | Self::Network { .. }
            | Self::InvalidResponse { .. }
            | Self::Signing { .. } => 500,
        }
    }

    /// Message constant reported in the result envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameters => INVALID_PARAMETERS,
            Self::MissingParameters { .. } => MISSING_PARAMETERS,
            Self::PlatformNotConfigured { .. } => INVALID_PLATFORM,
            Self::VerifyFailed { .. } => VERIFY_PURCHASE_FAILED,
            _ => INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller can fix the failure by changing the request.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<reqwest::Error> for IapError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL: it carries purchase tokens.
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.without_url().to_string()
        };
        Self::Network { message }
    }
}

impl From<jsonwebtoken::errors::Error> for IapError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Signing {
            message: err.to_string(),
        }
    }
}

/// Result type for verification operations.
pub type IapResult<T> = Result<T, IapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Platform;

    #[test]
    fn test_client_errors_are_400() {
        assert_eq!(IapError::InvalidParameters.status_code(), 400);
        assert_eq!(IapError::InvalidParameters.code(), INVALID_PARAMETERS);

        let missing = IapError::MissingParameters {
            platform: Platform::Google,
            missing: "productId".into(),
        };
        assert_eq!(missing.status_code(), 400);
        assert_eq!(missing.code(), MISSING_PARAMETERS);

        let rejected = IapError::verify_failed("empty body");
        assert_eq!(rejected.status_code(), 400);
        assert_eq!(rejected.code(), VERIFY_PURCHASE_FAILED);
        assert!(rejected.is_client_error());
    }

    #[test]
    fn test_faults_are_500() {
        for err in [
            IapError::Network {
                message: "connection reset".into(),
            },
            IapError::Unauthorized {
                message: "bad key".into(),
            },
            IapError::InvalidResponse {
                message: "not json".into(),
            },
        ] {
            assert_eq!(err.status_code(), 500);
            assert_eq!(err.code(), INTERNAL_SERVER_ERROR);
            assert!(!err.is_client_error());
        }
    }

    #[test]
    fn test_unconfigured_platform_is_invalid_platform() {
        let err = IapError::PlatformNotConfigured {
            platform: Platform::Apple,
        };
        assert_eq!(err.code(), INVALID_PLATFORM);
        assert_eq!(err.to_string(), "platform not configured: apple");
    }
}
