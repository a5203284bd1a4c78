//! Request, result and vendor payload types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IapError, VERIFY_PURCHASE_SUCCESS};

/// Store that issued a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Google Play.
    Google,
    /// Apple App Store.
    Apple,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Apple => "apple",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = IapError;

    /// Accepts canonical and legacy names (`android`, `ios`), any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::platform::normalize_platform(s).ok_or(IapError::InvalidParameters)
    }
}

/// Vendor environment. Selects the Apple base URL; Google has one endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    /// Label used in result envelopes (`Sandbox` / `Production`).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sandbox => "Sandbox",
            Self::Production => "Production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sandbox => f.write_str("sandbox"),
            Self::Production => f.write_str("production"),
        }
    }
}

impl FromStr for Environment {
    type Err = IapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(IapError::config(format!(
                "unknown environment '{other}' (expected sandbox or production)"
            ))),
        }
    }
}

/// A purchase to verify. Carries identifiers only, never credentials.
///
/// `platform` is a free-form hint so legacy names (`android`, `ios`) survive
/// until resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub purchase_token: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl VerificationRequest {
    /// Google Play purchase identified by package, product and token.
    pub fn google(
        package_name: impl Into<String>,
        product_id: impl Into<String>,
        purchase_token: impl Into<String>,
    ) -> Self {
        Self {
            platform: Some(Platform::Google.to_string()),
            package_name: Some(package_name.into()),
            product_id: Some(product_id.into()),
            purchase_token: Some(purchase_token.into()),
            transaction_id: None,
        }
    }

    /// App Store purchase identified by transaction id.
    pub fn apple(transaction_id: impl Into<String>) -> Self {
        Self {
            platform: Some(Platform::Apple.to_string()),
            transaction_id: Some(transaction_id.into()),
            ..Self::default()
        }
    }

    /// Set the platform hint.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

/// Unified status vocabulary shared by both stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnifiedStatus {
    Completed,
    Pending,
    Waiting,
    Failed,
}

impl fmt::Display for UnifiedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Completed => "COMPLETED",
            Self::Pending => "PENDING",
            Self::Waiting => "WAITING",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Purchase details inside the result envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetails {
    pub status: UnifiedStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    /// Google order id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    /// App Store bundle id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_id: Option<String>,

    /// Purchase time, milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<i64>,

    /// `Sandbox` or `Production`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Human-readable failure detail. Never a raw vendor body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PurchaseDetails {
    pub fn new(status: UnifiedStatus) -> Self {
        Self {
            status,
            product_id: None,
            transaction_id: None,
            order_id: None,
            bundle_id: None,
            purchase_date: None,
            environment: None,
            detail: None,
        }
    }

    fn failed(detail: Option<String>) -> Self {
        Self {
            detail,
            ..Self::new(UnifiedStatus::Failed)
        }
    }
}

/// Uniform response envelope returned by every verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub is_success: bool,
    pub status_code: u16,
    pub message: String,
    pub result: PurchaseDetails,
}

impl VerificationResult {
    /// Successful vendor verification.
    pub fn success(details: PurchaseDetails) -> Self {
        Self {
            is_success: true,
            status_code: 200,
            message: VERIFY_PURCHASE_SUCCESS.to_string(),
            result: details,
        }
    }

    /// Failure envelope for an error. Vendor rejections carry no detail.
    pub fn from_error(err: &IapError) -> Self {
        let detail = match err {
            IapError::VerifyFailed { .. } => None,
            other => Some(other.to_string()),
        };

        Self {
            is_success: false,
            status_code: err.status_code(),
            message: err.code().to_string(),
            result: PurchaseDetails::failed(detail),
        }
    }

    pub fn status(&self) -> UnifiedStatus {
        self.result.status
    }
}

/// Google Play `ProductPurchase` resource (fields we consume).
///
/// Int64 fields arrive as JSON strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleProductPurchase {
    /// 0 purchased, 1 canceled, 2 pending.
    #[serde(default)]
    pub purchase_state: Option<i64>,

    /// 0 not consumed, 1 consumed.
    #[serde(default)]
    pub consumption_state: Option<i64>,

    #[serde(default)]
    pub order_id: Option<String>,

    #[serde(default)]
    pub purchase_time_millis: Option<String>,
}

/// App Store `TransactionInfoResponse` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleTransactionResponse {
    /// Compact JWS whose payload is the transaction.
    #[serde(default)]
    pub signed_transaction_info: Option<String>,

    #[serde(default)]
    pub environment: Option<String>,
}

/// Decoded App Store `JWSTransactionDecodedPayload` (fields we consume).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleTransaction {
    #[serde(default)]
    pub bundle_id: Option<String>,

    #[serde(default)]
    pub product_id: Option<String>,

    #[serde(default)]
    pub transaction_id: Option<String>,

    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub original_purchase_date: Option<i64>,

    /// `PURCHASED` or `FAMILY_SHARED`.
    #[serde(default)]
    pub in_app_ownership_type: Option<String>,

    /// `Consumable`, `Non-Consumable`, `Auto-Renewable Subscription`, ...
    #[serde(default, rename = "type")]
    pub product_type: Option<String>,

    /// `Sandbox` or `Production`.
    #[serde(default)]
    pub environment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::INTERNAL_SERVER_ERROR;

    #[test]
    fn test_result_serializes_camel_case() {
        let mut details = PurchaseDetails::new(UnifiedStatus::Completed);
        details.product_id = Some("coins_100".into());
        details.purchase_date = Some(1_700_000_000_000);

        let json = serde_json::to_value(VerificationResult::success(details)).unwrap();
        assert_eq!(json["isSuccess"], true);
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["message"], "VERIFY_PURCHASE_SUCCESS");
        assert_eq!(json["result"]["status"], "COMPLETED");
        assert_eq!(json["result"]["productId"], "coins_100");
        assert_eq!(json["result"]["purchaseDate"], 1_700_000_000_000_i64);
        assert!(json["result"].get("orderId").is_none());
    }

    #[test]
    fn test_error_envelope_carries_detail() {
        let err = IapError::Network {
            message: "connection refused".into(),
        };
        let result = VerificationResult::from_error(&err);
        assert!(!result.is_success);
        assert_eq!(result.status_code, 500);
        assert_eq!(result.message, INTERNAL_SERVER_ERROR);
        assert_eq!(result.status(), UnifiedStatus::Failed);
        assert_eq!(
            result.result.detail.as_deref(),
            Some("network error: connection refused")
        );
    }

    #[test]
    fn test_request_deserializes_from_camel_case() {
        let req: VerificationRequest = serde_json::from_str(
            r#"{"platform":"android","packageName":"com.example","productId":"gems","purchaseToken":"tok"}"#,
        )
        .unwrap();
        assert_eq!(req.platform.as_deref(), Some("android"));
        assert_eq!(req.package_name.as_deref(), Some("com.example"));
        assert!(req.transaction_id.is_none());
    }

    #[test]
    fn test_apple_transaction_type_field() {
        let tx: AppleTransaction = serde_json::from_str(
            r#"{"transactionId":"1000","type":"Non-Consumable","inAppOwnershipType":"PURCHASED","originalPurchaseDate":1700000000000}"#,
        )
        .unwrap();
        assert_eq!(tx.product_type.as_deref(), Some("Non-Consumable"));
        assert_eq!(tx.original_purchase_date, Some(1_700_000_000_000));
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!("PRODUCTION".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(" sandbox ".parse::<Environment>().unwrap(), Environment::Sandbox);
        assert!("staging".parse::<Environment>().is_err());
        assert_eq!(Environment::Production.label(), "Production");
    }
}
