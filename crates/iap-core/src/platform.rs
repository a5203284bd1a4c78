//! Platform resolution.
//!
//! A request is routed by its explicit hint first, then by which identifiers
//! it carries:
//! 1. Hint (`google`, `apple`, legacy `android`, `ios`; any case)
//! 2. `transactionId` present → Apple
//! 3. `packageName` + `productId` + `purchaseToken` present → Google

use crate::types::{Platform, VerificationRequest};

/// Map a platform name to a platform, accepting legacy names.
///
/// Unknown names yield `None`.
pub fn normalize_platform(name: &str) -> Option<Platform> {
    match name.trim().to_ascii_lowercase().as_str() {
        "google" | "android" => Some(Platform::Google),
        "apple" | "ios" => Some(Platform::Apple),
        _ => None,
    }
}

/// Resolve the target platform for a request.
///
/// An unrecognized hint falls through to shape inference.
pub fn resolve(hint: Option<&str>, request: &VerificationRequest) -> Option<Platform> {
    if let Some(platform) = hint.and_then(normalize_platform) {
        return Some(platform);
    }

    if present(&request.transaction_id) {
        Some(Platform::Apple)
    } else if present(&request.package_name)
        && present(&request.product_id)
        && present(&request.purchase_token)
    {
        Some(Platform::Google)
    } else {
        None
    }
}

/// Names of the identifiers `platform` needs that `request` lacks.
pub(crate) fn missing_fields(platform: Platform, request: &VerificationRequest) -> Vec<&'static str> {
    let required: Vec<(&'static str, &Option<String>)> = match platform {
        Platform::Google => vec![
            ("packageName", &request.package_name),
            ("productId", &request.product_id),
            ("purchaseToken", &request.purchase_token),
        ],
        Platform::Apple => vec![("transactionId", &request.transaction_id)],
    };

    required
        .into_iter()
        .filter(|(_, value)| !present(value))
        .map(|(name, _)| name)
        .collect()
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_names() {
        assert_eq!(normalize_platform("android"), Some(Platform::Google));
        assert_eq!(normalize_platform("ios"), Some(Platform::Apple));
        assert_eq!(normalize_platform("google"), Some(Platform::Google));
        assert_eq!(normalize_platform("apple"), Some(Platform::Apple));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(normalize_platform("ANDROID"), normalize_platform("android"));
        assert_eq!(normalize_platform("IOS"), Some(Platform::Apple));
        assert_eq!(normalize_platform("Google"), Some(Platform::Google));
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(normalize_platform("xbox"), None);
        assert_eq!(normalize_platform(""), None);
    }

    #[test]
    fn test_hint_wins_over_shape() {
        let req = VerificationRequest {
            transaction_id: Some("1000".into()),
            ..Default::default()
        };
        assert_eq!(resolve(Some("google"), &req), Some(Platform::Google));
    }

    #[test]
    fn test_infer_apple_from_transaction_id() {
        let req = VerificationRequest {
            transaction_id: Some("1000".into()),
            ..Default::default()
        };
        assert_eq!(resolve(None, &req), Some(Platform::Apple));
        assert_eq!(resolve(Some("xbox"), &req), Some(Platform::Apple));
    }

    #[test]
    fn test_infer_google_needs_full_triple() {
        let mut req = VerificationRequest {
            package_name: Some("com.example".into()),
            product_id: Some("gems".into()),
            ..Default::default()
        };
        assert_eq!(resolve(None, &req), None);

        req.purchase_token = Some("tok".into());
        assert_eq!(resolve(None, &req), Some(Platform::Google));
    }

    #[test]
    fn test_empty_request_unresolved() {
        assert_eq!(resolve(None, &VerificationRequest::default()), None);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let req = VerificationRequest::google("com.example", "gems", "tok");
        let first = resolve(req.platform.as_deref(), &req);
        let second = resolve(first.map(|p| p.as_str()), &req);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_fields() {
        let req = VerificationRequest {
            package_name: Some("p".into()),
            product_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            missing_fields(Platform::Google, &req),
            vec!["productId", "purchaseToken"]
        );
        assert_eq!(missing_fields(Platform::Apple, &req), vec!["transactionId"]);
    }
}
