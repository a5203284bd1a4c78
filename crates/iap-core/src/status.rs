//! Vendor state → unified status.
//!
//! Both mappings are total: anything unrecognized is `Failed`.

use crate::types::{AppleTransaction, GoogleProductPurchase, UnifiedStatus};

const GOOGLE_PURCHASED: i64 = 0;
const GOOGLE_NOT_CONSUMED: i64 = 0;
const GOOGLE_CONSUMED: i64 = 1;

const APPLE_OWNERSHIP_PURCHASED: &str = "PURCHASED";
const APPLE_TYPE_CONSUMABLE: &str = "consumable";

/// Map Google `purchaseState` / `consumptionState` codes.
///
/// | purchaseState | consumptionState | status |
/// |---|---|---|
/// | 0 purchased | 0 not consumed | `Pending` |
/// | 0 purchased | 1 consumed | `Completed` |
/// | anything else | | `Failed` |
pub fn map_google_status(purchase_state: Option<i64>, consumption_state: Option<i64>) -> UnifiedStatus {
    match (purchase_state, consumption_state) {
        (Some(GOOGLE_PURCHASED), Some(GOOGLE_NOT_CONSUMED)) => UnifiedStatus::Pending,
        (Some(GOOGLE_PURCHASED), Some(GOOGLE_CONSUMED)) => UnifiedStatus::Completed,
        _ => UnifiedStatus::Failed,
    }
}

/// Map Apple `inAppOwnershipType` / `type`.
pub fn map_apple_status(ownership_type: Option<&str>, product_type: Option<&str>) -> UnifiedStatus {
    match ownership_type {
        Some(APPLE_OWNERSHIP_PURCHASED) => {
            if product_type.is_some_and(|t| t.eq_ignore_ascii_case(APPLE_TYPE_CONSUMABLE)) {
                UnifiedStatus::Completed
            } else {
                UnifiedStatus::Pending
            }
        }
        _ => UnifiedStatus::Failed,
    }
}

pub(crate) fn google_purchase_status(purchase: &GoogleProductPurchase) -> UnifiedStatus {
    map_google_status(purchase.purchase_state, purchase.consumption_state)
}

pub(crate) fn apple_transaction_status(tx: &AppleTransaction) -> UnifiedStatus {
    map_apple_status(
        tx.in_app_ownership_type.as_deref(),
        tx.product_type.as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_table() {
        assert_eq!(map_google_status(Some(0), Some(0)), UnifiedStatus::Pending);
        assert_eq!(map_google_status(Some(0), Some(1)), UnifiedStatus::Completed);
        // canceled
        assert_eq!(map_google_status(Some(1), Some(0)), UnifiedStatus::Failed);
        assert_eq!(map_google_status(Some(1), Some(1)), UnifiedStatus::Failed);
        // pending
        assert_eq!(map_google_status(Some(2), Some(0)), UnifiedStatus::Failed);
        assert_eq!(map_google_status(Some(2), Some(1)), UnifiedStatus::Failed);
    }

    #[test]
    fn test_google_unmapped_codes_fail() {
        for purchase in [-1, 3, 42, i64::MAX, i64::MIN] {
            for consumption in [-1, 0, 1, 2, 99] {
                let status = map_google_status(Some(purchase), Some(consumption));
                assert_eq!(status, UnifiedStatus::Failed, "({purchase}, {consumption})");
            }
        }
        assert_eq!(map_google_status(Some(0), Some(2)), UnifiedStatus::Failed);
        assert_eq!(map_google_status(Some(0), None), UnifiedStatus::Failed);
        assert_eq!(map_google_status(None, Some(1)), UnifiedStatus::Failed);
        assert_eq!(map_google_status(None, None), UnifiedStatus::Failed);
    }

    #[test]
    fn test_apple_consumable_completed() {
        assert_eq!(
            map_apple_status(Some("PURCHASED"), Some("Consumable")),
            UnifiedStatus::Completed
        );
        assert_eq!(
            map_apple_status(Some("PURCHASED"), Some("consumable")),
            UnifiedStatus::Completed
        );
    }

    #[test]
    fn test_apple_other_types_pending() {
        for product_type in [
            Some("Non-Consumable"),
            Some("non_consumable"),
            Some("Auto-Renewable Subscription"),
            Some("Non-Renewing Subscription"),
            None,
        ] {
            assert_eq!(
                map_apple_status(Some("PURCHASED"), product_type),
                UnifiedStatus::Pending,
                "{product_type:?}"
            );
        }
    }

    #[test]
    fn test_apple_not_purchased_fails() {
        assert_eq!(
            map_apple_status(Some("FAMILY_SHARED"), Some("Consumable")),
            UnifiedStatus::Failed
        );
        assert_eq!(map_apple_status(Some("purchased"), Some("Consumable")), UnifiedStatus::Failed);
        assert_eq!(map_apple_status(None, Some("Consumable")), UnifiedStatus::Failed);
        assert_eq!(map_apple_status(None, None), UnifiedStatus::Failed);
    }

    #[test]
    fn test_payload_helpers() {
        let purchase = GoogleProductPurchase {
            purchase_state: Some(0),
            consumption_state: Some(1),
            ..Default::default()
        };
        assert_eq!(google_purchase_status(&purchase), UnifiedStatus::Completed);

        let tx = AppleTransaction {
            in_app_ownership_type: Some("PURCHASED".into()),
            product_type: Some("Non-Consumable".into()),
            ..Default::default()
        };
        assert_eq!(apple_transaction_status(&tx), UnifiedStatus::Pending);
    }
}
