//! Business event handed to the caller's queue after a successful verification.
//!
//! Building the event is all this crate does; enqueueing, crediting and
//! persistence stay with the caller.

use serde::{Deserialize, Serialize};

use crate::types::{PurchaseDetails, VerificationResult};

pub const VERIFY_PURCHASE_ACTION: &str = "verify_purchase";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseEvent {
    pub action: String,
    pub result: PurchaseDetails,
    pub user_id: String,
    /// Empty when the vendor reported no transaction id.
    pub transaction_id: String,
}

impl VerificationResult {
    /// Event for the downstream queue; `None` unless verification succeeded.
    pub fn into_event(self, user_id: impl Into<String>) -> Option<PurchaseEvent> {
        if !self.is_success {
            return None;
        }

        let transaction_id = self.result.transaction_id.clone().unwrap_or_default();
        Some(PurchaseEvent {
            action: VERIFY_PURCHASE_ACTION.to_string(),
            result: self.result,
            user_id: user_id.into(),
            transaction_id,
        })
    }
}
