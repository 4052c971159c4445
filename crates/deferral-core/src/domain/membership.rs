// ============================================================================
// Deferral Core - Membership Types
// File: crates/deferral-core/src/domain/membership.rs
// Description: Records and payloads owned by the external membership subsystem
// ============================================================================

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::order::OrderId;
use super::product::ProductId;

pub type MembershipPostId = u64;
pub type MembershipTierId = u64;
pub type MembershipPlanId = u64;

/// Persisted membership record. Dates are upstream ISO-8601 timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub post_id: MembershipPostId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub ends_at: Option<String>,
}

/// Term computed by the membership subsystem for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipTerm {
    pub start: String,
    pub end: String,
    pub early_renew_at: Option<String>,
    pub expires_at: Option<String>,
}

/// Start/end read straight off a persisted membership record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoritativeDates {
    pub start: String,
    pub end: String,
}

/// Payload raised when a membership record is created or renewed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MembershipEventData {
    #[validate(required)]
    pub membership_post_id: Option<MembershipPostId>,

    #[validate(required)]
    pub membership_parent_order_id: Option<OrderId>,

    #[validate(required)]
    pub membership_product_id: Option<ProductId>,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,
}

impl MembershipEventData {
    /// Names of required keys that are absent, sorted.
    pub fn missing_keys(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => {
                let mut keys: Vec<String> = errors
                    .field_errors()
                    .keys()
                    .map(|k| k.to_string())
                    .collect();
                keys.sort();
                keys
            }
        }
    }
}
