// ============================================================================
// Deferral Core - Order Entity
// File: crates/deferral-core/src/domain/order.rs
// Description: Order aggregate with line items and audit notes
// ============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::line_item::{LineItem, LineItemId};
use super::product::ProductId;

pub type OrderId = u64;

/// Order status enumeration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    CheckoutDraft,
    Draft,
    Pending,
    OnHold,
    Processing,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    /// Statuses registered by other extensions.
    Custom(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::CheckoutDraft => "checkout-draft",
            OrderStatus::Draft => "draft",
            OrderStatus::Pending => "pending",
            OrderStatus::OnHold => "on-hold",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Failed => "failed",
            OrderStatus::Custom(slug) => slug,
        }
    }

    /// Parse a status slug. Accepts the `wc-` prefixed storage form as well.
    pub fn from_slug(s: &str) -> Self {
        let slug = s.strip_prefix("wc-").unwrap_or(s);
        match slug {
            "checkout-draft" => OrderStatus::CheckoutDraft,
            "draft" => OrderStatus::Draft,
            "pending" => OrderStatus::Pending,
            "on-hold" => OrderStatus::OnHold,
            "processing" => OrderStatus::Processing,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            "refunded" => OrderStatus::Refunded,
            "failed" => OrderStatus::Failed,
            other => OrderStatus::Custom(other.to_string()),
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        OrderStatus::from_slug(&s)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit note on an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNote {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl OrderNote {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Order aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub line_items: BTreeMap<LineItemId, LineItem>,
    #[serde(default)]
    pub notes: Vec<OrderNote>,
}

impl Order {
    pub fn new(id: OrderId, status: OrderStatus) -> Self {
        Self {
            id,
            status,
            line_items: BTreeMap::new(),
            notes: Vec::new(),
        }
    }

    pub fn status(&self) -> &OrderStatus {
        &self.status
    }

    pub fn line_item(&self, id: LineItemId) -> Option<&LineItem> {
        self.line_items.get(&id)
    }

    pub fn line_item_mut(&mut self, id: LineItemId) -> Option<&mut LineItem> {
        self.line_items.get_mut(&id)
    }

    /// First line item whose product or variation is `product_id`.
    pub fn find_line_item_for_product(&self, product_id: ProductId) -> Option<&LineItem> {
        self.line_items.values().find(|item| item.references_product(product_id))
    }

    pub fn add_line_item(&mut self, item: LineItem) {
        self.line_items.insert(item.id, item);
    }

    pub fn add_note(&mut self, note: OrderNote) {
        self.notes.push(note);
    }
}
