//! What an orchestrator run did, for hosts and tests

use chrono::NaiveDate;

use crate::domain::{LineItemId, MembershipPostId, OrderId, ProductId};

/// Result of one lifecycle event. Every variant is a normal completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferralOutcome {
    SystemDisabled,
    NotTriggerStatus(String),
    OrderNotFound(OrderId),
    MembershipUnavailable,
    /// Required payload keys that were absent.
    InvalidMembershipData(Vec<String>),
    AuthoritativeDatesMissing(MembershipPostId),
    InvalidDates,
    LineItemNotFound { order_id: OrderId, product_id: ProductId },
    WriteFailed,
    Processed(Vec<LineItemOutcome>),
}

impl DeferralOutcome {
    pub fn updated_count(&self) -> usize {
        match self {
            DeferralOutcome::Processed(items) => items.iter().filter(|i| i.is_updated()).count(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItemOutcome {
    Updated {
        line_item_id: LineItemId,
        start: NaiveDate,
        end: NaiveDate,
    },
    Skipped {
        line_item_id: LineItemId,
        reason: SkipReason,
    },
}

impl LineItemOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, LineItemOutcome::Updated { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ProductNotFound,
    NotMembershipProduct,
    DeferredRevenueNotRequired,
    NoMembershipTerm,
    InvalidDates,
    WriteFailed,
}
