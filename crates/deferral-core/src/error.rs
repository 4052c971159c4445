//! Domain errors

use thiserror::Error;

use crate::domain::{LineItemId, OrderId};

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Line item {line_item_id} not found on order {order_id}")]
    LineItemNotFound { order_id: OrderId, line_item_id: LineItemId },

    #[error("Membership gateway error: {0}")]
    MembershipGateway(String),
}
