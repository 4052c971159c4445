//! Order repository trait (port)

use crate::domain::{LineItem, Order, OrderId, OrderNote};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
pub trait OrderRepository: Send + Sync {
    fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, DomainError>;
    /// Persist one line item of an existing order.
    fn save_line_item(&self, order_id: OrderId, item: &LineItem) -> Result<(), DomainError>;
    /// Persist an existing line item and append `note` to the order's audit
    /// log in one write. On error neither is stored.
    fn save_line_item_with_note(
        &self,
        order_id: OrderId,
        item: &LineItem,
        note: &OrderNote,
    ) -> Result<(), DomainError>;
}
