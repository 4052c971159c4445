// ============================================================================
// Deferral Infrastructure - In-Memory Order Repository
// File: crates/deferral-infrastructure/src/memory/order_repo_impl.rs
// ============================================================================

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::debug;

use deferral_core::domain::{LineItem, Order, OrderId, OrderNote, OrderStatus};
use deferral_core::error::DomainError;
use deferral_core::repositories::OrderRepository;

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<BTreeMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new(orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            orders: RwLock::new(orders.into_iter().map(|o| (o.id, o)).collect()),
        }
    }

    pub fn insert(&self, order: Order) {
        self.orders.write().insert(order.id, order);
    }

    /// Host-side status transition. Returns the previous status.
    pub fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<OrderStatus, DomainError> {
        let mut orders = self.orders.write();
        let order = orders
            .get_mut(&order_id)
            .ok_or(DomainError::OrderNotFound(order_id))?;
        Ok(std::mem::replace(&mut order.status, status))
    }

    /// Snapshot of every stored order, sorted by id.
    pub fn all(&self) -> Vec<Order> {
        self.orders.read().values().cloned().collect()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.read().get(&id).cloned())
    }

    fn save_line_item(&self, order_id: OrderId, item: &LineItem) -> Result<(), DomainError> {
        let mut orders = self.orders.write();
        let order = orders
            .get_mut(&order_id)
            .ok_or(DomainError::OrderNotFound(order_id))?;

        debug!(order_id, line_item_id = item.id, "Saving line item");
        order.add_line_item(item.clone());
        Ok(())
    }

    fn save_line_item_with_note(
        &self,
        order_id: OrderId,
        item: &LineItem,
        note: &OrderNote,
    ) -> Result<(), DomainError> {
        let mut orders = self.orders.write();
        let order = orders
            .get_mut(&order_id)
            .ok_or(DomainError::OrderNotFound(order_id))?;
        let stored = order
            .line_item_mut(item.id)
            .ok_or(DomainError::LineItemNotFound {
                order_id,
                line_item_id: item.id,
            })?;

        *stored = item.clone();
        order.add_note(note.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_to_unknown_order_fail() {
        let repo = InMemoryOrderRepository::default();
        let err = repo.save_line_item(1, &LineItem::new(1, 10, None)).unwrap_err();
        assert!(matches!(err, DomainError::OrderNotFound(1)));
        assert!(repo
            .save_line_item_with_note(1, &LineItem::new(1, 10, None), &OrderNote::new("x"))
            .is_err());
    }

    #[test]
    fn test_item_and_note_land_together_or_not_at_all() {
        let mut order = Order::new(5, OrderStatus::Pending);
        order.add_line_item(LineItem::new(1, 10, None));
        let repo = InMemoryOrderRepository::new([order]);

        let mut unknown = LineItem::new(2, 10, None);
        unknown.gl_code = Some("4000".into());
        let err = repo
            .save_line_item_with_note(5, &unknown, &OrderNote::new("changed"))
            .unwrap_err();
        assert!(matches!(err, DomainError::LineItemNotFound { order_id: 5, line_item_id: 2 }));

        let stored = repo.find_by_id(5).unwrap().unwrap();
        assert!(stored.notes.is_empty());
        assert!(stored.line_item(2).is_none());

        let mut item = LineItem::new(1, 10, None);
        item.gl_code = Some("4000".into());
        repo.save_line_item_with_note(5, &item, &OrderNote::new("changed")).unwrap();

        let stored = repo.find_by_id(5).unwrap().unwrap();
        assert_eq!(stored.notes.len(), 1);
        assert_eq!(stored.line_item(1).unwrap().gl_code.as_deref(), Some("4000"));
    }

    #[test]
    fn test_saved_line_item_replaces_existing() {
        let mut order = Order::new(5, OrderStatus::Pending);
        order.add_line_item(LineItem::new(1, 10, None));
        let repo = InMemoryOrderRepository::new([order]);

        let mut item = LineItem::new(1, 10, None);
        item.gl_code = Some("4000".into());
        repo.save_line_item(5, &item).unwrap();

        let stored = repo.find_by_id(5).unwrap().unwrap();
        assert_eq!(stored.line_items.len(), 1);
        assert_eq!(stored.line_item(1).unwrap().gl_code.as_deref(), Some("4000"));
    }
}
