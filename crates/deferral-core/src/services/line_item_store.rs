// ============================================================================
// Deferral Core - Line Item Store
// File: crates/deferral-core/src/services/line_item_store.rs
// ============================================================================
//! Audited writes of deferral periods onto order line items

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use deferral_shared::constants::EMPTY_DATE_LABEL;

use crate::domain::{LineItem, LineItemData, LineItemId, OrderId, OrderNote, Product};
use crate::repositories::OrderRepository;
use crate::services::DateConverter;

pub struct LineItemStore<O: OrderRepository> {
    orders: Arc<O>,
}

impl<O: OrderRepository> LineItemStore<O> {
    pub fn new(orders: Arc<O>) -> Self {
        Self { orders }
    }

    /// Write a deferral period and record one audit note on the order.
    ///
    /// Nothing is written when the order or line item is missing. Identical
    /// dates are written and noted again.
    pub fn update_dates(
        &self,
        order_id: OrderId,
        line_item_id: LineItemId,
        start: NaiveDate,
        end: NaiveDate,
        source: &str,
    ) -> bool {
        let order = match self.orders.find_by_id(order_id) {
            Ok(Some(order)) => order,
            Ok(None) => {
                warn!(order_id, line_item_id, "Cannot update dates: order not found");
                return false;
            }
            Err(e) => {
                error!(order_id, line_item_id, "Cannot update dates: failed to load order: {}", e);
                return false;
            }
        };

        let Some(item) = order.line_item(line_item_id) else {
            warn!(order_id, line_item_id, "Cannot update dates: line item not found on order");
            return false;
        };

        let previous = item.data();
        let mut item = item.clone();
        item.term_start = Some(start);
        item.term_end = Some(end);

        let note = OrderNote::new(audit_note(source, &previous, &item.data()));
        if let Err(e) = self.orders.save_line_item_with_note(order_id, &item, &note) {
            error!(order_id, line_item_id, "Failed to save line item dates: {}", e);
            return false;
        }

        info!(
            order_id,
            line_item_id,
            start = %DateConverter::to_storage(&start),
            end = %DateConverter::to_storage(&end),
            source,
            "Updated line item deferral dates"
        );
        true
    }

    pub fn get_line_item_data(item: &LineItem) -> LineItemData {
        item.data()
    }

    /// Copy a product's GL code and static deferral period onto a new line item.
    ///
    /// Dates are copied only as a complete pair.
    pub fn populate_line_item_meta(item: &mut LineItem, product: &Product) {
        if let Some(gl_code) = product.gl_code.as_ref().filter(|c| !c.is_empty()) {
            item.gl_code = Some(gl_code.clone());
        }

        if let (Some(start), Some(end)) = (product.deferral_start, product.deferral_end) {
            item.term_start = Some(start);
            item.term_end = Some(end);
        }
    }
}

fn audit_note(source: &str, previous: &LineItemData, current: &LineItemData) -> String {
    format!(
        "[{}] changed Term Start Date: {} → {}, Term End Date: {} → {}",
        source,
        or_empty(&previous.start),
        or_empty(&current.start),
        or_empty(&previous.end),
        or_empty(&current.end),
    )
}

fn or_empty(value: &str) -> &str {
    if value.is_empty() {
        EMPTY_DATE_LABEL
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, OrderStatus};
    use crate::error::DomainError;
    use crate::repositories::MockOrderRepository;
    use crate::services::test_support::{capture_logs, simple_product};
    use std::sync::Mutex;
    use tracing::Level;

    fn date(value: &str) -> NaiveDate {
        DateConverter::parse_storage_date(value).unwrap()
    }

    /// Mock backed by a real order so reads observe earlier writes.
    fn stateful_orders(order: Order) -> (MockOrderRepository, Arc<Mutex<Order>>) {
        let state = Arc::new(Mutex::new(order));
        let mut repo = MockOrderRepository::new();

        let read = state.clone();
        repo.expect_find_by_id().returning(move |id| {
            let order = read.lock().unwrap();
            Ok((order.id == id).then(|| order.clone()))
        });

        let write = state.clone();
        repo.expect_save_line_item_with_note().returning(move |_, item, note| {
            let mut order = write.lock().unwrap();
            order.add_line_item(item.clone());
            order.add_note(note.clone());
            Ok(())
        });

        (repo, state)
    }

    fn order_with_item() -> Order {
        let mut order = Order::new(999, OrderStatus::Processing);
        order.add_line_item(LineItem::new(1, 100, None));
        order
    }

    #[test]
    fn test_written_dates_read_back_exactly() {
        let (repo, state) = stateful_orders(order_with_item());
        let store = LineItemStore::new(Arc::new(repo));

        assert!(store.update_dates(999, 1, date("2024-01-01"), date("2024-12-31"), "System"));

        let order = state.lock().unwrap();
        let data = LineItemStore::<MockOrderRepository>::get_line_item_data(order.line_item(1).unwrap());
        assert_eq!(data.start, "2024-01-01");
        assert_eq!(data.end, "2024-12-31");
        assert_eq!(
            order.notes[0].content,
            "[System] changed Term Start Date: empty → 2024-01-01, Term End Date: empty → 2024-12-31"
        );
    }

    #[test]
    fn test_identical_rewrite_is_noted_again() {
        let (repo, state) = stateful_orders(order_with_item());
        let store = LineItemStore::new(Arc::new(repo));

        assert!(store.update_dates(999, 1, date("2024-01-01"), date("2024-12-31"), "System"));
        assert!(store.update_dates(999, 1, date("2024-01-01"), date("2024-12-31"), "System"));

        let order = state.lock().unwrap();
        assert_eq!(order.notes.len(), 2);
        assert_eq!(
            order.notes[1].content,
            "[System] changed Term Start Date: 2024-01-01 → 2024-01-01, Term End Date: 2024-12-31 → 2024-12-31"
        );
        assert_eq!(order.line_item(1).unwrap().data().start, "2024-01-01");
    }

    #[test]
    fn test_half_written_previous_value_renders_empty() {
        let mut order = order_with_item();
        order.line_item_mut(1).unwrap().term_start = Some(date("2023-06-01"));
        let (repo, state) = stateful_orders(order);
        let store = LineItemStore::new(Arc::new(repo));

        assert!(store.update_dates(999, 1, date("2024-01-01"), date("2024-12-31"), "Admin"));
        assert_eq!(
            state.lock().unwrap().notes[0].content,
            "[Admin] changed Term Start Date: 2023-06-01 → 2024-01-01, Term End Date: empty → 2024-12-31"
        );
    }

    #[test]
    fn test_missing_order_or_item_writes_nothing() {
        let mut repo = MockOrderRepository::new();
        repo.expect_find_by_id().returning(|id| Ok((id == 999).then(order_with_item)));
        repo.expect_save_line_item_with_note().times(0);
        let store = LineItemStore::new(Arc::new(repo));

        assert!(!store.update_dates(404, 1, date("2024-01-01"), date("2024-12-31"), "System"));
        assert!(!store.update_dates(999, 2, date("2024-01-01"), date("2024-12-31"), "System"));
    }

    #[test]
    fn test_rejected_write_reports_failure() {
        let mut repo = MockOrderRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(Some(order_with_item())));
        repo.expect_save_line_item_with_note()
            .withf(|order_id, item, note| {
                *order_id == 999
                    && item.term_start == Some(date("2024-01-01"))
                    && note.content.starts_with("[System] changed")
            })
            .times(1)
            .returning(|order_id, item, _| {
                Err(DomainError::LineItemNotFound {
                    order_id,
                    line_item_id: item.id,
                })
            });
        repo.expect_save_line_item().times(0);
        let store = LineItemStore::new(Arc::new(repo));

        let (updated, logs) =
            capture_logs(|| store.update_dates(999, 1, date("2024-01-01"), date("2024-12-31"), "System"));

        assert!(!updated);
        assert_eq!(logs.count(Level::ERROR), 1);
        assert_eq!(logs.count(Level::INFO), 0);
    }

    #[test]
    fn test_unset_meta_reads_as_empty_strings() {
        let data = LineItemStore::<MockOrderRepository>::get_line_item_data(&LineItem::new(1, 100, None));
        assert_eq!(data, LineItemData::default());
        assert!(!data.is_complete());
    }

    #[test]
    fn test_populate_copies_gl_code_and_complete_pair() {
        let mut product = simple_product(100, vec![]);
        product.gl_code = Some("4000-MEM".into());
        product.deferral_start = Some(date("2024-01-01"));
        product.deferral_end = Some(date("2024-12-31"));

        let mut item = LineItem::new(1, 100, None);
        LineItemStore::<MockOrderRepository>::populate_line_item_meta(&mut item, &product);

        assert_eq!(item.data(), LineItemData {
            start: "2024-01-01".into(),
            end: "2024-12-31".into(),
            gl_code: "4000-MEM".into(),
        });
    }

    #[test]
    fn test_populate_skips_half_pair() {
        let mut product = simple_product(100, vec![]);
        product.deferral_start = Some(date("2024-01-01"));

        let mut item = LineItem::new(1, 100, None);
        LineItemStore::<MockOrderRepository>::populate_line_item_meta(&mut item, &product);

        assert!(item.term_start.is_none());
        assert!(item.term_end.is_none());
        assert!(item.gl_code.is_none());
    }
}
