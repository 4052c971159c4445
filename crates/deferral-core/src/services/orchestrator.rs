// ============================================================================
// Deferral Core - Orchestrator
// File: crates/deferral-core/src/services/orchestrator.rs
// ============================================================================
//! Reacts to order and membership lifecycle events by computing and
//! persisting deferral periods.
//!
//! Entry points never fail: every problem is logged and reported through
//! [`DeferralOutcome`]. A failing line item never stops its siblings.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use deferral_shared::constants::{SOURCE_MEMBERSHIP_CREATED, SOURCE_SYSTEM};

use crate::domain::{LineItem, MembershipEventData, Order, OrderId, OrderStatus};
use crate::repositories::{MembershipGateway, OrderRepository, ProductRepository, SettingsRepository};
use crate::services::{
    DateConverter, DeferralOutcome, Eligibility, EligibilityConfig, LineItemOutcome, LineItemStore,
    MembershipDateSource, MembershipDates, SettingsGate, SkipReason,
};

pub struct DeferralOrchestrator<S, P, O, G>
where
    S: SettingsRepository,
    P: ProductRepository,
    O: OrderRepository,
    G: MembershipGateway,
{
    gate: SettingsGate<S>,
    eligibility: Eligibility<S, P>,
    orders: Arc<O>,
    store: LineItemStore<O>,
    membership: MembershipDateSource<G>,
}

impl<S, P, O, G> DeferralOrchestrator<S, P, O, G>
where
    S: SettingsRepository,
    P: ProductRepository,
    O: OrderRepository,
    G: MembershipGateway,
{
    pub fn new(
        settings: Arc<S>,
        products: Arc<P>,
        orders: Arc<O>,
        membership: MembershipDateSource<G>,
        config: EligibilityConfig,
    ) -> Self {
        Self {
            gate: SettingsGate::new(settings.clone()),
            eligibility: Eligibility::new(settings, products, config),
            store: LineItemStore::new(orders.clone()),
            orders,
            membership,
        }
    }

    pub fn membership(&self) -> &MembershipDateSource<G> {
        &self.membership
    }

    /// Order moved from `old_status` to `new_status`.
    pub fn on_order_status_changed(
        &self,
        order_id: OrderId,
        old_status: &OrderStatus,
        new_status: &OrderStatus,
    ) -> DeferralOutcome {
        if !self.gate.is_system_enabled() {
            debug!(order_id, "Deferral dates disabled, ignoring status change");
            return DeferralOutcome::SystemDisabled;
        }

        if !self.gate.is_trigger_status(new_status) {
            debug!(order_id, from = %old_status, to = %new_status, "Status is not a trigger");
            return DeferralOutcome::NotTriggerStatus(new_status.to_string());
        }

        let order = match self.orders.find_by_id(order_id) {
            Ok(Some(order)) => order,
            Ok(None) => {
                warn!(order_id, "Order not found for status change");
                return DeferralOutcome::OrderNotFound(order_id);
            }
            Err(e) => {
                error!(order_id, "Failed to load order for status change: {}", e);
                return DeferralOutcome::OrderNotFound(order_id);
            }
        };

        let Some(membership) = self.membership.available() else {
            debug!(order_id, "Membership subsystem unavailable, skipping order");
            return DeferralOutcome::MembershipUnavailable;
        };

        info!(order_id, from = %old_status, to = %new_status, "Computing deferral dates after status change");
        DeferralOutcome::Processed(self.process_line_items(&order, &membership))
    }

    /// Order was created with its initial status already set.
    pub fn on_order_created(&self, order_id: OrderId, order: &Order) -> DeferralOutcome {
        if !self.gate.is_system_enabled() {
            debug!(order_id, "Deferral dates disabled, ignoring new order");
            return DeferralOutcome::SystemDisabled;
        }

        let status = order.status();
        if !self.gate.is_trigger_status(status) {
            debug!(order_id, status = %status, "New order status is not a trigger");
            return DeferralOutcome::NotTriggerStatus(status.to_string());
        }

        let Some(membership) = self.membership.available() else {
            debug!(order_id, "Membership subsystem unavailable, skipping new order");
            return DeferralOutcome::MembershipUnavailable;
        };

        info!(order_id, status = %status, "Computing deferral dates for new order");
        DeferralOutcome::Processed(self.process_line_items(order, &membership))
    }

    /// A membership record was created or renewed. Its persisted dates win.
    pub fn on_membership_created(
        &self,
        data: &MembershipEventData,
        is_renewal: bool,
        is_upgrade: bool,
    ) -> DeferralOutcome {
        if !self.gate.is_system_enabled() {
            return DeferralOutcome::SystemDisabled;
        }

        let Some(membership) = self.membership.available() else {
            debug!("Membership subsystem unavailable, ignoring membership event");
            return DeferralOutcome::MembershipUnavailable;
        };

        let (Some(post_id), Some(order_id), Some(product_id)) = (
            data.membership_post_id,
            data.membership_parent_order_id,
            data.membership_product_id,
        ) else {
            let missing = data.missing_keys();
            warn!(missing = ?missing, "Membership event is missing required data");
            return DeferralOutcome::InvalidMembershipData(missing);
        };

        debug!(membership_post_id = post_id, order_id, product_id, is_renewal, is_upgrade, "Membership created");

        let Some(dates) = membership.get_authoritative_membership_dates(post_id) else {
            warn!(membership_post_id = post_id, order_id, "Membership record has no complete start/end dates");
            return DeferralOutcome::AuthoritativeDatesMissing(post_id);
        };

        let (Some(start), Some(end)) = (
            DateConverter::from_upstream_timestamp(&dates.start),
            DateConverter::from_upstream_timestamp(&dates.end),
        ) else {
            error!(
                membership_post_id = post_id,
                start = %dates.start,
                end = %dates.end,
                "Membership dates are not valid dates"
            );
            return DeferralOutcome::InvalidDates;
        };

        let order = match self.orders.find_by_id(order_id) {
            Ok(Some(order)) => order,
            Ok(None) => {
                warn!(membership_post_id = post_id, order_id, "Parent order of membership not found");
                return DeferralOutcome::OrderNotFound(order_id);
            }
            Err(e) => {
                error!(membership_post_id = post_id, order_id, "Failed to load parent order: {}", e);
                return DeferralOutcome::OrderNotFound(order_id);
            }
        };

        let Some(item) = order.find_line_item_for_product(product_id) else {
            warn!(
                membership_post_id = post_id,
                order_id,
                product_id,
                "No line item for membership product on parent order"
            );
            return DeferralOutcome::LineItemNotFound { order_id, product_id };
        };

        if !self.store.update_dates(order_id, item.id, start, end, SOURCE_MEMBERSHIP_CREATED) {
            return DeferralOutcome::WriteFailed;
        }

        DeferralOutcome::Processed(vec![LineItemOutcome::Updated {
            line_item_id: item.id,
            start,
            end,
        }])
    }

    /// A line item was attached to an order: copy static product meta onto it.
    ///
    /// The item is saved even when its product cannot be resolved; only the
    /// meta copy is skipped. Returns false when the save itself fails.
    pub fn on_line_item_created(&self, order_id: OrderId, mut item: LineItem) -> bool {
        let product_id = item.purchased_product_id();
        match self.eligibility.find_product(product_id) {
            Some(product) => {
                if let Some(effective) = self.eligibility.resolve_effective_product(&product) {
                    LineItemStore::<O>::populate_line_item_meta(&mut item, &effective);
                }
            }
            None => {
                warn!(order_id, line_item_id = item.id, product_id, "Line item product not found, meta not copied");
            }
        }

        match self.orders.save_line_item(order_id, &item) {
            Ok(()) => true,
            Err(e) => {
                error!(order_id, line_item_id = item.id, "Failed to save new line item: {}", e);
                false
            }
        }
    }

    fn process_line_items(&self, order: &Order, membership: &MembershipDates<'_, G>) -> Vec<LineItemOutcome> {
        order
            .line_items
            .values()
            .map(|item| {
                let result = self.process_line_item(order.id, item, membership);
                match result {
                    Ok(outcome) => outcome,
                    Err(reason) => LineItemOutcome::Skipped {
                        line_item_id: item.id,
                        reason,
                    },
                }
            })
            .collect()
    }

    fn process_line_item(
        &self,
        order_id: OrderId,
        item: &LineItem,
        membership: &MembershipDates<'_, G>,
    ) -> Result<LineItemOutcome, SkipReason> {
        let line_item_id = item.id;
        let product_id = item.purchased_product_id();

        let product = self.eligibility.find_product(product_id).ok_or_else(|| {
            warn!(order_id, line_item_id, product_id, "Line item product not found");
            SkipReason::ProductNotFound
        })?;

        if !self.eligibility.is_membership_product(&product) {
            debug!(order_id, line_item_id, product_id, "Not a membership product");
            return Err(SkipReason::NotMembershipProduct);
        }

        if !self.eligibility.is_deferred_revenue_required(&product) {
            debug!(order_id, line_item_id, product_id, "Deferred revenue not required");
            return Err(SkipReason::DeferredRevenueNotRequired);
        }

        let term = membership
            .calculate_dates(product.id, None)
            .ok_or(SkipReason::NoMembershipTerm)?;

        let (Some(start), Some(end)) = (
            DateConverter::from_upstream_timestamp(&term.start),
            DateConverter::from_upstream_timestamp(&term.end),
        ) else {
            error!(
                order_id,
                line_item_id,
                product_id,
                start = %term.start,
                end = %term.end,
                "Calculated membership dates are not valid dates"
            );
            return Err(SkipReason::InvalidDates);
        };

        if !self.store.update_dates(order_id, line_item_id, start, end, SOURCE_SYSTEM) {
            return Err(SkipReason::WriteFailed);
        }

        info!(order_id, line_item_id, product_id, "Deferral dates set from membership term");
        Ok(LineItemOutcome::Updated {
            line_item_id,
            start,
            end,
        })
    }
}
