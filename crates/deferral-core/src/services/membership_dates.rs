// ============================================================================
// Deferral Core - Membership Date Source
// File: crates/deferral-core/src/services/membership_dates.rs
// Description: Facade over the optional external membership subsystem
// ============================================================================

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::{AuthoritativeDates, MembershipPostId, MembershipRecord, MembershipTerm, OrderId, ProductId};
use crate::repositories::MembershipGateway;

/// The membership subsystem, which may not be installed at all.
///
/// Date lookups live on [`MembershipDates`], only reachable through
/// [`MembershipDateSource::available`].
pub enum MembershipDateSource<G: MembershipGateway> {
    Available(Arc<G>),
    Unavailable,
}

impl<G: MembershipGateway> MembershipDateSource<G> {
    pub fn from_option(gateway: Option<Arc<G>>) -> Self {
        match gateway {
            Some(gateway) => MembershipDateSource::Available(gateway),
            None => MembershipDateSource::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, MembershipDateSource::Available(_))
    }

    pub fn available(&self) -> Option<MembershipDates<'_, G>> {
        match self {
            MembershipDateSource::Available(gateway) => Some(MembershipDates { gateway }),
            MembershipDateSource::Unavailable => None,
        }
    }
}

/// Handle to an installed membership subsystem. Every call is independently
/// fallible and returns `None` on failure; gateway errors are logged here.
pub struct MembershipDates<'a, G: MembershipGateway> {
    gateway: &'a G,
}

impl<'a, G: MembershipGateway> MembershipDates<'a, G> {
    /// Term for a product via its tier and plan.
    pub fn calculate_dates(
        &self,
        product_id: ProductId,
        existing: Option<MembershipRecord>,
    ) -> Option<MembershipTerm> {
        let tier_id = match self.gateway.tier_for_product(product_id) {
            Ok(Some(tier_id)) => tier_id,
            Ok(None) => {
                warn!(product_id, "No membership tier attached to product");
                return None;
            }
            Err(e) => {
                error!(product_id, "Membership tier lookup failed: {}", e);
                return None;
            }
        };

        let plan_id = match self.gateway.plan_for_tier(tier_id) {
            Ok(Some(plan_id)) => plan_id,
            Ok(None) => {
                warn!(product_id, tier_id, "No membership plan configured for tier");
                return None;
            }
            Err(e) => {
                error!(product_id, tier_id, "Membership plan lookup failed: {}", e);
                return None;
            }
        };

        let term = match self.gateway.compute_term(plan_id, existing) {
            Ok(term) => term,
            Err(e) => {
                error!(product_id, plan_id, "Membership term computation failed: {}", e);
                return None;
            }
        };

        if term.start.is_empty() || term.end.is_empty() {
            warn!(
                product_id,
                plan_id,
                start = %term.start,
                end = %term.end,
                "Membership term is incomplete"
            );
            return None;
        }

        Some(term)
    }

    pub fn get_membership_from_order(
        &self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Option<MembershipRecord> {
        match self.gateway.membership_for_order(order_id, product_id) {
            Ok(record) => {
                if record.is_none() {
                    debug!(order_id, product_id, "No membership linked to order");
                }
                record
            }
            Err(e) => {
                error!(order_id, product_id, "Membership lookup by order failed: {}", e);
                None
            }
        }
    }

    /// Start/end persisted on the membership record; `None` if either is empty.
    pub fn get_authoritative_membership_dates(
        &self,
        membership_post_id: MembershipPostId,
    ) -> Option<AuthoritativeDates> {
        let record = match self.gateway.membership_by_id(membership_post_id) {
            Ok(record) => record?,
            Err(e) => {
                error!(membership_post_id, "Membership record lookup failed: {}", e);
                return None;
            }
        };

        let start = record.starts_at.filter(|s| !s.is_empty())?;
        let end = record.ends_at.filter(|s| !s.is_empty())?;
        Some(AuthoritativeDates { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::repositories::MockMembershipGateway;
    use crate::services::test_support::capture_logs;
    use tracing::Level;

    fn term(start: &str, end: &str) -> MembershipTerm {
        MembershipTerm {
            start: start.into(),
            end: end.into(),
            early_renew_at: None,
            expires_at: None,
        }
    }

    fn record(starts_at: Option<&str>, ends_at: Option<&str>) -> MembershipRecord {
        MembershipRecord {
            post_id: 100,
            order_id: 999,
            product_id: 55,
            starts_at: starts_at.map(Into::into),
            ends_at: ends_at.map(Into::into),
        }
    }

    #[test]
    fn test_unavailable_exposes_no_handle() {
        let source: MembershipDateSource<MockMembershipGateway> = MembershipDateSource::from_option(None);
        assert!(!source.is_available());
        assert!(source.available().is_none());
    }

    #[test]
    fn test_calculate_dates_follows_tier_and_plan() {
        let mut gateway = MockMembershipGateway::new();
        gateway.expect_tier_for_product().withf(|id| *id == 100).returning(|_| Ok(Some(7)));
        gateway.expect_plan_for_tier().withf(|id| *id == 7).returning(|_| Ok(Some(3)));
        gateway
            .expect_compute_term()
            .withf(|plan, existing| *plan == 3 && existing.is_none())
            .returning(|_, _| Ok(term("2024-01-01T00:00:00+00:00", "2024-12-31T23:59:59+00:00")));

        let source = MembershipDateSource::Available(Arc::new(gateway));
        let term = source.available().unwrap().calculate_dates(100, None).unwrap();
        assert_eq!(term.start, "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_missing_plan_warns_with_tier() {
        let mut gateway = MockMembershipGateway::new();
        gateway.expect_tier_for_product().returning(|_| Ok(Some(7)));
        gateway.expect_plan_for_tier().returning(|_| Ok(None));
        gateway.expect_compute_term().times(0);

        let source = MembershipDateSource::Available(Arc::new(gateway));
        let (result, logs) = capture_logs(|| source.available().unwrap().calculate_dates(100, None));

        assert!(result.is_none());
        assert_eq!(logs.count(Level::WARN), 1);
    }

    #[test]
    fn test_incomplete_term_is_a_failure() {
        let mut gateway = MockMembershipGateway::new();
        gateway.expect_tier_for_product().returning(|_| Ok(Some(7)));
        gateway.expect_plan_for_tier().returning(|_| Ok(Some(3)));
        gateway.expect_compute_term().returning(|_, _| Ok(term("2024-01-01T00:00:00+00:00", "")));

        let source = MembershipDateSource::Available(Arc::new(gateway));
        assert!(source.available().unwrap().calculate_dates(100, None).is_none());
    }

    #[test]
    fn test_gateway_error_is_contained_and_logged() {
        let mut gateway = MockMembershipGateway::new();
        gateway
            .expect_tier_for_product()
            .returning(|_| Err(DomainError::MembershipGateway("plugin exploded".into())));

        let source = MembershipDateSource::Available(Arc::new(gateway));
        let (result, logs) = capture_logs(|| source.available().unwrap().calculate_dates(100, None));

        assert!(result.is_none());
        assert_eq!(logs.count(Level::ERROR), 1);
    }

    #[test]
    fn test_authoritative_dates_require_both_values() {
        let mut gateway = MockMembershipGateway::new();
        gateway.expect_membership_by_id().returning(|id| match id {
            1 => Ok(Some(record(Some("2024-01-01 00:00:00"), Some("2025-01-01 00:00:00")))),
            2 => Ok(Some(record(Some("2024-01-01 00:00:00"), Some("")))),
            3 => Ok(Some(record(None, Some("2025-01-01 00:00:00")))),
            _ => Ok(None),
        });

        let source = MembershipDateSource::Available(Arc::new(gateway));
        let dates = source.available().unwrap();
        assert_eq!(
            dates.get_authoritative_membership_dates(1),
            Some(AuthoritativeDates {
                start: "2024-01-01 00:00:00".into(),
                end: "2025-01-01 00:00:00".into(),
            })
        );
        assert!(dates.get_authoritative_membership_dates(2).is_none());
        assert!(dates.get_authoritative_membership_dates(3).is_none());
        assert!(dates.get_authoritative_membership_dates(4).is_none());
    }

    #[test]
    fn test_membership_from_order() {
        let mut gateway = MockMembershipGateway::new();
        gateway
            .expect_membership_for_order()
            .withf(|order, product| *order == 999 && *product == 55)
            .returning(|_, _| Ok(Some(record(None, None))));

        let source = MembershipDateSource::Available(Arc::new(gateway));
        let found = source.available().unwrap().get_membership_from_order(999, 55);
        assert_eq!(found.map(|r| r.post_id), Some(100));
    }
}
