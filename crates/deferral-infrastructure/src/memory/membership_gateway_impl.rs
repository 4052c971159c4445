// ============================================================================
// Deferral Infrastructure - In-Memory Membership Gateway
// File: crates/deferral-infrastructure/src/memory/membership_gateway_impl.rs
// Description: Stand-in for the external membership subsystem
// ============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Days, Months, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use deferral_core::domain::{
    MembershipPlanId, MembershipPostId, MembershipRecord, MembershipTerm, MembershipTierId, OrderId,
    ProductId,
};
use deferral_core::error::DomainError;
use deferral_core::repositories::MembershipGateway;

/// Days before the end of a term from which early renewal opens.
const EARLY_RENEW_WINDOW_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermUnit {
    Day,
    Month,
    Year,
}

/// Length of a membership term for one plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTerm {
    pub plan_id: MembershipPlanId,
    pub length: u32,
    pub unit: TermUnit,
}

#[derive(Default)]
pub struct InMemoryMembershipGateway {
    tiers_by_product: BTreeMap<ProductId, MembershipTierId>,
    plans_by_tier: BTreeMap<MembershipTierId, MembershipPlanId>,
    terms: BTreeMap<MembershipPlanId, PlanTerm>,
    memberships: RwLock<BTreeMap<MembershipPostId, MembershipRecord>>,
    /// Fixed clock; the system clock when unset.
    now: Option<DateTime<Utc>>,
}

impl InMemoryMembershipGateway {
    pub fn new(
        tiers_by_product: BTreeMap<ProductId, MembershipTierId>,
        plans_by_tier: BTreeMap<MembershipTierId, MembershipPlanId>,
        terms: impl IntoIterator<Item = PlanTerm>,
        memberships: impl IntoIterator<Item = MembershipRecord>,
        now: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            tiers_by_product,
            plans_by_tier,
            terms: terms.into_iter().map(|t| (t.plan_id, t)).collect(),
            memberships: RwLock::new(memberships.into_iter().map(|m| (m.post_id, m)).collect()),
            now,
        }
    }

    pub fn insert_membership(&self, record: MembershipRecord) {
        self.memberships.write().insert(record.post_id, record);
    }

    pub fn tiers_by_product(&self) -> &BTreeMap<ProductId, MembershipTierId> {
        &self.tiers_by_product
    }

    pub fn plans_by_tier(&self) -> &BTreeMap<MembershipTierId, MembershipPlanId> {
        &self.plans_by_tier
    }

    pub fn terms(&self) -> Vec<PlanTerm> {
        self.terms.values().cloned().collect()
    }

    pub fn memberships(&self) -> Vec<MembershipRecord> {
        self.memberships.read().values().cloned().collect()
    }

    pub fn fixed_now(&self) -> Option<DateTime<Utc>> {
        self.now
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

impl MembershipGateway for InMemoryMembershipGateway {
    fn tier_for_product(&self, product_id: ProductId) -> Result<Option<MembershipTierId>, DomainError> {
        Ok(self.tiers_by_product.get(&product_id).copied())
    }

    fn plan_for_tier(&self, tier_id: MembershipTierId) -> Result<Option<MembershipPlanId>, DomainError> {
        Ok(self.plans_by_tier.get(&tier_id).copied())
    }

    fn compute_term(
        &self,
        plan_id: MembershipPlanId,
        existing: Option<MembershipRecord>,
    ) -> Result<MembershipTerm, DomainError> {
        let term = self.terms.get(&plan_id).ok_or_else(|| {
            DomainError::MembershipGateway(format!("no term length configured for plan {plan_id}"))
        })?;

        // Renewals continue from the current end when it is still in the future.
        let now = self.now();
        let start = existing
            .as_ref()
            .and_then(|record| record.ends_at.as_deref())
            .and_then(parse_upstream)
            .map(|end| end + TimeDelta::seconds(1))
            .filter(|end| *end > now)
            .unwrap_or(now);

        let start_of_day = start.date_naive();
        let end_exclusive = add_term(start_of_day, term).ok_or_else(|| {
            DomainError::MembershipGateway(format!("term for plan {plan_id} overflows the calendar"))
        })?;

        let start = day_start(start_of_day);
        let end = day_start(end_exclusive) - TimeDelta::seconds(1);
        let early_renew_at = end
            .checked_sub_days(Days::new(EARLY_RENEW_WINDOW_DAYS))
            .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, false));

        debug!(plan_id, start = %start, end = %end, "Computed membership term");
        Ok(MembershipTerm {
            start: start.to_rfc3339_opts(SecondsFormat::Secs, false),
            end: end.to_rfc3339_opts(SecondsFormat::Secs, false),
            early_renew_at,
            expires_at: Some(end.to_rfc3339_opts(SecondsFormat::Secs, false)),
        })
    }

    fn membership_for_order(
        &self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<Option<MembershipRecord>, DomainError> {
        Ok(self
            .memberships
            .read()
            .values()
            .find(|m| m.order_id == order_id && m.product_id == product_id)
            .cloned())
    }

    fn membership_by_id(&self, post_id: MembershipPostId) -> Result<Option<MembershipRecord>, DomainError> {
        Ok(self.memberships.read().get(&post_id).cloned())
    }
}

fn add_term(start: NaiveDate, term: &PlanTerm) -> Option<NaiveDate> {
    match term.unit {
        TermUnit::Day => start.checked_add_days(Days::new(u64::from(term.length))),
        TermUnit::Month => start.checked_add_months(Months::new(term.length)),
        TermUnit::Year => start.checked_add_months(Months::new(term.length.checked_mul(12)?)),
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Accepts RFC 3339 and the `YYYY-MM-DD HH:MM:SS` form stored on membership records.
fn parse_upstream(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|d| d.and_utc())
        })
}
