//! Membership subsystem trait (port)
//!
//! Raw calls into the external membership subsystem. Errors it raises come
//! back as [`DomainError::MembershipGateway`] and are contained by
//! `MembershipDateSource`.

use crate::domain::{
    MembershipPlanId, MembershipPostId, MembershipRecord, MembershipTerm, MembershipTierId,
    OrderId, ProductId,
};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
pub trait MembershipGateway: Send + Sync {
    /// Tier attached to a product, if any.
    fn tier_for_product(&self, product_id: ProductId) -> Result<Option<MembershipTierId>, DomainError>;

    /// Plan configuration behind a tier, if any.
    fn plan_for_tier(&self, tier_id: MembershipTierId) -> Result<Option<MembershipPlanId>, DomainError>;

    /// Compute a term for a plan. May return an incomplete term.
    fn compute_term(
        &self,
        plan_id: MembershipPlanId,
        existing: Option<MembershipRecord>,
    ) -> Result<MembershipTerm, DomainError>;

    fn membership_for_order(
        &self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<Option<MembershipRecord>, DomainError>;

    fn membership_by_id(&self, post_id: MembershipPostId) -> Result<Option<MembershipRecord>, DomainError>;
}
