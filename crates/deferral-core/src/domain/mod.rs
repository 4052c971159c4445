//! # Deferral Core - Domain Module
//! 
//! Domain entities for revenue deferral periods.

pub mod order;
pub mod line_item;
pub mod product;
pub mod membership;
pub mod surface;

// Re-export all entities and enums
pub use order::{Order, OrderId, OrderNote, OrderStatus};
pub use line_item::{LineItem, LineItemData, LineItemId};
pub use product::{deferred_flag_from_meta, effective_product_id, Category, CategoryId, Product, ProductId, ProductKind};
pub use membership::{
    AuthoritativeDates, MembershipEventData, MembershipPlanId, MembershipPostId, MembershipRecord,
    MembershipTerm, MembershipTierId,
};
pub use surface::Surface;
