//! In-memory adapters

pub mod order_repo_impl;
pub mod product_repo_impl;
pub mod membership_gateway_impl;

pub use order_repo_impl::InMemoryOrderRepository;
pub use product_repo_impl::InMemoryProductRepository;
pub use membership_gateway_impl::{InMemoryMembershipGateway, PlanTerm, TermUnit};
