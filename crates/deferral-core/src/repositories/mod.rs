//! Collaborator traits (ports) implemented by the host

pub mod settings_repository;
pub mod product_repository;
pub mod order_repository;
pub mod membership_gateway;

pub use settings_repository::SettingsRepository;
pub use product_repository::ProductRepository;
pub use order_repository::OrderRepository;
pub use membership_gateway::MembershipGateway;

#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
#[cfg(test)]
pub use product_repository::MockProductRepository;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
#[cfg(test)]
pub use membership_gateway::MockMembershipGateway;
