//! # Deferral Infrastructure
//! 
//! In-memory and file-backed implementations (adapters) of the core ports.

pub mod memory;
pub mod settings;
pub mod snapshot;

pub use memory::{InMemoryMembershipGateway, InMemoryOrderRepository, InMemoryProductRepository, PlanTerm, TermUnit};
pub use settings::ConfigSettingsRepository;
pub use snapshot::{MembershipSnapshot, ProductRecord, Snapshot, SnapshotStores};
