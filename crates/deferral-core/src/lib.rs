//! # Deferral Core
//! 
//! Domain entities, collaborator ports, and services that compute and persist
//! revenue deferral periods on order line items.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
