//! Product repository trait (port)

use crate::domain::{Product, ProductId};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
pub trait ProductRepository: Send + Sync {
    fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, DomainError>;
}
