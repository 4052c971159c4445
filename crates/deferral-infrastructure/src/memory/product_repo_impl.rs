//! In-memory product catalog

use std::collections::BTreeMap;

use parking_lot::RwLock;

use deferral_core::domain::{Product, ProductId};
use deferral_core::error::DomainError;
use deferral_core::repositories::ProductRepository;

use crate::snapshot::ProductRecord;

/// Keeps raw product records and converts them on read, like a database row.
#[derive(Default)]
pub struct InMemoryProductRepository {
    records: RwLock<BTreeMap<ProductId, ProductRecord>>,
}

impl InMemoryProductRepository {
    pub fn new(records: impl IntoIterator<Item = ProductRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.id, r)).collect()),
        }
    }

    pub fn insert(&self, record: ProductRecord) {
        self.records.write().insert(record.id, record);
    }

    pub fn all(&self) -> Vec<ProductRecord> {
        self.records.read().values().cloned().collect()
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.records.read().get(&id).cloned().map(Product::from))
    }
}
