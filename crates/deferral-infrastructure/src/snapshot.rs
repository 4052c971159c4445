// ============================================================================
// Deferral Infrastructure - JSON Snapshot Store
// File: crates/deferral-infrastructure/src/snapshot.rs
// ============================================================================
//! Host state (catalog, orders, membership subsystem) persisted as one JSON file

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use deferral_core::domain::{
    deferred_flag_from_meta, Category, MembershipPlanId, MembershipRecord, MembershipTierId, Order,
    Product, ProductId, ProductKind,
};
use deferral_core::services::DateConverter;
use deferral_shared::constants::{META_DEFERRED_REQUIRED, META_GL_CODE, META_TERM_END, META_TERM_START};
use deferral_shared::AppError;

use crate::memory::{InMemoryMembershipGateway, InMemoryOrderRepository, InMemoryProductRepository, PlanTerm};

/// Product as stored by the host: flags and static dates live in string meta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: ProductKind,
    #[serde(default)]
    pub parent_id: Option<ProductId>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl ProductRecord {
    fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    fn meta_date(&self, key: &str) -> Option<chrono::NaiveDate> {
        let value = self.meta_value(key)?;
        let date = DateConverter::parse_storage_date(value);
        if date.is_none() {
            warn!(product_id = self.id, key, value, "Ignoring malformed product date meta");
        }
        date
    }
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product {
            id: record.id,
            kind: record.kind,
            parent_id: record.parent_id,
            deferred_revenue_required: deferred_flag_from_meta(
                record.meta_value(META_DEFERRED_REQUIRED).unwrap_or_default(),
            ),
            gl_code: record.meta_value(META_GL_CODE).map(String::from),
            deferral_start: record.meta_date(META_TERM_START),
            deferral_end: record.meta_date(META_TERM_END),
            categories: record.categories.clone(),
            name: record.name,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MembershipSnapshot {
    #[serde(default)]
    pub tiers_by_product: BTreeMap<ProductId, MembershipTierId>,
    #[serde(default)]
    pub plans_by_tier: BTreeMap<MembershipTierId, MembershipPlanId>,
    #[serde(default)]
    pub terms: Vec<PlanTerm>,
    #[serde(default)]
    pub memberships: Vec<MembershipRecord>,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

/// Whole host state. A missing `membership` section means the subsystem is not installed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub membership: Option<MembershipSnapshot>,
}

/// Live repositories built from a snapshot.
pub struct SnapshotStores {
    pub products: Arc<InMemoryProductRepository>,
    pub orders: Arc<InMemoryOrderRepository>,
    pub membership: Option<Arc<InMemoryMembershipGateway>>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            products = snapshot.products.len(),
            orders = snapshot.orders.len(),
            membership = snapshot.membership.is_some(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Write through a temporary file so a failed write leaves the old snapshot intact.
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        info!(path = %path.display(), "Snapshot saved");
        Ok(())
    }

    pub fn into_stores(self) -> SnapshotStores {
        let membership = self.membership.map(|m| {
            Arc::new(InMemoryMembershipGateway::new(
                m.tiers_by_product,
                m.plans_by_tier,
                m.terms,
                m.memberships,
                m.now,
            ))
        });

        SnapshotStores {
            products: Arc::new(InMemoryProductRepository::new(self.products)),
            orders: Arc::new(InMemoryOrderRepository::new(self.orders)),
            membership,
        }
    }
}

impl SnapshotStores {
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            products: self.products.all(),
            orders: self.orders.all(),
            membership: self.membership.as_ref().map(|g| MembershipSnapshot {
                tiers_by_product: g.tiers_by_product().clone(),
                plans_by_tier: g.plans_by_tier().clone(),
                terms: g.terms(),
                memberships: g.memberships(),
                now: g.fixed_now(),
            }),
        }
    }
}
