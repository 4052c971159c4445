// ============================================================================
// Deferral Core - Eligibility Service
// File: crates/deferral-core/src/services/eligibility.rs
// ============================================================================
//! Product and line item eligibility predicates.
//!
//! Every predicate fails closed: a product that cannot be resolved is never
//! eligible for anything.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, error, warn};

use deferral_shared::constants::DEFAULT_MEMBERSHIP_CATEGORY_SLUG;

use crate::domain::{effective_product_id, Product, ProductId, Surface};
use crate::repositories::{ProductRepository, SettingsRepository};

/// Static eligibility configuration injected at construction.
#[derive(Debug, Clone)]
pub struct EligibilityConfig {
    pub membership_category_slugs: BTreeSet<String>,
}

impl EligibilityConfig {
    pub fn new<I, T>(slugs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            membership_category_slugs: slugs.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self::new([DEFAULT_MEMBERSHIP_CATEGORY_SLUG])
    }
}

pub struct Eligibility<S: SettingsRepository, P: ProductRepository> {
    settings: Arc<S>,
    products: Arc<P>,
    config: EligibilityConfig,
}

impl<S: SettingsRepository, P: ProductRepository> Eligibility<S, P> {
    pub fn new(settings: Arc<S>, products: Arc<P>, config: EligibilityConfig) -> Self {
        Self {
            settings,
            products,
            config,
        }
    }

    /// Whether a stored deferral period may be shown on `surface`.
    pub fn is_eligible_for_display(
        &self,
        product_id: Option<ProductId>,
        surface: Surface,
        start: &str,
        end: &str,
    ) -> bool {
        if start.is_empty() || end.is_empty() {
            return false;
        }

        if !self.settings.visibility_surfaces().contains(&surface) {
            return false;
        }

        let Some(product) = product_id.and_then(|id| self.find_product(id)) else {
            return false;
        };

        self.is_product_in_eligible_categories(&product)
    }

    pub fn is_product_in_eligible_categories(&self, product: &Product) -> bool {
        let Some(product) = self.resolve_effective_product(product) else {
            return false;
        };

        let eligible = self.settings.eligible_categories();
        if eligible.is_empty() || product.categories.is_empty() {
            return false;
        }

        let intersects = product.category_ids().any(|id| eligible.contains(&id));
        intersects
    }

    pub fn is_membership_product(&self, product: &Product) -> bool {
        let Some(product) = self.resolve_effective_product(product) else {
            return false;
        };

        let is_member = product
            .category_slugs()
            .any(|slug| self.config.membership_category_slugs.contains(slug));
        is_member
    }

    pub fn is_deferred_revenue_required(&self, product: &Product) -> bool {
        self.resolve_effective_product(product)
            .map(|p| p.deferred_revenue_required)
            .unwrap_or(false)
    }

    /// The product owning categories and flags. Variations resolve to their parent.
    pub fn resolve_effective_product<'p>(&self, product: &'p Product) -> Option<Cow<'p, Product>> {
        let Some(effective_id) = effective_product_id(product) else {
            warn!(product_id = product.id, "Variation has no parent product");
            return None;
        };
        if effective_id == product.id {
            return Some(Cow::Borrowed(product));
        }

        match self.find_product(effective_id) {
            Some(parent) => Some(Cow::Owned(parent)),
            None => {
                warn!(
                    product_id = product.id,
                    parent_id = effective_id,
                    "Parent product of variation not found"
                );
                None
            }
        }
    }

    pub fn find_product(&self, id: ProductId) -> Option<Product> {
        match self.products.find_by_id(id) {
            Ok(Some(product)) => Some(product),
            Ok(None) => {
                debug!(product_id = id, "Product not found");
                None
            }
            Err(e) => {
                error!(product_id = id, "Failed to load product: {}", e);
                None
            }
        }
    }
}
