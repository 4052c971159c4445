// ============================================================================
// Deferral Core - Product Entity
// File: crates/deferral-core/src/domain/product.rs
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use deferral_shared::constants::DEFERRED_REQUIRED_YES;

pub type ProductId = u64;
pub type CategoryId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Simple,
    Variation,
}

impl Default for ProductKind {
    fn default() -> Self {
        ProductKind::Simple
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
}

/// Product as seen by the deferral engine.
///
/// Variations carry no categories or flags of their own; callers resolve the
/// parent through [`effective_product_id`] before reading them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub kind: ProductKind,
    pub parent_id: Option<ProductId>,
    pub categories: Vec<Category>,
    pub deferred_revenue_required: bool,
    pub gl_code: Option<String>,
    /// Static deferral period copied onto new line items.
    pub deferral_start: Option<NaiveDate>,
    pub deferral_end: Option<NaiveDate>,
}

impl Product {
    pub fn is_variant(&self) -> bool {
        self.kind == ProductKind::Variation
    }

    pub fn category_ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.categories.iter().map(|c| c.id)
    }

    pub fn category_slugs(&self) -> impl Iterator<Item = &str> + '_ {
        self.categories.iter().map(|c| c.slug.as_str())
    }
}

/// Id of the product that owns categories and flags: the parent for variations.
///
/// A variation without a parent owns nothing and resolves to `None`.
pub fn effective_product_id(product: &Product) -> Option<ProductId> {
    match product.kind {
        ProductKind::Variation => product.parent_id,
        ProductKind::Simple => Some(product.id),
    }
}

/// Translate the stored `deferred revenue required` meta into a boolean.
///
/// Only the literal `"yes"` is true. `"true"`, `"1"` or `"YES"` are not.
pub fn deferred_flag_from_meta(value: &str) -> bool {
    value == DEFERRED_REQUIRED_YES
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variation(id: ProductId, parent_id: Option<ProductId>) -> Product {
        Product {
            id,
            name: "Variation".into(),
            kind: ProductKind::Variation,
            parent_id,
            categories: vec![],
            deferred_revenue_required: false,
            gl_code: None,
            deferral_start: None,
            deferral_end: None,
        }
    }

    #[test]
    fn test_variation_resolves_to_parent() {
        assert_eq!(effective_product_id(&variation(21, Some(20))), Some(20));
    }

    #[test]
    fn test_orphan_variation_does_not_resolve() {
        assert_eq!(effective_product_id(&variation(21, None)), None);
    }

    #[test]
    fn test_simple_product_resolves_to_itself() {
        let product = Product {
            kind: ProductKind::Simple,
            parent_id: Some(20),
            ..variation(21, None)
        };
        assert_eq!(effective_product_id(&product), Some(21));
    }

    #[test]
    fn test_deferred_flag_is_strict() {
        assert!(deferred_flag_from_meta("yes"));
        for value in ["true", "1", "YES", "Yes", " yes", "no", ""] {
            assert!(!deferred_flag_from_meta(value), "{value:?} must not count as yes");
        }
    }
}
