//! Line item entity

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use deferral_shared::constants::STORAGE_DATE_FORMAT;

use super::product::ProductId;

pub type LineItemId = u64;

/// Order line item carrying the persisted deferral period.
///
/// A half-written pair (only one date set) is valid storage but is treated
/// as incomplete by every reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    #[serde(default)]
    pub name: String,
    pub product_id: ProductId,
    #[serde(default)]
    pub variation_id: Option<ProductId>,
    #[serde(default)]
    pub term_start: Option<NaiveDate>,
    #[serde(default)]
    pub term_end: Option<NaiveDate>,
    #[serde(default)]
    pub gl_code: Option<String>,
}

impl LineItem {
    pub fn new(id: LineItemId, product_id: ProductId, variation_id: Option<ProductId>) -> Self {
        Self {
            id,
            name: String::new(),
            product_id,
            variation_id,
            term_start: None,
            term_end: None,
            gl_code: None,
        }
    }

    /// The purchased product: the variation when there is one.
    pub fn purchased_product_id(&self) -> ProductId {
        self.variation_id.unwrap_or(self.product_id)
    }

    pub fn references_product(&self, product_id: ProductId) -> bool {
        self.product_id == product_id || self.variation_id == Some(product_id)
    }

    pub fn has_complete_term(&self) -> bool {
        self.term_start.is_some() && self.term_end.is_some()
    }

    /// Stored values as strings, empty when unset.
    pub fn data(&self) -> LineItemData {
        LineItemData {
            start: format_storage_date(self.term_start.as_ref()),
            end: format_storage_date(self.term_end.as_ref()),
            gl_code: self.gl_code.clone().unwrap_or_default(),
        }
    }
}

fn format_storage_date(date: Option<&NaiveDate>) -> String {
    date.map(|d| d.format(STORAGE_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Read model of a line item's deferral fields. Never null, empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemData {
    pub start: String,
    pub end: String,
    pub gl_code: String,
}

impl LineItemData {
    pub fn is_complete(&self) -> bool {
        !self.start.is_empty() && !self.end.is_empty()
    }
}
