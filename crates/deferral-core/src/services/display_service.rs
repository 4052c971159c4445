//! Read side: which line items show a deferral period on a given surface

use std::fmt::Write;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use serde::Serialize;
use tracing::{debug, error, warn};

use deferral_shared::constants::STORAGE_DATE_FORMAT;

use crate::domain::{LineItemId, OrderId, Surface};
use crate::repositories::{OrderRepository, ProductRepository, SettingsRepository};
use crate::services::{DateConverter, Eligibility};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayedTerm {
    pub line_item_id: LineItemId,
    pub name: String,
    pub start: String,
    pub end: String,
    pub gl_code: String,
}

pub struct DisplayService<S, P, O>
where
    S: SettingsRepository,
    P: ProductRepository,
    O: OrderRepository,
{
    eligibility: Eligibility<S, P>,
    orders: Arc<O>,
    date_format: String,
}

impl<S, P, O> DisplayService<S, P, O>
where
    S: SettingsRepository,
    P: ProductRepository,
    O: OrderRepository,
{
    pub fn new(eligibility: Eligibility<S, P>, orders: Arc<O>, date_format: Option<String>) -> Self {
        let date_format = match date_format {
            Some(format) if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) => {
                warn!(format = %format, "Invalid display date format, using storage format");
                STORAGE_DATE_FORMAT.to_string()
            }
            Some(format) => format,
            None => STORAGE_DATE_FORMAT.to_string(),
        };

        Self {
            eligibility,
            orders,
            date_format,
        }
    }

    /// Line items of `order_id` whose deferral period may be shown on `surface`.
    pub fn displayable_items(&self, order_id: OrderId, surface: Surface) -> Vec<DisplayedTerm> {
        let order = match self.orders.find_by_id(order_id) {
            Ok(Some(order)) => order,
            Ok(None) => {
                debug!(order_id, "Order not found for display");
                return Vec::new();
            }
            Err(e) => {
                error!(order_id, "Failed to load order for display: {}", e);
                return Vec::new();
            }
        };

        order
            .line_items
            .values()
            .filter_map(|item| {
                let data = item.data();
                let eligible = self.eligibility.is_eligible_for_display(
                    Some(item.purchased_product_id()),
                    surface,
                    &data.start,
                    &data.end,
                );
                if !eligible {
                    return None;
                }

                Some(DisplayedTerm {
                    line_item_id: item.id,
                    name: item.name.clone(),
                    start: self.format(&data.start),
                    end: self.format(&data.end),
                    gl_code: data.gl_code,
                })
            })
            .collect()
    }

    fn format(&self, stored: &str) -> String {
        let Some(date) = DateConverter::parse_storage_date(stored) else {
            return stored.to_string();
        };

        // Time specifiers cannot render from a bare date.
        let mut out = String::new();
        match write!(out, "{}", date.format(&self.date_format)) {
            Ok(()) => out,
            Err(_) => stored.to_string(),
        }
    }
}
