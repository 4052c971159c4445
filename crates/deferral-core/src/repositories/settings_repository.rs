//! Settings repository trait (port)

use std::collections::BTreeSet;

use crate::domain::{CategoryId, Surface};

/// Read-only view of the stored feature settings.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsRepository: Send + Sync {
    fn is_system_enabled(&self) -> bool;
    /// The stored flag for `status`, without any built-in overrides.
    fn trigger_flag(&self, status: &str) -> bool;
    fn eligible_categories(&self) -> BTreeSet<CategoryId>;
    fn visibility_surfaces(&self) -> BTreeSet<Surface>;
}
