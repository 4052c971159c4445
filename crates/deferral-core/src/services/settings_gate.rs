//! Feature switch and trigger-status checks

use std::sync::Arc;

use deferral_shared::constants::ALWAYS_TRIGGER_STATUS;

use crate::domain::OrderStatus;
use crate::repositories::SettingsRepository;

/// Answers whether the feature runs at all and which statuses trigger it.
pub struct SettingsGate<S: SettingsRepository> {
    settings: Arc<S>,
}

impl<S: SettingsRepository> SettingsGate<S> {
    pub fn new(settings: Arc<S>) -> Self {
        Self { settings }
    }

    pub fn is_system_enabled(&self) -> bool {
        self.settings.is_system_enabled()
    }

    /// `processing` always triggers, whatever is stored for it.
    pub fn is_trigger_status(&self, status: &OrderStatus) -> bool {
        let slug = status.as_str();
        slug == ALWAYS_TRIGGER_STATUS || self.settings.trigger_flag(slug)
    }
}
