//! Settings repository backed by the loaded application config

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use deferral_core::domain::{CategoryId, OrderStatus, Surface};
use deferral_core::repositories::SettingsRepository;
use deferral_shared::DeferralConfig;

pub struct ConfigSettingsRepository {
    enabled: bool,
    eligible_categories: BTreeSet<CategoryId>,
    surfaces: BTreeSet<Surface>,
    trigger_statuses: BTreeMap<String, bool>,
}

impl ConfigSettingsRepository {
    pub fn new(config: &DeferralConfig) -> Self {
        let surfaces = config
            .surfaces
            .iter()
            .filter_map(|slug| {
                let surface = Surface::from_str(slug);
                if surface.is_none() {
                    warn!(surface = %slug, "Ignoring unknown display surface in settings");
                }
                surface
            })
            .collect();

        // Stored keys may carry the `wc-` prefix.
        let trigger_statuses = config
            .trigger_statuses
            .iter()
            .map(|(status, flag)| (OrderStatus::from_slug(status).as_str().to_string(), *flag))
            .collect();

        Self {
            enabled: config.enabled,
            eligible_categories: config.eligible_categories.iter().copied().collect(),
            surfaces,
            trigger_statuses,
        }
    }
}

impl SettingsRepository for ConfigSettingsRepository {
    fn is_system_enabled(&self) -> bool {
        self.enabled
    }

    fn trigger_flag(&self, status: &str) -> bool {
        self.trigger_statuses.get(status).copied().unwrap_or(false)
    }

    fn eligible_categories(&self) -> BTreeSet<CategoryId> {
        self.eligible_categories.clone()
    }

    fn visibility_surfaces(&self) -> BTreeSet<Surface> {
        self.surfaces.clone()
    }
}
