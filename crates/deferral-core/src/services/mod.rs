//! Domain services (business logic)

pub mod settings_gate;
pub mod eligibility;
pub mod date_converter;
pub mod membership_dates;
pub mod line_item_store;
pub mod outcome;
pub mod orchestrator;
pub mod display_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use settings_gate::SettingsGate;
pub use eligibility::{Eligibility, EligibilityConfig};
pub use date_converter::DateConverter;
pub use membership_dates::{MembershipDateSource, MembershipDates};
pub use line_item_store::LineItemStore;
pub use outcome::{DeferralOutcome, LineItemOutcome, SkipReason};
pub use orchestrator::DeferralOrchestrator;
pub use display_service::{DisplayService, DisplayedTerm};
