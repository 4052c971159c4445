//! Application-wide constants

/// Order status that always triggers date computation.
pub const ALWAYS_TRIGGER_STATUS: &str = "processing";

/// Category slug marking membership products when nothing else is configured.
pub const DEFAULT_MEMBERSHIP_CATEGORY_SLUG: &str = "membership";

/// Literal value of the product flag that requires deferred revenue.
pub const DEFERRED_REQUIRED_YES: &str = "yes";

/// Product/line item meta keys used by snapshot stores.
pub const META_DEFERRED_REQUIRED: &str = "_deferred_revenue_required";
pub const META_GL_CODE: &str = "_gl_code";
pub const META_TERM_START: &str = "_term_start_date";
pub const META_TERM_END: &str = "_term_end_date";

/// Storage date format (`YYYY-MM-DD`).
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Audit sources written into order notes.
pub const SOURCE_SYSTEM: &str = "System";
pub const SOURCE_MEMBERSHIP_CREATED: &str = "System (Membership Created)";

/// Rendered in audit notes for a date that was never set.
pub const EMPTY_DATE_LABEL: &str = "empty";

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FILE_PREFIX: &str = "deferral.log";
