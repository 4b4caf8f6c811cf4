//! Outbound email. Delivery is best-effort: callers log failures and carry on.

pub mod mailer;
pub mod templates;
