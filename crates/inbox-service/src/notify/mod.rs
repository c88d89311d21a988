//! New-message notifications
//!
//! [`NotificationPolicy`] decides whether a message deserves an out-of-band
//! nudge; the dispatchers deliver it. Dispatch always runs detached from the
//! write path.

mod logging;
mod policy;
mod webhook;

pub use logging::LogNotifier;
pub use policy::{NotificationPolicy, Trigger};
pub use webhook::WebhookNotifier;
