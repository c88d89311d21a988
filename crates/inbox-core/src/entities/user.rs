//! User entity - a participant as seen through the user directory

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Directory entry for a user who can take part in conversations.
///
/// Accounts are owned by an external identity system; this service only
/// reads the fields it needs for payloads and notification decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub name: String,
    pub email: String,
    pub notify_on_new_messages: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: Snowflake, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            notify_on_new_messages: true,
            created_at: Utc::now(),
        }
    }

    /// Opt out of new-message notifications
    pub fn without_notifications(mut self) -> Self {
        self.notify_on_new_messages = false;
        self
    }

    /// Name shown to other participants, falling back to the email address
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            &self.email
        } else {
            name
        }
    }
}
