//! User database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub notify_on_new_messages: bool,
    pub created_at: DateTime<Utc>,
}
