//! User entity <-> model mapper

use inbox_core::entities::User;
use inbox_core::value_objects::Snowflake;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            name: model.name,
            email: model.email,
            notify_on_new_messages: model.notify_on_new_messages,
            created_at: model.created_at,
        }
    }
}
