//! Identity provider seam

use inbox_core::Snowflake;

use super::jwt::JwtService;
use crate::error::AppError;

/// Resolves a bearer credential to the user it was issued for.
///
/// Fails with [`AppError::InvalidToken`], [`AppError::TokenExpired`] or
/// [`AppError::MissingAuth`]; callers never inspect the credential themselves.
pub trait IdentityProvider: Send + Sync {
    fn identify(&self, token: &str) -> Result<Snowflake, AppError>;
}

impl IdentityProvider for JwtService {
    fn identify(&self, token: &str) -> Result<Snowflake, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::MissingAuth);
        }
        self.validate_access_token(token)?.user_id()
    }
}
