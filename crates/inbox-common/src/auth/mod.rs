//! Identity resolution for bearer credentials

mod identity;
mod jwt;

pub use identity::IdentityProvider;
pub use jwt::{Claims, JwtService};
