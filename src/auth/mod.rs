//! Authentication module
//!
//! Password hashing, session token issuance/validation, and the sign-up /
//! sign-in flows built on top of them.

mod claims;
mod issuance;
mod jwt;
mod password;

pub use claims::Claims;
pub use issuance::{CredentialService, TOKEN_TYPE};
pub use jwt::TokenIssuer;
pub use password::PasswordHasher;
