//! JWT Claims structure
//!
//! Session tokens carry the user's email as the subject, the configured
//! issuer and the issue/expiry timestamps (RFC 7519).

use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: i64 = 3600;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Claims for `subject` valid from now for `expiry_hours`
    pub fn new(subject: impl Into<String>, expiry_hours: i64, issuer: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: subject.into(),
            exp: now + expiry_hours * SECONDS_PER_HOUR,
            iat: now,
            iss: issuer.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.sub
    }
}
