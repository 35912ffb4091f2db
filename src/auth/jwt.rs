//! JWT Token Issuance and Validation
//!
//! `TokenIssuer` owns the process-wide signing identity (secret, issuer,
//! lifetime). It is built once from `JwtSettings` and shared read-only
//! between workers.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError};

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiration_hours: i64,
}

impl TokenIssuer {
    /// # Errors
    /// Returns a config error if the secret is empty or the lifetime is not
    /// positive.
    pub fn new(config: &JwtSettings) -> Result<Self, AppError> {
        if config.secret.is_empty() {
            return Err(ConfigError::InvalidValue("jwt.secret must not be empty".to_string()).into());
        }
        if config.expiration_hours <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.expiration_hours must be positive".to_string(),
            )
            .into());
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            expiration_hours: config.expiration_hours,
        })
    }

    /// Sign a session token for `subject` with the configured lifetime
    pub fn issue(&self, subject: &str) -> Result<String, AppError> {
        self.issue_with_expiry(subject, self.expiration_hours)
    }

    /// Sign a token for `subject` that expires `expiry_hours` from now
    pub fn issue_with_expiry(&self, subject: &str, expiry_hours: i64) -> Result<String, AppError> {
        let claims = Claims::new(subject, expiry_hours, self.issuer.clone());

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify signature, issuer and expiry, and return the claims
    ///
    /// # Errors
    /// - `TokenExpired` if `exp` has passed (no leeway)
    /// - `TokenInvalid` if the signature or issuer does not match
    /// - `TokenMalformed` if the token cannot be decoded at all
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation error: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    ErrorKind::InvalidSignature
                    | ErrorKind::InvalidIssuer
                    | ErrorKind::InvalidAlgorithm
                    | ErrorKind::ImmatureSignature => AuthError::TokenInvalid,
                    _ => AuthError::TokenMalformed,
                }
            })
    }
}
