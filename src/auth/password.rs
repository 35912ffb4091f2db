//! Password Hashing and Verification
//!
//! bcrypt with a configurable work factor. `verify` compares digests in
//! constant time (the bcrypt crate does this internally).

use bcrypt::{hash, verify};

use crate::configuration::PasswordSettings;
use crate::error::{AppError, ValidationError};

/// bcrypt ignores input beyond 72 bytes; longer passwords are rejected
/// instead of being silently truncated.
const MAX_PASSWORD_BYTES: usize = 72;

const DECOY_PASSWORD: &str = "decoy-password-never-stored";

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Digest at the configured cost, verified against when there is no
    /// stored digest so a missing account costs as much as a wrong password
    decoy_digest: Option<String>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            decoy_digest: hash(DECOY_PASSWORD, cost).ok(),
        }
    }

    pub fn from_settings(settings: &PasswordSettings) -> Self {
        Self::new(settings.hash_cost)
    }

    /// Hash a plaintext password into a salted bcrypt digest
    ///
    /// # Errors
    /// - Validation error if the password is empty or longer than 72 bytes
    /// - Internal error if bcrypt itself fails
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        check_length(password)?;

        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Check a plaintext password against a stored digest
    ///
    /// Returns `Ok(false)` on mismatch. A digest that is not valid bcrypt
    /// is an internal error.
    pub fn verify(&self, digest: &str, password: &str) -> Result<bool, AppError> {
        // bcrypt would only compare the first 72 bytes
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        verify(password, digest)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }

    /// Spend one verification on the decoy digest and discard the outcome
    pub fn verify_decoy(&self, password: &str) {
        if let Some(digest) = &self.decoy_digest {
            let _ = self.verify(digest, password);
        }
    }
}

fn check_length(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_BYTES,
        ));
    }

    Ok(())
}
