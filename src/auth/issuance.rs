//! Credential & session issuance
//!
//! Sign-up and sign-in as linear sequences of guarded steps. Every failed
//! guard returns immediately; nothing is retried or rolled back.

use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::error::{AppError, AuthError, DatabaseError, ErrorContext};
use crate::models::{NewUser, Role, SignInRequest, SignInResponse, SignUpRequest, User};
use crate::store::UserStore;
use crate::validators::{is_valid_email, is_valid_name, is_valid_phone_number};

pub const TOKEN_TYPE: &str = "Bearer";

#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl CredentialService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a user with `role`. The role comes from the caller (which
    /// route was hit), never from the payload.
    ///
    /// # Errors
    /// - 400 if a field fails validation or the store rejects the insert
    /// - 409 if the email is already registered
    /// - 500 if the lookup or hashing fails
    pub async fn sign_up(&self, payload: SignUpRequest, role: Role) -> Result<User, AppError> {
        let context = ErrorContext::new("sign_up");

        let first_name = is_valid_name("first_name", &payload.first_name)?;
        let last_name = is_valid_name("last_name", &payload.last_name)?;
        let email = is_valid_email(&payload.email)?;
        let phone_number = is_valid_phone_number(&payload.phone_number)?;

        // Early exit only; the store's own constraint is what guarantees uniqueness.
        let existing = self.store.find_by_email(&email).await.map_err(|e| {
            AppError::Internal(format!("user lookup failed during sign-up: {}", e))
        })?;
        if existing.is_some() {
            tracing::info!(
                request_id = %context.request_id,
                "Sign-up rejected: email already registered"
            );
            return Err(DatabaseError::UniqueConstraintViolation(
                "Email is already registered".to_string(),
            )
            .into());
        }

        let password_hash = self.hasher.hash(&payload.password)?;

        let new_user = NewUser {
            first_name,
            last_name,
            email,
            phone_number,
            password_hash,
            birthday: payload.birthday,
            role,
        };

        let user = self.store.create(new_user).await.map_err(|e| match e {
            DatabaseError::UniqueConstraintViolation(_) => AppError::Database(e),
            other => AppError::BadRequest(other.to_string()),
        })?;

        tracing::info!(
            request_id = %context.request_id,
            user_id = user.id,
            role = %user.role,
            "User signed up successfully"
        );

        Ok(user)
    }

    /// Check credentials and issue a session token
    ///
    /// An unknown email, a store failure during lookup and a wrong password
    /// all produce the same `InvalidCredentials` error after one bcrypt
    /// verification; only the logs tell them apart.
    pub async fn sign_in(&self, payload: SignInRequest) -> Result<SignInResponse, AppError> {
        let context = ErrorContext::new("sign_in");

        if payload.email.trim().is_empty() || payload.password.is_empty() {
            return Err(AuthError::InvalidCredentials.into());
        }

        let user = match self.store.find_by_email(payload.email.trim()).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.hasher.verify_decoy(&payload.password);
                tracing::warn!(
                    request_id = %context.request_id,
                    "Sign-in failed: no user with that email"
                );
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => {
                self.hasher.verify_decoy(&payload.password);
                tracing::error!(
                    request_id = %context.request_id,
                    error = %e,
                    "Sign-in failed: user lookup error"
                );
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.hasher.verify(&user.password_hash, &payload.password)? {
            tracing::warn!(
                request_id = %context.request_id,
                user_id = user.id,
                "Sign-in failed: password mismatch"
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(&user.email)?;

        tracing::info!(
            request_id = %context.request_id,
            user_id = user.id,
            "User signed in successfully"
        );

        Ok(SignInResponse {
            token_type: TOKEN_TYPE.to_string(),
            token,
            id: user.id,
            role: user.role,
        })
    }
}
