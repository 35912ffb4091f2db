//! Registration and sign-in routes
//!
//! Thin wrappers over `CredentialService`; the role of a new account is
//! decided here by which route was called.

use actix_web::{web, HttpResponse};

use crate::auth::CredentialService;
use crate::error::AppError;
use crate::models::{Role, SignInRequest, SignUpRequest, SignUpResponse};

/// POST /signup
///
/// # Errors
/// - 400: Malformed payload or rejected insert
/// - 409: Email already registered
/// - 500: Lookup or hashing failure
pub async fn sign_up(
    payload: web::Json<SignUpRequest>,
    service: web::Data<CredentialService>,
) -> Result<HttpResponse, AppError> {
    register(payload.into_inner(), Role::User, &service).await
}

/// POST /signup/admin
///
/// Same contract as `/signup`; the account is created with role `admin`.
pub async fn sign_up_admin(
    payload: web::Json<SignUpRequest>,
    service: web::Data<CredentialService>,
) -> Result<HttpResponse, AppError> {
    register(payload.into_inner(), Role::Admin, &service).await
}

async fn register(
    payload: SignUpRequest,
    role: Role,
    service: &CredentialService,
) -> Result<HttpResponse, AppError> {
    let user = service.sign_up(payload, role).await?;

    Ok(HttpResponse::Created().json(SignUpResponse {
        message: "Sign-up successful".to_string(),
        user: user.into(),
    }))
}

/// POST /signin
///
/// # Errors
/// - 400: Malformed payload, unknown email or wrong password (same body)
/// - 500: Token could not be issued
pub async fn sign_in(
    payload: web::Json<SignInRequest>,
    service: web::Data<CredentialService>,
) -> Result<HttpResponse, AppError> {
    let response = service.sign_in(payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(response))
}
