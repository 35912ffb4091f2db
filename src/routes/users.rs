//! User management routes (list, fetch, update, delete)
//!
//! Status codes follow the public contract of the service, which is not
//! always what the store reports: list failures are 404, a missing id on
//! delete is 400.

use actix_web::{web, HttpResponse};

use crate::auth::PasswordHasher;
use crate::error::{AppError, ErrorContext};
use crate::models::{MessageResponse, Role, UpdateUserRequest, User, UserView};
use crate::store::{Repository, UserStore};
use crate::validators::{is_valid_email, is_valid_name, is_valid_phone_number};

const ID_NOT_FOUND: &str = "id not found";

fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn to_views(users: Vec<User>) -> Vec<UserView> {
    users.into_iter().map(UserView::from).collect()
}

/// GET /users
pub async fn list_users(store: web::Data<dyn UserStore>) -> Result<HttpResponse, AppError> {
    let users = store.list_all().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list users");
        AppError::NotFound("users could not be loaded".to_string())
    })?;

    Ok(HttpResponse::Ok().json(to_views(users)))
}

/// GET /admins
pub async fn list_admins(store: web::Data<dyn UserStore>) -> Result<HttpResponse, AppError> {
    let admins = store.list_by_role(Role::Admin).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list admins");
        AppError::NotFound("admins could not be loaded".to_string())
    })?;

    Ok(HttpResponse::Ok().json(to_views(admins)))
}

/// GET /user/{id}
///
/// A zero or negative id is the "no record" sentinel and answers 204.
pub async fn get_user(
    path: web::Path<String>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path).ok_or_else(|| AppError::NotFound(ID_NOT_FOUND.to_string()))?;
    if id <= 0 {
        return Ok(HttpResponse::NoContent().finish());
    }

    match store.find_by_id(id).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(UserView::from(user))),
        Ok(None) => Err(AppError::NotFound(ID_NOT_FOUND.to_string())),
        Err(e) => {
            tracing::error!(user_id = id, error = %e, "Failed to load user");
            Err(AppError::NotFound(ID_NOT_FOUND.to_string()))
        }
    }
}

/// PATCH /user/{id}
///
/// The id is resolved before the body is read, so an unknown id is 404 even
/// when the body is also invalid. Fields absent from the body keep their
/// stored value; `id` and `role` cannot be changed.
pub async fn update_user(
    path: web::Path<String>,
    body: web::Bytes,
    store: web::Data<dyn UserStore>,
    hasher: web::Data<PasswordHasher>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("update_user");
    let id = parse_id(&path).ok_or_else(|| AppError::NotFound(ID_NOT_FOUND.to_string()))?;

    let mut user = match store.find_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(AppError::NotFound(ID_NOT_FOUND.to_string())),
        Err(e) => {
            tracing::error!(request_id = %context.request_id, user_id = id, error = %e, "Failed to load user");
            return Err(AppError::NotFound(ID_NOT_FOUND.to_string()));
        }
    };

    let changes: UpdateUserRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(request_id = %context.request_id, error = %e, "Unreadable update payload");
        AppError::BadRequest("Bad request, unable to map payload".to_string())
    })?;

    apply_changes(&mut user, changes, &hasher)?;

    store.update(&user).await.map_err(|e| {
        tracing::warn!(request_id = %context.request_id, user_id = id, error = %e, "Failed to save user");
        AppError::BadRequest("Bad request".to_string())
    })?;

    tracing::info!(request_id = %context.request_id, user_id = id, "User updated");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Updated successful")))
}

/// DELETE /user/{id}
pub async fn delete_user(
    path: web::Path<String>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path).ok_or_else(|| AppError::BadRequest(ID_NOT_FOUND.to_string()))?;

    let deleted = store.delete_by_id(id).await.map_err(|e| {
        tracing::error!(user_id = id, error = %e, "Failed to delete user");
        AppError::BadRequest(ID_NOT_FOUND.to_string())
    })?;

    if deleted == 0 {
        return Err(AppError::BadRequest(ID_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = id, "User deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Deleted successful")))
}

/// Merge the supplied fields into `user`, validating each one
fn apply_changes(
    user: &mut User,
    changes: UpdateUserRequest,
    hasher: &PasswordHasher,
) -> Result<(), AppError> {
    if let Some(first_name) = changes.first_name {
        user.first_name = is_valid_name("first_name", &first_name)?;
    }
    if let Some(last_name) = changes.last_name {
        user.last_name = is_valid_name("last_name", &last_name)?;
    }
    if let Some(email) = changes.email {
        user.email = is_valid_email(&email)?;
    }
    if let Some(phone_number) = changes.phone_number {
        user.phone_number = is_valid_phone_number(&phone_number)?;
    }
    if let Some(password) = changes.password {
        user.password_hash = hasher.hash(&password)?;
    }
    if let Some(birthday) = changes.birthday {
        user.birthday = birthday;
    }

    Ok(())
}
